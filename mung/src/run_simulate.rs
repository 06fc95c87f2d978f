use mung::common::*;
use mung::gamma_poisson::{simulate, SimArgs};

use clap::Parser;
use matrix_util::common_io::mkdir_parent;
use matrix_util::traits::IoOps;

#[derive(Parser, Debug, Clone)]
pub struct SimulateArgs {
    /// number of nodes
    #[arg(long, short = 'n', default_value_t = 20)]
    nodes: usize,

    /// mean sampling effort per dyad
    #[arg(long, short = 'm', default_value_t = 10.0)]
    mean_sampling: f64,

    /// social differentiation (coefficient of variation of true rates)
    #[arg(long = "sd", short = 's', default_value_t = 1.0)]
    social_differentiation: f64,

    /// mean interaction rate
    #[arg(long, short = 'r', default_value_t = 0.5)]
    rate: f64,

    /// directed network: an independent draw for each ordered pair
    #[arg(long, default_value_t = false)]
    directed: bool,

    /// random seed
    #[arg(long)]
    seed: Option<u64>,

    /// output header: writes `{out}.counts.tsv.gz`,
    /// `{out}.effort.tsv.gz` and `{out}.rates.tsv.gz`
    #[arg(long, short, required = true)]
    out: Box<str>,

    /// verbosity
    #[arg(long, short)]
    verbose: bool,
}

/// Simulate a network and write its three matrices
pub fn run_simulate(args: &SimulateArgs) -> anyhow::Result<()> {
    if args.verbose {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let mut rng = make_rng(args.seed);

    let sim = simulate(
        &SimArgs {
            nodes: args.nodes,
            mean_sampling_effort: args.mean_sampling,
            social_differentiation: args.social_differentiation,
            mean_rate: args.rate,
            directed: args.directed,
        },
        &mut rng,
    )?;

    let counts_file = format!("{}.counts.tsv.gz", args.out);
    let effort_file = format!("{}.effort.tsv.gz", args.out);
    let rates_file = format!("{}.rates.tsv.gz", args.out);

    mkdir_parent(&counts_file)?;
    sim.counts.to_tsv(&counts_file)?;
    sim.effort.to_tsv(&effort_file)?;
    sim.rates.to_tsv(&rates_file)?;

    info!(
        "wrote:\n{:?},\n{:?},\n{:?}",
        counts_file, effort_file, rates_file
    );
    Ok(())
}
