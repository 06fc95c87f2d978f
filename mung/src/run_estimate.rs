use mung::common::*;
use mung::estimate::{estimate_correlation, EstimateOptions};
use mung::summary::SummaryTable;

use clap::Parser;
use matrix_util::common_io::{mkdir_parent, write_lines};
use matrix_util::traits::IoOps;

#[derive(Parser, Debug, Clone)]
pub struct EstimateArgs {
    /// `n x n` interaction counts (tab-separated, `.gz` ok)
    #[arg(long, short = 'x', required = true)]
    counts: Box<str>,

    /// `n x n` sampling efforts (tab-separated, `.gz` ok)
    #[arg(long, short = 'd', required = true)]
    effort: Box<str>,

    /// number of header lines to skip in both files
    #[arg(long)]
    skip: Option<usize>,

    /// directed network: use both triangles
    #[arg(long, default_value_t = false)]
    directed: bool,

    /// confidence level of the intervals
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE)]
    ci: f64,

    /// number of Gaussian draws of the fitted parameters
    #[arg(long, default_value_t = DEFAULT_NUM_DRAWS)]
    num_draws: usize,

    /// zero sampling efforts are raised to this value
    #[arg(long, default_value_t = 1.0)]
    min_effort: f64,

    /// also write observed vs. fitted count quantiles to `{out}.qq.tsv`
    #[arg(long, default_value_t = false)]
    qq: bool,

    /// random seed
    #[arg(long)]
    seed: Option<u64>,

    /// output header: writes `{out}.summary.tsv`
    #[arg(long, short)]
    out: Option<Box<str>>,

    /// verbosity
    #[arg(long, short)]
    verbose: bool,
}

/// Fit the Gamma-Poisson model to counts and efforts, print and save
/// the summary table
pub fn run_estimate(args: &EstimateArgs) -> anyhow::Result<()> {
    if args.verbose {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let counts = Mat::from_tsv(&args.counts, args.skip)?;
    let effort = Mat::from_tsv(&args.effort, args.skip)?;
    info!(
        "read {} x {} counts and {} x {} efforts",
        counts.nrows(),
        counts.ncols(),
        effort.nrows(),
        effort.ncols()
    );

    let opts = EstimateOptions {
        confidence: args.ci,
        num_draws: args.num_draws,
        min_effort: args.min_effort,
        qq_diagnostic: args.qq,
        ..Default::default()
    };

    let mut rng = make_rng(args.seed);
    let est = estimate_correlation(&counts, &effort, args.directed, &opts, &mut rng)?;

    print!("{}", est.summary);
    info!(
        "a = {:.4}, b = {:.4}, estimated sampling effort = {:.4}",
        est.fit.shape(),
        est.fit.rate(),
        est.sampling_effort.estimate
    );

    if let Some(out) = args.out.as_deref() {
        let summary_file = format!("{}.summary.tsv", out);
        mkdir_parent(&summary_file)?;

        let table = SummaryTable {
            confidence: est.summary.confidence,
            rows: est
                .summary
                .rows
                .iter()
                .cloned()
                .chain(std::iter::once(est.sampling_effort.clone()))
                .collect(),
        };
        table.to_tsv(&summary_file)?;
        info!("wrote {}", summary_file);

        if let Some(qq) = est.qq.as_ref() {
            let qq_file = format!("{}.qq.tsv", out);
            let lines: Vec<Box<str>> = std::iter::once("observed\tfitted".into())
                .chain(
                    qq.observed
                        .iter()
                        .zip(qq.fitted.iter())
                        .map(|(o, f)| format!("{}\t{}", o, f).into_boxed_str()),
                )
                .collect();
            write_lines(&lines, &qq_file)?;
            info!("wrote {}", qq_file);
        }
    }

    Ok(())
}
