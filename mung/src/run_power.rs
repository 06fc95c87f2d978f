use mung::common::*;
use mung::graph_metric::NodeMetric;
use mung::power::{pair_parameters, power_nodereg, FailurePolicy, PowerArgs, SamplingEffort};

use clap::{Parser, ValueEnum};
use matrix_util::common_io::{mkdir_parent, write_lines};
use matrix_util::traits::IoOps;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetricArg {
    Strength,
    Eigenvector,
    Closeness,
    Betweenness,
}

impl From<MetricArg> for NodeMetric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::Strength => NodeMetric::Strength,
            MetricArg::Eigenvector => NodeMetric::Eigenvector,
            MetricArg::Closeness => NodeMetric::Closeness,
            MetricArg::Betweenness => NodeMetric::Betweenness,
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct PowerCmdArgs {
    /// number of nodes
    #[arg(long, short = 'n', required = true)]
    nodes: usize,

    /// correlation between the trait and the node metric under
    /// perfect sampling, in (0, 1)
    #[arg(long, short = 'e', required = true)]
    effect: f64,

    /// social differentiation; a comma-separated list (e.g., lower,
    /// median, upper) runs one analysis per value
    #[arg(long = "sd", short = 's', value_delimiter(','), required = true)]
    social_differentiation: Vec<f64>,

    /// mean interaction rate; a comma-separated list is paired with
    /// the social differentiation values
    #[arg(long, short = 'r', value_delimiter(','), required = true)]
    rate: Vec<f64>,

    /// mean sampling effort per dyad
    #[arg(long, short = 'm', conflicts_with = "effort")]
    mean_sampling: Option<f64>,

    /// `n x n` sampling-effort matrix (tab-separated, `.gz` ok)
    #[arg(long, short = 'd')]
    effort: Option<Box<str>>,

    /// node-level metric regressed on
    #[arg(long, value_enum, default_value = "strength")]
    metric: MetricArg,

    /// directed network
    #[arg(long, default_value_t = false)]
    directed: bool,

    /// significance level
    #[arg(long, default_value_t = DEFAULT_SIGNIFICANCE)]
    alpha: f64,

    /// number of Monte Carlo iterations
    #[arg(long, default_value_t = DEFAULT_NUM_ITERS)]
    num_iters: usize,

    /// what to do with iterations that cannot produce a p-value
    #[arg(long, value_enum, default_value = "skip")]
    on_failure: FailurePolicy,

    /// random seed
    #[arg(long)]
    seed: Option<u64>,

    /// output file of the power table (tab-separated)
    #[arg(long, short)]
    out: Option<Box<str>>,

    /// verbosity
    #[arg(long, short)]
    verbose: bool,
}

/// Run one power analysis per (social differentiation, interaction
/// rate) pair
pub fn run_power(args: &PowerCmdArgs) -> anyhow::Result<()> {
    if args.verbose {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let sampling_effort = match (args.effort.as_deref(), args.mean_sampling) {
        (Some(file), _) => {
            let effort = Mat::from_tsv(file, None)?;
            info!("read {} x {} sampling efforts", effort.nrows(), effort.ncols());
            SamplingEffort::Matrix(effort)
        }
        (None, Some(mean)) => SamplingEffort::Uniform(mean),
        (None, None) => {
            return Err(anyhow::anyhow!("need either --mean-sampling or --effort"));
        }
    };

    let pairs = pair_parameters(&args.social_differentiation, &args.rate)?;

    let mut lines: Vec<Box<str>> =
        vec!["nodes\teffect\tsd\trate\tpower\tse\tvalid\tfailed".into()];

    for (k, &(sd, rate)) in pairs.iter().enumerate() {
        let res = power_nodereg(&PowerArgs {
            nodes: args.nodes,
            effect: args.effect,
            social_differentiation: sd,
            interaction_rate: rate,
            sampling_effort: sampling_effort.clone(),
            metric: args.metric.into(),
            directed: args.directed,
            significance: args.alpha,
            num_iters: args.num_iters,
            on_failure: args.on_failure,
            rseed: args
                .seed
                .map(|s| s.wrapping_add((k * (args.num_iters + 1)) as u64)),
            show_progress: args.verbose,
        })?;

        lines.push(
            format!(
                "{}\t{}\t{}\t{}\t{}\t{:.4}\t{}\t{}",
                res.nodes,
                res.effect,
                res.social_differentiation,
                res.interaction_rate,
                res.power,
                res.standard_error(),
                res.num_valid,
                res.num_failed
            )
            .into_boxed_str(),
        );
    }

    for line in lines.iter() {
        println!("{}", line);
    }

    if let Some(out) = args.out.as_deref() {
        mkdir_parent(out)?;
        write_lines(&lines, out)?;
        info!("wrote {}", out);
    }

    Ok(())
}
