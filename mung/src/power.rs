//! Monte Carlo power of a node-level regression on a sampled network
//!
//! Each iteration draws true rates, plants a trait that depends on a
//! node metric of the true network, re-observes the network with
//! Poisson sampling noise, and tests the trait against the metric of
//! the observed network.

use crate::common::*;
use crate::gamma_poisson::{sample_counts, sample_effort, sample_rates};
use crate::graph_metric::{NodeMetric, WeightedGraph};
use crate::regression::slope_pvalue;

use indicatif::{ParallelProgressIterator, ProgressBar};
use matrix_util::vector_stat::sd;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use rayon::prelude::*;

/// Sampling effort of every dyad in the power simulation
#[derive(Debug, Clone)]
pub enum SamplingEffort {
    /// draw `D(i,j) ~ Poisson(mean)` (zeros raised to 1) once per run
    Uniform(f64),
    /// use this `n x n` matrix as is
    Matrix(Mat),
}

impl SamplingEffort {
    /// Resolve to a concrete `n x n` effort matrix
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        nodes: usize,
        directed: bool,
        rng: &mut R,
    ) -> Result<Mat> {
        match self {
            SamplingEffort::Uniform(mean) => sample_effort(nodes, *mean, directed, rng),
            SamplingEffort::Matrix(effort) => {
                if effort.shape() != (nodes, nodes) {
                    return Err(MungError::invalid(
                        "sampling_effort",
                        format!("expected {} x {}, got {:?}", nodes, nodes, effort.shape()),
                    ));
                }
                if let Some(d) = effort.iter().find(|&&d| !(d.is_finite() && d >= 0.0)) {
                    return Err(MungError::invalid(
                        "sampling_effort",
                        format!("must be non-negative and finite, found {}", d),
                    ));
                }
                Ok(effort.clone())
            }
        }
    }
}

/// What to do with an iteration that cannot produce a p-value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum FailurePolicy {
    /// drop the iteration from the power fraction
    #[default]
    Skip,
    /// stop and return the error
    Abort,
}

/// Arguments of [`power_nodereg`]
#[derive(Debug, Clone)]
pub struct PowerArgs {
    pub nodes: usize,
    /// correlation between trait and metric under perfect sampling
    pub effect: f64,
    pub social_differentiation: f64,
    pub interaction_rate: f64,
    pub sampling_effort: SamplingEffort,
    pub metric: NodeMetric,
    pub directed: bool,
    pub significance: f64,
    pub num_iters: usize,
    pub on_failure: FailurePolicy,
    /// iteration `k` uses the seed `rseed + k`
    pub rseed: Option<u64>,
    pub show_progress: bool,
}

impl PowerArgs {
    /// Defaults: uniform sampling effort 10, strength metric,
    /// undirected, significance 0.05, 1000 iterations
    pub fn new(
        nodes: usize,
        effect: f64,
        social_differentiation: f64,
        interaction_rate: f64,
    ) -> Self {
        PowerArgs {
            nodes,
            effect,
            social_differentiation,
            interaction_rate,
            sampling_effort: SamplingEffort::Uniform(10.0),
            metric: NodeMetric::Strength,
            directed: false,
            significance: DEFAULT_SIGNIFICANCE,
            num_iters: DEFAULT_NUM_ITERS,
            on_failure: FailurePolicy::Skip,
            rseed: None,
            show_progress: false,
        }
    }
}

/// Estimated power together with the inputs that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct PowerResult {
    pub nodes: usize,
    pub effect: f64,
    pub social_differentiation: f64,
    pub interaction_rate: f64,
    /// fraction of valid iterations with `p < significance`
    pub power: f64,
    pub num_valid: usize,
    pub num_failed: usize,
}

impl PowerResult {
    /// Binomial standard error of the power estimate
    pub fn standard_error(&self) -> f64 {
        if self.num_valid == 0 {
            return 0.0;
        }
        (self.power * (1.0 - self.power) / self.num_valid as f64).sqrt()
    }
}

/// Turn a target correlation `r` into the slope of a linear model on a
/// predictor with standard deviation `sd`
///
/// ```text
/// β = r √(1/(1-r)) / (sd √(1+r))
/// ```
pub fn effect_slope(effect: f64, metric_sd: f64) -> f64 {
    effect * (1.0 / (1.0 - effect)).sqrt() / (metric_sd * (effect + 1.0).sqrt())
}

/// Observed rates `Poisson(A(i,j) D(i,j)) / D(i,j)`, zero where the
/// ratio is undefined
pub fn observe_rates<R: Rng + ?Sized>(
    rates: &Mat,
    effort: &Mat,
    directed: bool,
    rng: &mut R,
) -> Mat {
    sample_counts(rates, effort, directed, rng).zip_map(effort, |x, d| {
        let r = x / d;
        if r.is_finite() {
            r
        } else {
            0.0
        }
    })
}

struct Iteration<'a> {
    args: &'a PowerArgs,
    shape_rate: (f64, f64),
    effort: &'a Mat,
}

impl Iteration<'_> {
    /// Whether the slope is significant in one simulated study
    fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<bool> {
        let args = self.args;
        let rates = sample_rates(args.nodes, self.shape_rate, args.directed, rng)?;

        let true_metric = args
            .metric
            .compute(&WeightedGraph::from_matrix(&rates, args.directed)?)?;
        let metric_sd = sd(true_metric.as_slice());
        if !(metric_sd.is_finite() && metric_sd > 0.0) {
            return Err(MungError::Regression(format!(
                "{:?} of the true network has zero variance",
                args.metric
            )));
        }
        let slope = effect_slope(args.effect, metric_sd);

        let response: Vec<f64> = true_metric
            .iter()
            .map(|&m| {
                let eps: f64 = StandardNormal.sample(rng);
                1.0 + slope * m + eps
            })
            .collect();

        let observed = observe_rates(&rates, self.effort, args.directed, rng);
        let observed_metric = args
            .metric
            .compute(&WeightedGraph::from_matrix(&observed, args.directed)?)?;

        let pvalue = slope_pvalue(&response, observed_metric.as_slice())?;
        Ok(pvalue < args.significance)
    }
}

fn validate(args: &PowerArgs) -> Result<()> {
    if args.nodes < 2 {
        return Err(MungError::invalid(
            "nodes",
            format!("needs at least two nodes, got {}", args.nodes),
        ));
    }
    check_open_unit("effect", args.effect)?;
    check_positive("social_differentiation", args.social_differentiation)?;
    check_positive("interaction_rate", args.interaction_rate)?;
    check_open_unit("significance", args.significance)?;
    if args.num_iters == 0 {
        return Err(MungError::invalid("num_iters", "must be at least 1"));
    }
    Ok(())
}

/// Power of the regression `trait ~ metric(observed network)` when the
/// trait truly depends on `metric(true network)` with correlation
/// `effect`.
///
/// Iterations run in parallel. With a seed, the result does not depend
/// on thread scheduling.
pub fn power_nodereg(args: &PowerArgs) -> Result<PowerResult> {
    validate(args)?;

    let shape_rate = gamma_shape_rate(args.social_differentiation, args.interaction_rate)?;

    let base_seed = match args.rseed {
        Some(seed) => seed,
        None => rand::rng().random::<u64>(),
    };

    let mut rng = rand::rngs::StdRng::seed_from_u64(base_seed);
    let effort = args
        .sampling_effort
        .resolve(args.nodes, args.directed, &mut rng)?;

    let iteration = Iteration {
        args,
        shape_rate,
        effort: &effort,
    };

    let num_iters = args.num_iters;
    let pb = if args.show_progress {
        ProgressBar::new(num_iters as u64)
    } else {
        ProgressBar::hidden()
    };

    let outcomes: Vec<Result<bool>> = (0..num_iters)
        .into_par_iter()
        .progress_with(pb)
        .map(|k| {
            let mut rng = rand::rngs::StdRng::seed_from_u64(
                base_seed.wrapping_add(1).wrapping_add(k as u64),
            );
            iteration.run(&mut rng)
        })
        .collect();

    let mut num_reject = 0;
    let mut num_failed = 0;
    let mut first_failure = None;
    for outcome in outcomes {
        match outcome {
            Ok(true) => num_reject += 1,
            Ok(false) => {}
            Err(e) => {
                num_failed += 1;
                if first_failure.is_none() {
                    first_failure = Some(e);
                }
            }
        }
    }

    if let Some(e) = first_failure {
        match args.on_failure {
            FailurePolicy::Abort => return Err(e),
            FailurePolicy::Skip => warn!(
                "skipped {} of {} iterations, e.g., {}",
                num_failed, num_iters, e
            ),
        }
    }

    let num_valid = num_iters - num_failed;
    let power = if num_valid > 0 {
        num_reject as f64 / num_valid as f64
    } else {
        warn!("no iteration produced a p-value; reporting zero power");
        0.0
    };

    info!(
        "n = {}, effect = {}, S = {}, rate = {}: power = {:.3} ({} valid iterations)",
        args.nodes,
        args.effect,
        args.social_differentiation,
        args.interaction_rate,
        power,
        num_valid
    );

    Ok(PowerResult {
        nodes: args.nodes,
        effect: args.effect,
        social_differentiation: args.social_differentiation,
        interaction_rate: args.interaction_rate,
        power,
        num_valid,
        num_failed,
    })
}

/// Pair social differentiation and interaction rate values for
/// repeated single-valued power runs, e.g. over the lower, median and
/// upper ends of their intervals. A single value is reused against
/// every value of the other list; two lists must have equal length.
pub fn pair_parameters(
    social_differentiation: &[f64],
    interaction_rate: &[f64],
) -> Result<Vec<(f64, f64)>> {
    let (ns, nr) = (social_differentiation.len(), interaction_rate.len());
    if ns == 0 || nr == 0 {
        return Err(MungError::invalid(
            "social_differentiation/interaction_rate",
            "need at least one value each",
        ));
    }
    let num = ns.max(nr);
    if (ns != 1 && ns != num) || (nr != 1 && nr != num) {
        return Err(MungError::invalid(
            "social_differentiation/interaction_rate",
            format!("cannot pair {} with {} values", ns, nr),
        ));
    }
    Ok((0..num)
        .map(|k| {
            (
                social_differentiation[if ns == 1 { 0 } else { k }],
                interaction_rate[if nr == 1 { 0 } else { k }],
            )
        })
        .collect())
}
