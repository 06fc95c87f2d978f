//! Gamma-Poisson generative model of dyadic interaction counts
//!
//! ```text
//! D(i,j) ~ Poisson(mean sampling effort), with zeros replaced by 1
//! A(i,j) ~ Gamma(a = 1/S², b = a/μ)
//! X(i,j) ~ Poisson(A(i,j) * D(i,j))
//! ```

use crate::common::*;
use matrix_util::traits::{SampleOps, TriangleOps};

/// Arguments of [`simulate`]
#[derive(Debug, Clone)]
pub struct SimArgs {
    /// number of nodes
    pub nodes: usize,
    /// mean of the per-dyad sampling effort
    pub mean_sampling_effort: f64,
    /// coefficient of variation of the true rates
    pub social_differentiation: f64,
    /// mean of the true rates
    pub mean_rate: f64,
    /// keep both directions of every dyad as separate draws
    pub directed: bool,
}

/// Simulated network data
#[derive(Debug, Clone)]
pub struct SimOut {
    /// observed interaction counts `X`
    pub counts: Mat,
    /// sampling effort `D`
    pub effort: Mat,
    /// true interaction rates `A`
    pub rates: Mat,
}

/// Draw an `n x n` sampling-effort matrix from `Poisson(mean)`,
/// replacing zeros by 1, and arrange its dyads by `directed`
pub fn sample_effort<R: rand::Rng + ?Sized>(
    nodes: usize,
    mean_sampling_effort: f64,
    directed: bool,
    rng: &mut R,
) -> Result<Mat> {
    check_positive("mean_sampling_effort", mean_sampling_effort)?;
    let mut effort = Mat::rpois(nodes, nodes, mean_sampling_effort, rng)?.map(|d| d.max(1.0));
    effort.dyadic_inplace(directed);
    Ok(effort)
}

/// Draw an `n x n` matrix of true rates `A(i,j) ~ Gamma(shape, rate)`
/// and arrange its dyads by `directed`
pub fn sample_rates<R: rand::Rng + ?Sized>(
    nodes: usize,
    shape_rate: (f64, f64),
    directed: bool,
    rng: &mut R,
) -> Result<Mat> {
    let mut rates = Mat::rgamma(nodes, nodes, shape_rate, rng)?;
    rates.dyadic_inplace(directed);
    Ok(rates)
}

/// Draw counts `X(i,j) ~ Poisson(A(i,j) * D(i,j))` and arrange its
/// dyads by `directed`
pub fn sample_counts<R: rand::Rng + ?Sized>(
    rates: &Mat,
    effort: &Mat,
    directed: bool,
    rng: &mut R,
) -> Mat {
    let mut counts = rates.component_mul(effort).rpois_elementwise(rng);
    counts.dyadic_inplace(directed);
    counts
}

/// Simulate a network of interaction counts from the Gamma-Poisson model.
///
/// Undirected networks draw the upper triangle and mirror it. Directed
/// networks keep an independent draw for each ordered pair `(i,j)`.
/// The diagonal is always zero.
pub fn simulate<R: rand::Rng + ?Sized>(args: &SimArgs, rng: &mut R) -> Result<SimOut> {
    if args.nodes < 2 {
        return Err(MungError::invalid(
            "nodes",
            format!("needs at least two nodes, got {}", args.nodes),
        ));
    }

    let (shape, rate) = gamma_shape_rate(args.social_differentiation, args.mean_rate)?;

    let effort = sample_effort(args.nodes, args.mean_sampling_effort, args.directed, rng)?;
    let rates = sample_rates(args.nodes, (shape, rate), args.directed, rng)?;
    let counts = sample_counts(&rates, &effort, args.directed, rng);

    info!(
        "simulated {} x {} {} network: a = {:.3}, b = {:.3}, total count = {}",
        args.nodes,
        args.nodes,
        if args.directed { "directed" } else { "undirected" },
        shape,
        rate,
        counts.sum()
    );

    Ok(SimOut {
        counts,
        effort,
        rates,
    })
}
