//! Network correlation estimator
//!
//! Fit the negative-binomial marginal of the Gamma-Poisson model to
//! dyadic counts `X` and sampling efforts `D` by maximum likelihood,
//! approximate the sampling distribution of `θ = (ln a, ln b)` by a
//! Gaussian with the inverse Hessian as covariance, and push draws of
//! `θ` through
//!
//! ```text
//! S = 1/√a,  μ = a/b,  I = μ H(D),  ρ = S√I / √(1 + S² I)
//! ```
//!
//! where `H(D)` is the harmonic mean of the sampling efforts.

use crate::common::*;
use crate::nb_likelihood::{Dyad, NbLikelihood};
use crate::optim::{hessian_from_gradient, nelder_mead, NelderMeadOptions};
use crate::summary::{SummaryRow, SummaryTable};

use matrix_util::traits::TriangleOps;
use matrix_util::vector_stat::{coef_variation, harmonic_mean, mean};
use rand_distr::{Distribution, Gamma, Poisson, StandardNormal};

pub const OBSERVED_SOCIAL_DIFFERENTIATION: &str = "Observed social differentiation";
pub const MEAN_INTERACTION_RATE: &str = "Mean interaction rate";
pub const SAMPLING_EFFORT: &str = "Sampling effort";
pub const ESTIMATED_INTERACTION_RATE: &str = "Estimated interaction rate";
pub const ESTIMATED_SOCIAL_DIFFERENTIATION: &str = "Estimated social differentiation";
pub const ESTIMATED_CORRELATION: &str = "Estimated correlation";
pub const ESTIMATED_SAMPLING_EFFORT: &str = "Estimated sampling effort";

/// Options for [`estimate_correlation`]
#[derive(Debug, Clone)]
pub struct EstimateOptions {
    /// two-sided confidence level of the reported intervals. Default: 0.95
    pub confidence: f64,
    /// number of Gaussian draws of the log-parameters. Default: 100000
    pub num_draws: usize,
    /// zero sampling efforts are raised to this value. Default: 1
    pub min_effort: f64,
    /// also return observed vs. model quantiles. Default: false
    pub qq_diagnostic: bool,
    /// relative finite-difference step of the Hessian. Default: 1e-3
    pub hessian_step: f64,
    pub nelder_mead: NelderMeadOptions,
}

impl Default for EstimateOptions {
    fn default() -> Self {
        EstimateOptions {
            confidence: DEFAULT_CONFIDENCE,
            num_draws: DEFAULT_NUM_DRAWS,
            min_effort: 1.0,
            qq_diagnostic: false,
            hessian_step: 1e-3,
            nelder_mead: NelderMeadOptions::default(),
        }
    }
}

/// Maximum-likelihood fit of the negative-binomial marginal
#[derive(Debug, Clone)]
pub struct NbFit {
    /// `ln a`
    pub log_shape: f64,
    /// `ln b`
    pub log_rate: f64,
    /// covariance of `(ln a, ln b)`, the inverse Hessian of the
    /// negative log-likelihood
    pub covariance: Mat,
    pub neg_log_likelihood: f64,
    pub iterations: usize,
    pub num_dyads: usize,
}

impl NbFit {
    pub fn shape(&self) -> f64 {
        self.log_shape.exp()
    }

    pub fn rate(&self) -> f64 {
        self.log_rate.exp()
    }
}

/// Sorted observed counts against sorted counts simulated from the
/// fitted model at the same sampling efforts
#[derive(Debug, Clone)]
pub struct QqDiagnostic {
    pub observed: Vec<f64>,
    pub fitted: Vec<f64>,
}

/// Output of [`estimate_correlation`]
#[derive(Debug, Clone)]
pub struct CorrelationEstimate {
    /// observed social differentiation, mean interaction rate,
    /// sampling effort, estimated interaction rate, estimated social
    /// differentiation, estimated correlation
    pub summary: SummaryTable,
    /// model-based sampling effort `I`
    pub sampling_effort: SummaryRow,
    pub fit: NbFit,
    pub qq: Option<QqDiagnostic>,
}

/// Pair up the independent dyads of `counts` and `effort`: the upper
/// triangle if undirected, every off-diagonal pair if directed
pub fn collect_dyads(
    counts: &Mat,
    effort: &Mat,
    directed: bool,
    min_effort: f64,
) -> Result<Vec<Dyad>> {
    let nn = check_square("counts", counts)?;
    if effort.shape() != counts.shape() {
        return Err(MungError::invalid(
            "effort",
            format!(
                "shape {:?} differs from counts {:?}",
                effort.shape(),
                counts.shape()
            ),
        ));
    }
    check_positive("min_effort", min_effort)?;

    let xx = counts.dyads(directed);
    let dd = effort.dyads(directed);

    if let Some(x) = xx
        .iter()
        .find(|&&x| !(x.is_finite() && x >= 0.0 && x.fract() == 0.0))
    {
        return Err(MungError::invalid(
            "counts",
            format!("must be non-negative integers, found {}", x),
        ));
    }
    if let Some(d) = dd.iter().find(|&&d| !(d.is_finite() && d >= 0.0)) {
        return Err(MungError::invalid(
            "effort",
            format!("must be non-negative and finite, found {}", d),
        ));
    }

    let num_zero = dd.iter().filter(|&&d| d == 0.0).count();
    if num_zero > 0 {
        warn!(
            "{} of {} dyads had zero sampling effort; raised to {}",
            num_zero,
            dd.len(),
            min_effort
        );
    }

    info!(
        "collected {} {} dyads from {} nodes",
        xx.len(),
        if directed { "directed" } else { "undirected" },
        nn
    );

    Ok(xx
        .into_iter()
        .zip(dd)
        .map(|(count, effort)| Dyad {
            count,
            effort: if effort > 0.0 { effort } else { min_effort },
        })
        .collect())
}

/// Maximize the negative-binomial likelihood from `θ = (0, 0)` and
/// invert its Hessian
pub fn fit_negative_binomial(dyads: &[Dyad], opts: &EstimateOptions) -> Result<NbFit> {
    if dyads.len() < 3 {
        return Err(MungError::UncertaintyPropagation(format!(
            "{} dyad(s) cannot identify two parameters",
            dyads.len()
        )));
    }

    let model = NbLikelihood::new(dyads);
    let opt = nelder_mead(
        |theta| model.neg_log_likelihood(theta),
        &[0.0, 0.0],
        &opts.nelder_mead,
    );

    if !opt.converged || !opt.value.is_finite() {
        return Err(MungError::UncertaintyPropagation(format!(
            "optimizer did not converge after {} iterations (nll = {})",
            opt.iterations, opt.value
        )));
    }

    let theta = opt.argmin;
    let hess = hessian_from_gradient(
        |th| model.neg_gradient(th).to_vec(),
        &theta,
        opts.hessian_step,
    );

    let eigen = hess.symmetric_eigenvalues();
    let lambda_min = eigen.min();
    let lambda_max = eigen.max();
    if !(lambda_min.is_finite() && lambda_min > 1e-8 && lambda_min > 1e-12 * lambda_max) {
        return Err(MungError::UncertaintyPropagation(format!(
            "Hessian is not positive definite at ln a = {:.3}, ln b = {:.3} \
             (eigenvalues {:.3e}, {:.3e})",
            theta[0],
            theta[1],
            lambda_min,
            lambda_max
        )));
    }

    let covariance = hess
        .cholesky()
        .map(|chol| chol.inverse())
        .ok_or_else(|| MungError::UncertaintyPropagation("Hessian is not invertible".into()))?;

    info!(
        "fitted NB: a = {:.4}, b = {:.4}, nll = {:.4}, {} iterations",
        theta[0].exp(),
        theta[1].exp(),
        opt.value,
        opt.iterations
    );

    Ok(NbFit {
        log_shape: theta[0],
        log_rate: theta[1],
        covariance,
        neg_log_likelihood: opt.value,
        iterations: opt.iterations,
        num_dyads: dyads.len(),
    })
}

/// Draw `(a, b)` pairs from the Gaussian approximation
/// `(ln a, ln b) ~ N(θ̂, H⁻¹)`
pub fn sample_parameters<R: rand::Rng + ?Sized>(
    fit: &NbFit,
    num_draws: usize,
    rng: &mut R,
) -> Result<Vec<(f64, f64)>> {
    let chol = fit.covariance.clone().cholesky().ok_or_else(|| {
        MungError::UncertaintyPropagation("covariance is not positive definite".into())
    })?;
    let ll = chol.l();
    let (l00, l10, l11) = (ll[(0, 0)], ll[(1, 0)], ll[(1, 1)]);

    Ok((0..num_draws)
        .map(|_| {
            let z0: f64 = StandardNormal.sample(rng);
            let z1: f64 = StandardNormal.sample(rng);
            let ln_a = fit.log_shape + l00 * z0;
            let ln_b = fit.log_rate + l10 * z0 + l11 * z1;
            (ln_a.exp(), ln_b.exp())
        })
        .collect())
}

/// Correlation between the observed and true rates of a dyad, given
/// social differentiation `S` and sampling effort `I`
pub fn network_correlation(social_differentiation: f64, sampling_effort: f64) -> f64 {
    let s2i = social_differentiation * social_differentiation * sampling_effort;
    (social_differentiation * sampling_effort.sqrt()) / (1.0 + s2i).sqrt()
}

fn qq_diagnostic<R: rand::Rng + ?Sized>(
    dyads: &[Dyad],
    fit: &NbFit,
    rng: &mut R,
) -> Result<QqDiagnostic> {
    let rgamma = Gamma::new(fit.shape(), 1.0 / fit.rate())
        .map_err(|e| MungError::Sampling(format!("{:?}", e)))?;

    let mut observed: Vec<f64> = dyads.iter().map(|d| d.count).collect();
    let mut fitted: Vec<f64> = dyads
        .iter()
        .map(|d| {
            let lambda = rgamma.sample(rng) * d.effort;
            match Poisson::new(lambda) {
                Ok(rpois) => rpois.sample(rng),
                Err(_) => 0.0,
            }
        })
        .collect();

    observed.sort_by(f64::total_cmp);
    fitted.sort_by(f64::total_cmp);
    Ok(QqDiagnostic { observed, fitted })
}

/// Estimate social differentiation, interaction rate, sampling effort
/// and network correlation from interaction counts and sampling
/// efforts.
///
/// * `counts` - `n x n` non-negative integer counts `X`
/// * `effort` - `n x n` sampling efforts `D`
/// * `directed` - use both triangles as independent dyads
///
/// Fails with `UncertaintyPropagation` if the likelihood surface does
/// not support a Gaussian approximation at its optimum.
pub fn estimate_correlation<R: rand::Rng + ?Sized>(
    counts: &Mat,
    effort: &Mat,
    directed: bool,
    opts: &EstimateOptions,
    rng: &mut R,
) -> Result<CorrelationEstimate> {
    check_open_unit("confidence", opts.confidence)?;
    if opts.num_draws < 2 {
        return Err(MungError::invalid("num_draws", "needs at least two draws"));
    }

    let dyads = collect_dyads(counts, effort, directed, opts.min_effort)?;

    let xx: Vec<f64> = dyads.iter().map(|d| d.count).collect();
    let dd: Vec<f64> = dyads.iter().map(|d| d.effort).collect();
    let rates: Vec<f64> = dyads.iter().map(|d| d.count / d.effort).collect();

    let harmonic_effort = harmonic_mean(&dd);
    let observed_rate = mean(&rates);

    let fit = fit_negative_binomial(&dyads, opts)?;
    let params = sample_parameters(&fit, opts.num_draws, rng)?;

    let num_draws = params.len();
    let mut sd_draws = Vec::with_capacity(num_draws);
    let mut rate_draws = Vec::with_capacity(num_draws);
    let mut effort_draws = Vec::with_capacity(num_draws);
    let mut rho_draws = Vec::with_capacity(num_draws);

    for &(a, b) in params.iter() {
        let s = 1.0 / a.sqrt();
        let mu = a / b;
        let i = mu * harmonic_effort;
        sd_draws.push(s);
        rate_draws.push(mu);
        effort_draws.push(i);
        rho_draws.push(network_correlation(s, i));
    }

    let confidence = opts.confidence;
    let summary = SummaryTable {
        confidence,
        rows: vec![
            SummaryRow::observed(OBSERVED_SOCIAL_DIFFERENTIATION, coef_variation(&xx)),
            SummaryRow::observed(MEAN_INTERACTION_RATE, observed_rate),
            SummaryRow::observed(SAMPLING_EFFORT, observed_rate * harmonic_effort),
            SummaryRow::from_draws(ESTIMATED_INTERACTION_RATE, &rate_draws, confidence),
            SummaryRow::from_draws(ESTIMATED_SOCIAL_DIFFERENTIATION, &sd_draws, confidence),
            SummaryRow::from_draws(ESTIMATED_CORRELATION, &rho_draws, confidence),
        ],
    };
    let sampling_effort =
        SummaryRow::from_draws(ESTIMATED_SAMPLING_EFFORT, &effort_draws, confidence);

    let qq = if opts.qq_diagnostic {
        Some(qq_diagnostic(&dyads, &fit, rng)?)
    } else {
        None
    };

    Ok(CorrelationEstimate {
        summary,
        sampling_effort,
        fit,
        qq,
    })
}
