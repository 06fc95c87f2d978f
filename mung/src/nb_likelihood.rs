//! Negative-binomial marginal likelihood of the Gamma-Poisson model
//!
//! Integrating the latent rate `λ ~ Gamma(a, b)` out of
//! `x ~ Poisson(λ d)` gives
//!
//! ```text
//! x ~ NB(r = a, p = b / (b + d))
//! log f(x) = lnΓ(x+a) - lnΓ(a) - lnΓ(x+1) + a ln(b/(b+d)) + x ln(d/(b+d))
//! ```
//!
//! Parameters are optimized on the log scale, `θ = (ln a, ln b)`.

use statrs::function::gamma::{digamma, ln_gamma};

/// A dyadic observation: count and sampling effort
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dyad {
    pub count: f64,
    pub effort: f64,
}

/// Log-likelihood of every dyad under `NB(a, b/(b+d))`
pub struct NbLikelihood<'a> {
    dyads: &'a [Dyad],
    ln_factorial: Vec<f64>,
}

impl<'a> NbLikelihood<'a> {
    pub fn new(dyads: &'a [Dyad]) -> Self {
        let ln_factorial = dyads.iter().map(|d| ln_gamma(d.count + 1.0)).collect();
        Self {
            dyads,
            ln_factorial,
        }
    }

    /// Summed log-likelihood at `(a, b)`
    pub fn log_likelihood(&self, shape: f64, rate: f64) -> f64 {
        if !(shape > 0.0 && rate > 0.0 && shape.is_finite() && rate.is_finite()) {
            return f64::NEG_INFINITY;
        }
        let ln_gamma_a = ln_gamma(shape);
        let ln_b = rate.ln();
        self.dyads
            .iter()
            .zip(self.ln_factorial.iter())
            .map(|(dy, &ln_fact)| {
                let ln_bd = (rate + dy.effort).ln();
                let mut llik = ln_gamma(dy.count + shape) - ln_gamma_a - ln_fact
                    + shape * (ln_b - ln_bd);
                if dy.count > 0.0 {
                    llik += dy.count * (dy.effort.ln() - ln_bd);
                }
                llik
            })
            .sum()
    }

    /// Negative log-likelihood over `θ = (ln a, ln b)`
    pub fn neg_log_likelihood(&self, theta: &[f64]) -> f64 {
        let nll = -self.log_likelihood(theta[0].exp(), theta[1].exp());
        if nll.is_nan() {
            f64::INFINITY
        } else {
            nll
        }
    }

    /// Gradient of the negative log-likelihood over `θ = (ln a, ln b)`
    ///
    /// ```text
    /// ∂/∂ln a = a [ψ(x+a) - ψ(a) + ln b - ln(b+d)]
    /// ∂/∂ln b = a - (a+x) b/(b+d)
    /// ```
    pub fn neg_gradient(&self, theta: &[f64]) -> [f64; 2] {
        let (shape, rate) = (theta[0].exp(), theta[1].exp());
        let psi_a = digamma(shape);
        let ln_b = rate.ln();
        let (mut g_a, mut g_b) = (0.0, 0.0);
        for dy in self.dyads {
            let bd = rate + dy.effort;
            g_a += shape * (digamma(dy.count + shape) - psi_a + ln_b - bd.ln());
            g_b += shape - (shape + dy.count) * rate / bd;
        }
        [-g_a, -g_b]
    }
}
