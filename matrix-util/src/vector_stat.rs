//! Summary statistics over plain slices of `f64`

/// Arithmetic mean; `NaN` for an empty slice
pub fn mean(xx: &[f64]) -> f64 {
    if xx.is_empty() {
        return f64::NAN;
    }
    xx.iter().sum::<f64>() / xx.len() as f64
}

/// Sample standard deviation with `n - 1` in the denominator; `NaN`
/// if fewer than two elements
pub fn sd(xx: &[f64]) -> f64 {
    let nn = xx.len();
    if nn < 2 {
        return f64::NAN;
    }
    let mu = mean(xx);
    let ss = xx.iter().map(|&x| (x - mu) * (x - mu)).sum::<f64>();
    (ss / (nn - 1) as f64).sqrt()
}

/// Coefficient of variation `sd / mean`
pub fn coef_variation(xx: &[f64]) -> f64 {
    sd(xx) / mean(xx)
}

/// Harmonic mean `n / sum(1/x)`; `NaN` if any element is non-positive
pub fn harmonic_mean(xx: &[f64]) -> f64 {
    if xx.is_empty() || xx.iter().any(|&x| x <= 0.0) {
        return f64::NAN;
    }
    xx.len() as f64 / xx.iter().map(|&x| 1.0 / x).sum::<f64>()
}

/// Empirical quantile of already sorted data, interpolating linearly
/// between order statistics at `h = (n - 1) p`
pub fn quantile_sorted(sorted: &[f64], prob: f64) -> f64 {
    let nn = sorted.len();
    if nn == 0 {
        return f64::NAN;
    }
    let h = (nn - 1) as f64 * prob.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

/// Empirical quantiles at several probabilities. Non-finite values
/// are dropped before sorting.
pub fn quantiles(xx: &[f64], probs: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = xx.iter().copied().filter(|x| x.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    probs.iter().map(|&p| quantile_sorted(&sorted, p)).collect()
}

/// Round to `digits` significant figures
pub fn round_signif(x: f64, digits: i32) -> f64 {
    if x == 0.0 || !x.is_finite() {
        return x;
    }
    let magnitude = x.abs().log10().floor() as i32;
    let shift = digits - 1 - magnitude;
    if shift >= 0 {
        let scale = 10_f64.powi(shift);
        (x * scale).round() / scale
    } else {
        let scale = 10_f64.powi(-shift);
        (x / scale).round() * scale
    }
}
