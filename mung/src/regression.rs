use crate::common::*;
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Ordinary least squares fit of `y = α + β x + ε`
#[derive(Debug, Clone, Copy)]
pub struct SimpleOls {
    pub intercept: f64,
    pub slope: f64,
    pub slope_se: f64,
    pub df: f64,
}

impl SimpleOls {
    pub fn fit(response: &[f64], predictor: &[f64]) -> Result<Self> {
        let nn = response.len();
        if predictor.len() != nn {
            return Err(MungError::Regression(format!(
                "response has {} values, predictor {}",
                nn,
                predictor.len()
            )));
        }
        if nn < 3 {
            return Err(MungError::Regression(format!(
                "{} observations leave no residual degrees of freedom",
                nn
            )));
        }

        let n = nn as f64;
        let x_bar = predictor.iter().sum::<f64>() / n;
        let y_bar = response.iter().sum::<f64>() / n;

        let (mut sxx, mut sxy) = (0.0, 0.0);
        for (&x, &y) in predictor.iter().zip(response) {
            sxx += (x - x_bar) * (x - x_bar);
            sxy += (x - x_bar) * (y - y_bar);
        }

        if !(sxx.is_finite() && sxx > f64::EPSILON * n * x_bar.abs().max(1.0).powi(2)) {
            return Err(MungError::Regression(
                "predictor has zero variance".to_string(),
            ));
        }

        let slope = sxy / sxx;
        let intercept = y_bar - slope * x_bar;
        let rss: f64 = predictor
            .iter()
            .zip(response)
            .map(|(&x, &y)| {
                let r = y - intercept - slope * x;
                r * r
            })
            .sum();
        let df = n - 2.0;
        let slope_se = (rss / df / sxx).sqrt();

        Ok(Self {
            intercept,
            slope,
            slope_se,
            df,
        })
    }

    /// Two-sided p-value of `H0: β = 0` under the t-test
    pub fn slope_pvalue(&self) -> Result<f64> {
        let tstat = self.slope / self.slope_se;
        if tstat.is_nan() {
            return Err(MungError::Regression("undefined t statistic".to_string()));
        }
        if tstat.is_infinite() {
            return Ok(0.0);
        }
        let tdist = StudentsT::new(0.0, 1.0, self.df)
            .map_err(|e| MungError::Regression(e.to_string()))?;
        Ok((2.0 * tdist.sf(tstat.abs())).min(1.0))
    }
}

/// Two-sided p-value of the slope of `response ~ predictor`
pub fn slope_pvalue(response: &[f64], predictor: &[f64]) -> Result<f64> {
    SimpleOls::fit(response, predictor)?.slope_pvalue()
}
