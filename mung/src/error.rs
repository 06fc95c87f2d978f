use thiserror::Error;

/// Errors raised by simulation, estimation and power analysis
#[derive(Debug, Error)]
pub enum MungError {
    /// An input is out of range or has the wrong shape
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// The likelihood fit cannot support a Gaussian approximation: the
    /// optimizer did not converge or the Hessian is not positive definite
    #[error("uncertainty propagation invalid: {0}")]
    UncertaintyPropagation(String),

    /// One power-analysis iteration could not produce a p-value
    #[error("regression failed: {0}")]
    Regression(String),

    /// A random variate could not be drawn
    #[error("sampling failed: {0}")]
    Sampling(String),
}

impl MungError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        MungError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MungError>;

/// Fail with `InvalidParameter` unless `value` is finite and strictly
/// positive
pub fn check_positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(MungError::invalid(name, format!("must be > 0, got {}", value)))
    }
}

/// Fail with `InvalidParameter` unless `0 < value < 1`
pub fn check_open_unit(name: &'static str, value: f64) -> Result<()> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(MungError::invalid(
            name,
            format!("must lie in (0, 1), got {}", value),
        ))
    }
}

impl From<anyhow::Error> for MungError {
    fn from(e: anyhow::Error) -> Self {
        MungError::Sampling(e.to_string())
    }
}
