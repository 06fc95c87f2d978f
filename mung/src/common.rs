pub use log::{info, warn};

pub use crate::error::{check_open_unit, check_positive, MungError, Result};

pub type Mat = nalgebra::DMatrix<f64>;
pub type DVec = nalgebra::DVector<f64>;

pub const DEFAULT_CONFIDENCE: f64 = 0.95;
pub const DEFAULT_SIGNIFICANCE: f64 = 0.05;
pub const DEFAULT_NUM_DRAWS: usize = 100_000;
pub const DEFAULT_NUM_ITERS: usize = 1000;

/// A seeded generator if `rseed` is given, otherwise one seeded from
/// the thread-local entropy source
pub fn make_rng(rseed: Option<u64>) -> rand::rngs::StdRng {
    use rand::SeedableRng;
    match rseed {
        Some(seed) => rand::rngs::StdRng::seed_from_u64(seed),
        None => rand::rngs::StdRng::from_rng(&mut rand::rng()),
    }
}

/// Convert social differentiation `S` and mean rate `μ` to the
/// `(shape, rate)` of the Gamma distribution of dyadic rates
///
/// ```text
/// a = 1/S², b = a/μ
/// ```
pub fn gamma_shape_rate(social_differentiation: f64, mean_rate: f64) -> Result<(f64, f64)> {
    check_positive("social_differentiation", social_differentiation)?;
    check_positive("mean_rate", mean_rate)?;
    let shape = 1.0 / (social_differentiation * social_differentiation);
    Ok((shape, shape / mean_rate))
}

/// Check that a matrix is square with at least two rows
pub fn check_square(name: &'static str, mat: &Mat) -> Result<usize> {
    if mat.nrows() != mat.ncols() {
        return Err(MungError::invalid(
            name,
            format!("must be square, got {} x {}", mat.nrows(), mat.ncols()),
        ));
    }
    if mat.nrows() < 2 {
        return Err(MungError::invalid(name, "needs at least two nodes"));
    }
    Ok(mat.nrows())
}
