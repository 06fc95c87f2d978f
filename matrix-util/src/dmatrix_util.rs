use crate::traits::*;
pub use nalgebra::{DMatrix, DVector};
use rand_distr::{Distribution, Gamma, Poisson, StandardNormal};

impl SampleOps for DMatrix<f64> {
    type Mat = Self;
    type Scalar = f64;

    fn rnorm<R: rand::Rng + ?Sized>(dd: usize, nn: usize, rng: &mut R) -> Self::Mat {
        DMatrix::<f64>::from_fn(dd, nn, |_, _| StandardNormal.sample(rng))
    }

    fn rgamma<R: rand::Rng + ?Sized>(
        dd: usize,
        nn: usize,
        param: (f64, f64),
        rng: &mut R,
    ) -> anyhow::Result<Self::Mat> {
        let (shape, rate) = param;
        let rgamma = Gamma::new(shape, 1.0 / rate)
            .map_err(|e| anyhow::anyhow!("Gamma(shape={}, rate={}): {:?}", shape, rate, e))?;
        Ok(DMatrix::<f64>::from_fn(dd, nn, |_, _| rgamma.sample(rng)))
    }

    fn rpois<R: rand::Rng + ?Sized>(
        dd: usize,
        nn: usize,
        lambda: f64,
        rng: &mut R,
    ) -> anyhow::Result<Self::Mat> {
        let rpois = Poisson::new(lambda)
            .map_err(|e| anyhow::anyhow!("Poisson(lambda={}): {:?}", lambda, e))?;
        Ok(DMatrix::<f64>::from_fn(dd, nn, |_, _| rpois.sample(rng)))
    }

    fn rpois_elementwise<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> Self::Mat {
        self.map(|lambda| match Poisson::new(lambda) {
            Ok(rpois) if lambda > 0.0 => rpois.sample(rng),
            _ => 0.0,
        })
    }
}

impl<T> TriangleOps for DMatrix<T>
where
    T: nalgebra::Scalar + Copy + num_traits::Zero + PartialEq,
{
    type Mat = Self;
    type Scalar = T;

    fn upper_off_diagonal(&self) -> Vec<T> {
        let nn = self.nrows().min(self.ncols());
        let mut ret = Vec::with_capacity(nn * nn.saturating_sub(1) / 2);
        for j in 0..nn {
            for i in 0..j {
                ret.push(self[(i, j)]);
            }
        }
        ret
    }

    fn dyads(&self, directed: bool) -> Vec<T> {
        if !directed {
            return self.upper_off_diagonal();
        }
        let nn = self.nrows().min(self.ncols());
        let mut ret = self.upper_off_diagonal();
        ret.reserve(nn * nn.saturating_sub(1) / 2);
        for j in 0..nn {
            for i in (j + 1)..nn {
                ret.push(self[(i, j)]);
            }
        }
        ret
    }

    fn mirror_upper_inplace(&mut self) {
        let nn = self.nrows().min(self.ncols());
        for j in 0..nn {
            for i in 0..j {
                self[(j, i)] = self[(i, j)];
            }
        }
        self.zero_diagonal_inplace();
    }

    fn zero_diagonal_inplace(&mut self) {
        let nn = self.nrows().min(self.ncols());
        for i in 0..nn {
            self[(i, i)] = T::zero();
        }
    }

    fn is_symmetric(&self) -> bool {
        if self.nrows() != self.ncols() {
            return false;
        }
        let nn = self.nrows();
        (0..nn).all(|j| (0..j).all(|i| self[(i, j)] == self[(j, i)]))
    }
}
