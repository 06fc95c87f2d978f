/// Read and write dense matrices from and to delimited text files
pub trait IoOps {
    type Scalar;
    type Mat;

    /// Read a matrix, dropping the first `skip` lines, if any. The
    /// last dropped line is taken as the header. Comment lines (`#`,
    /// `%`) and empty lines are never counted.
    fn read_file_delim(file: &str, delim: &str, skip: Option<usize>) -> anyhow::Result<Self::Mat>;

    fn from_tsv(tsv_file: &str, skip: Option<usize>) -> anyhow::Result<Self::Mat> {
        Self::read_file_delim(tsv_file, "\t", skip)
    }

    fn write_file_delim(&self, file: &str, delim: &str) -> anyhow::Result<()>;

    fn to_tsv(&self, tsv_file: &str) -> anyhow::Result<()> {
        self.write_file_delim(tsv_file, "\t")
    }
}

/// Operations to sample random matrices element-wise. The caller owns
/// the random number generator so that parallel jobs can each hold
/// their own seeded stream.
pub trait SampleOps {
    type Mat;
    type Scalar;

    /// Sample a matrix from a standard normal distribution `N(0,1)`
    fn rnorm<R: rand::Rng + ?Sized>(dd: usize, nn: usize, rng: &mut R) -> Self::Mat;

    /// Sample a matrix from a gamma distribution with `param` is
    /// `(shape α, rate β)`
    ///
    /// $$f(x|\alpha,\beta) = \frac{\beta^{\alpha}}{\Gamma(\alpha)} x^{\alpha - 1} e^{-\beta x}$$
    ///
    /// Note: `rand_distr` takes `scale = 1/rate`
    fn rgamma<R: rand::Rng + ?Sized>(
        dd: usize,
        nn: usize,
        param: (Self::Scalar, Self::Scalar),
        rng: &mut R,
    ) -> anyhow::Result<Self::Mat>;

    /// Sample a matrix from a Poisson distribution with the same mean
    /// `lambda` everywhere
    fn rpois<R: rand::Rng + ?Sized>(
        dd: usize,
        nn: usize,
        lambda: Self::Scalar,
        rng: &mut R,
    ) -> anyhow::Result<Self::Mat>;

    /// Sample `Y(i,j) ~ Poisson(self(i,j))` element-wise. Non-positive
    /// or non-finite means give zero.
    fn rpois_elementwise<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> Self::Mat;
}

/// Square-matrix helpers to deal with dyads
pub trait TriangleOps {
    type Mat;
    type Scalar;

    /// Elements strictly above the diagonal, visited column by column
    fn upper_off_diagonal(&self) -> Vec<Self::Scalar>;

    /// Independent dyadic observations: the upper triangle if
    /// undirected, every off-diagonal element if directed
    fn dyads(&self, directed: bool) -> Vec<Self::Scalar>;

    /// Copy the upper triangle onto the lower triangle and clear the
    /// diagonal
    fn mirror_upper_inplace(&mut self);

    /// Clear the diagonal
    fn zero_diagonal_inplace(&mut self);

    /// Keep every off-diagonal element if directed; otherwise mirror
    /// the upper triangle. The diagonal is cleared either way.
    fn dyadic_inplace(&mut self, directed: bool) {
        if directed {
            self.zero_diagonal_inplace();
        } else {
            self.mirror_upper_inplace();
        }
    }

    fn is_symmetric(&self) -> bool;
}
