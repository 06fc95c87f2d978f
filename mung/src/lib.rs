//! Reliability of social networks reconstructed from sparse,
//! unevenly sampled interaction counts, and power analysis of nodal
//! regressions on such networks.
//!
//! Counts follow a Gamma-Poisson model: the true interaction rate of a
//! dyad is Gamma distributed across dyads, and the observed count is
//! Poisson given the rate and the sampling effort.

pub mod common;
pub mod error;
pub mod estimate; // negative-binomial fit and network correlation
pub mod gamma_poisson; // generative model
pub mod graph_metric; // strength, eigenvector, closeness, betweenness
pub mod nb_likelihood;
pub mod optim;
pub mod power; // Monte Carlo power of node-level regressions
pub mod regression;
pub mod summary;
