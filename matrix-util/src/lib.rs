pub mod common_io; // gzip-aware line readers and writers
pub mod dmatrix_io; // delimited text io for `DMatrix`
pub mod dmatrix_util; // random sampling and dyad helpers for `DMatrix`
pub mod traits;
pub mod vector_stat; // mean, sd, quantiles over slices
