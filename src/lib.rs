//! nanstat: NaN-aware array statistics with parallel processing
//!
//! A Rust library for computing statistics over large multi-dimensional
//! numeric buffers, such as stacked detector images. nanstat provides
//! NaN-aware reductions (sum, mean, variance, standard deviation,
//! minimum, maximum) over arbitrary axis subsets, plus one-dimensional
//! histogram binning, with results interchangeable with the usual
//! `nansum`/`nanmean`-family semantics within floating-point tolerance.
//!
//! ## Key Features
//!
//! - **Parallel Processing**: Efficient computation using Rayon for
//!   multi-core processing, with deterministic merge ordering
//! - **NaN-Aware Semantics**: NaN samples are treated as absent data,
//!   excluded from counts and accumulations
//! - **Axis Reductions**: Reduce over any subset of axes, with negative
//!   indices and a keep-dims mode
//! - **Stable Variance**: Welford accumulation with a parallel merge
//!   rule, numerically stable under partitioning
//! - **Histograms**: Equal-width binning over given or data-derived
//!   ranges
//! - **Runtime Dispatch**: A closed tagged-variant layer for buffers
//!   whose element type is only known at run time
//!
//! ## Module Organization
//!
//! The library is organized into logical modules:
//!
//! - [`statistics`]: NaN-aware reductions and the accumulator kernels
//! - [`histogram`]: One-dimensional histogram binning
//! - [`dispatch`]: Runtime element-type dispatch
//! - [`parallel`]: Worker pool configuration
//! - [`errors`]: Centralized error handling
//!
//! ## Usage Examples
//!
//! ### Reductions
//! ```rust
//! use ndarray::{array, IxDyn};
//! use nanstat::prelude::*;
//!
//! let data = array![[1.0_f64, f64::NAN, 3.0], [f64::NAN, 5.0, 6.0]].into_dyn();
//!
//! // Mean of all non-NaN samples
//! let mean = data.nan_reduce(Reduction::Mean, None, false).unwrap();
//! assert_eq!(mean[IxDyn(&[])], 3.75);
//!
//! // Column sums, skipping NaN values
//! let column_sums = nanstat::statistics::nansum(&data.view(), Some(&[0]), false).unwrap();
//! assert_eq!(column_sums, array![1.0, 5.0, 9.0].into_dyn());
//! ```
//!
//! ### Histograms
//! ```rust
//! use ndarray::Array1;
//! use nanstat::histogram::histogram1d;
//!
//! let samples: Array1<f64> = (0..10).map(f64::from).collect();
//! let samples = samples.into_dyn();
//!
//! let hist = histogram1d(&samples.view(), 5, None).unwrap();
//! assert_eq!(hist.total_count(), 10);
//! assert_eq!(hist.counts[4], 2); // 8 and 9: the last bin is closed
//! ```
//!
//! The kernels never copy or retain the input buffer beyond a single
//! call; the only process-wide state is the shared worker pool.

// Core modules
pub mod dispatch;
pub mod errors;
pub mod histogram;
pub mod parallel;
pub mod statistics;

// Direct re-exports for the public API
pub use dispatch::*;
pub use errors::*;
pub use histogram::*;
pub use parallel::*;
pub use statistics::*;

// High-level convenience API
pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::dispatch::{ArrayData, ArrayOutput, ElementType, HistogramOutput};
    pub use crate::errors::{NanstatError, Result};
    pub use crate::histogram::Histogram;
    pub use crate::parallel::ParallelConfig;
    pub use crate::statistics::{NanElement, Reduction, StatisticalReduction};
}
