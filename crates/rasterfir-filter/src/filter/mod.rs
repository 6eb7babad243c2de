//! Filter operations
//!
//! This module provides the concrete filters driven by the [`crate::FilterEngine`].

/// Filter kernels
pub mod kernels;

/// Full 2D linear convolution
mod convolution;
pub use convolution::*;

/// Separable linear convolution
mod separable_filter;
pub use separable_filter::*;

/// Gaussian blur filters
mod gaussian;
pub use gaussian::*;

/// Median filters
pub mod median;
pub use median::{ScalarMedianFilter, VectorMedianFilter, VectorMedianFilterSharpen};

/// Convenience operations on images
mod ops;
pub use ops::*;
