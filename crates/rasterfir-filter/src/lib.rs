#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the filter module.
pub mod error;

/// out-of-bounds pixel indexing.
pub mod indexer;

/// channel-agnostic pixel plane storage.
pub mod pack;

/// the generic multi-pass filter engine.
pub mod engine;

/// execution strategies for the pixel loop.
pub mod parallel;

/// progress reporting of filter invocations.
pub mod progress;

/// kernels and concrete filters.
pub mod filter;

pub use crate::engine::{
    Filter, FilterEngine, FilterParams, PixelOp, ScalarPixelOp, ScalarSeparableOp, VectorPixelOp,
    VectorSeparableOp, SEPARABLE_PASSES,
};
pub use crate::error::FilterError;
pub use crate::indexer::{OutOfBoundsStrategy, PixelIndexer};
pub use crate::pack::{NativeImage, PixelPack, Plane, PlaneView};
pub use crate::parallel::ExecutionStrategy;
pub use crate::progress::{FilterProgress, ProgressMonitor};
