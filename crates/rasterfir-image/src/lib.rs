#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// image representation for filtering purposes.
pub mod image;

/// Error types for the image module.
pub mod error;

/// packed and indexed native image encodings.
pub mod packed;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize, SampleType};
pub use crate::packed::{IndexedImage, PackedRgbImage};
