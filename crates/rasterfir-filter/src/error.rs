use rasterfir_image::ImageError;

/// An error type for the filter module.
#[derive(thiserror::Error, Debug)]
pub enum FilterError {
    /// Error when a coordinate falls outside the image under the throwing strategy.
    #[error("out-of-image position [{0},{1}] for an image of size {2}x{3}")]
    OutOfImage(isize, isize, usize, usize),

    /// Error when the image or pack has a zero dimension.
    #[error("image size must be non-zero, got {0}x{1}")]
    InvalidImageSize(usize, usize),

    /// Error when a pack is created without planes.
    #[error("pixel pack depth must be at least 1")]
    InvalidDepth,

    /// Error when a plane index exceeds the pack depth.
    #[error("plane index {0} is out of bounds for a pack of depth {1}")]
    PlaneIndexOutOfBounds(usize, usize),

    /// Error when the pack and a native image disagree on shape.
    #[error("pack holds {0} planes of {1}x{2} but the image expects {3} planes of {4}x{5}")]
    ShapeMismatch(usize, usize, usize, usize, usize, usize),

    /// Error when a pixel vector does not have one value per plane.
    #[error("pixel has {0} components but the pack has {1} planes")]
    InvalidPixelLength(usize, usize),

    /// Error when a kernel has no weights.
    #[error("filter kernel must not be empty")]
    EmptyKernel,

    /// Error when the rows of a 2D kernel have different lengths.
    #[error("non-rectangular filter kernel: row {0} has {1} weights, expected {2}")]
    NonRectangularKernel(usize, usize, usize),

    /// Error when the kernel sum cannot be used for normalization.
    #[error("zero kernel sum, cannot normalize")]
    ZeroKernelSum,

    /// Error when the hot spot lies outside the kernel.
    #[error("hot spot ({0}, {1}) lies outside a {2}x{3} kernel")]
    InvalidHotSpot(usize, usize, usize, usize),

    /// Error when a filter parameter is out of its valid range.
    #[error("invalid filter parameter `{0}`: {1}")]
    InvalidParameter(&'static str, f64),

    /// Error when a filter declares no passes.
    #[error("a filter must declare at least one pass")]
    NoPasses,

    /// Error when a per-pixel operation is invoked with a pass it does not handle.
    #[error("invalid pass number {0}, the filter declares {1} passes")]
    InvalidPass(usize, usize),

    /// Error when the progress monitor thread cannot be spawned.
    #[error("failed to spawn the progress monitor thread")]
    MonitorSpawn(#[source] std::io::Error),

    /// Error from the image module.
    #[error(transparent)]
    Image(#[from] ImageError),
}
