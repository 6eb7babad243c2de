use crate::{
    engine::{Filter, PixelOp},
    error::FilterError,
    pack::PixelPack,
};

use super::{
    kernels::{Kernel1D, Kernel2D},
    LinearFilter, LinearFilterSeparable,
};

/// Gaussian blur using a full 2D kernel.
///
/// Prefer [`GaussianFilterSeparable`], which produces the same result with fewer operations.
#[derive(Debug, Clone)]
pub struct GaussianFilter {
    inner: LinearFilter,
}

impl GaussianFilter {
    /// Create a new filter with the same sigma in both directions.
    pub fn new(sigma: f64) -> Result<Self, FilterError> {
        Self::with_sigmas(sigma, sigma)
    }

    /// Create a new filter with individual sigmas per direction.
    pub fn with_sigmas(sigma_x: f64, sigma_y: f64) -> Result<Self, FilterError> {
        Ok(Self {
            inner: LinearFilter::new(Kernel2D::gaussian(sigma_x, sigma_y)?),
        })
    }

    /// The kernel of the filter.
    pub fn kernel(&self) -> &Kernel2D {
        self.inner.kernel()
    }
}

impl Filter for GaussianFilter {
    fn pixel_op(&self) -> PixelOp<'_> {
        self.inner.pixel_op()
    }
}

/// Gaussian blur as a horizontal and a vertical 1D pass.
#[derive(Debug, Clone)]
pub struct GaussianFilterSeparable {
    inner: LinearFilterSeparable,
}

impl GaussianFilterSeparable {
    /// Create a new filter with the same sigma in both directions.
    ///
    /// # Examples
    ///
    /// ```
    /// use rasterfir_filter::{filter::GaussianFilterSeparable, Filter};
    /// use rasterfir_image::{Image, ImageSize};
    ///
    /// let size = ImageSize { width: 8, height: 6 };
    /// let mut image = Image::<u8, 3>::from_size_val(size, 100).unwrap();
    ///
    /// GaussianFilterSeparable::new(1.5).unwrap().apply_to(&mut image).unwrap();
    /// assert!(image.as_slice().iter().all(|&v| v == 100));
    /// ```
    pub fn new(sigma: f64) -> Result<Self, FilterError> {
        Self::with_sigmas(sigma, sigma)
    }

    /// Create a new filter with individual sigmas per direction.
    pub fn with_sigmas(sigma_x: f64, sigma_y: f64) -> Result<Self, FilterError> {
        Ok(Self {
            inner: LinearFilterSeparable::new(
                Kernel1D::gaussian(sigma_x)?,
                Kernel1D::gaussian(sigma_y)?,
            ),
        })
    }

    /// The horizontal kernel.
    pub fn kernel_x(&self) -> &Kernel1D {
        self.inner.kernel_x()
    }

    /// The vertical kernel.
    pub fn kernel_y(&self) -> &Kernel1D {
        self.inner.kernel_y()
    }
}

impl Filter for GaussianFilterSeparable {
    fn passes_required(&self) -> usize {
        self.inner.passes_required()
    }

    fn init_pass(&mut self, source: &PixelPack, pass: usize) -> Result<(), FilterError> {
        self.inner.init_pass(source, pass)
    }

    fn pixel_op(&self) -> PixelOp<'_> {
        self.inner.pixel_op()
    }
}
