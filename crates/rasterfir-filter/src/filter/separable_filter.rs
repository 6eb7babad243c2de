use crate::{
    engine::{Filter, PixelOp, ScalarSeparableOp, SEPARABLE_PASSES},
    error::FilterError,
    pack::{PixelPack, PlaneView},
};

use super::kernels::Kernel1D;

/// Separable 2D convolution as a horizontal pass followed by a vertical pass.
///
/// Pass 0 computes `sum_i in(u + i - xc, v) * hX[i]`, pass 1 computes
/// `sum_j in(u, v + j - yc) * hY[j]` on the result of pass 0. The outcome equals a
/// [`super::LinearFilter`] with the kernel `Kernel2D::from_separable(hX, hY)` up to
/// rounding.
#[derive(Debug, Clone)]
pub struct LinearFilterSeparable {
    kernel_x: Kernel1D,
    kernel_y: Kernel1D,
}

impl LinearFilterSeparable {
    /// Create a new filter from a horizontal and a vertical kernel.
    pub fn new(kernel_x: Kernel1D, kernel_y: Kernel1D) -> Self {
        Self { kernel_x, kernel_y }
    }

    /// Create a new filter using the same kernel in both directions.
    pub fn isotropic(kernel: Kernel1D) -> Self {
        Self {
            kernel_x: kernel.clone(),
            kernel_y: kernel,
        }
    }

    /// The horizontal kernel.
    pub fn kernel_x(&self) -> &Kernel1D {
        &self.kernel_x
    }

    /// The vertical kernel.
    pub fn kernel_y(&self) -> &Kernel1D {
        &self.kernel_y
    }
}

impl ScalarSeparableOp for LinearFilterSeparable {
    fn filter_x(&self, source: &PlaneView<'_>, u: usize, v: usize) -> Result<f32, FilterError> {
        let k = &self.kernel_x;
        let x0 = u as isize - k.xc() as isize;

        let mut sum = 0.0f64;
        if x0 >= 0 && x0 as usize + k.width() <= source.width() {
            let offset = v * source.width() + x0 as usize;
            let src_row = &source.as_slice()[offset..offset + k.width()];
            for (&s, &w) in src_row.iter().zip(k.weights()) {
                sum += s as f64 * w as f64;
            }
        } else {
            for (i, &w) in k.weights().iter().enumerate() {
                sum += source.get_value(x0 + i as isize, v as isize)? as f64 * w as f64;
            }
        }
        Ok(sum as f32)
    }

    fn filter_y(&self, source: &PlaneView<'_>, u: usize, v: usize) -> Result<f32, FilterError> {
        let k = &self.kernel_y;
        let y0 = v as isize - k.xc() as isize;

        let mut sum = 0.0f64;
        if y0 >= 0 && y0 as usize + k.width() <= source.height() {
            let samples = source.as_slice();
            for (j, &w) in k.weights().iter().enumerate() {
                sum += samples[(y0 as usize + j) * source.width() + u] as f64 * w as f64;
            }
        } else {
            for (j, &w) in k.weights().iter().enumerate() {
                sum += source.get_value(u as isize, y0 + j as isize)? as f64 * w as f64;
            }
        }
        Ok(sum as f32)
    }
}

impl Filter for LinearFilterSeparable {
    fn passes_required(&self) -> usize {
        SEPARABLE_PASSES
    }

    fn init_pass(&mut self, _source: &PixelPack, pass: usize) -> Result<(), FilterError> {
        log::trace!(
            "separable pass {}: {} kernel of width {}",
            pass,
            if pass == 0 { "horizontal" } else { "vertical" },
            if pass == 0 {
                self.kernel_x.width()
            } else {
                self.kernel_y.width()
            }
        );
        Ok(())
    }

    fn pixel_op(&self) -> PixelOp<'_> {
        PixelOp::Scalar(self)
    }
}
