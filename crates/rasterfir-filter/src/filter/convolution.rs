use crate::{
    engine::{Filter, PixelOp, ScalarPixelOp},
    error::FilterError,
    pack::PlaneView,
};

use super::kernels::Kernel2D;

/// Full 2D convolution of every plane with a [`Kernel2D`].
///
/// Computes `out(u, v) = sum_{j, i} in(u + i - xc, v + j - yc) * H[j][i]` in a single pass,
/// accumulating in `f64`.
#[derive(Debug, Clone)]
pub struct LinearFilter {
    kernel: Kernel2D,
}

impl LinearFilter {
    /// Create a new filter from a 2D kernel.
    pub fn new(kernel: Kernel2D) -> Self {
        Self { kernel }
    }

    /// The kernel of the filter.
    pub fn kernel(&self) -> &Kernel2D {
        &self.kernel
    }
}

impl ScalarPixelOp for LinearFilter {
    fn filter_pixel(
        &self,
        source: &PlaneView<'_>,
        u: usize,
        v: usize,
        pass: usize,
    ) -> Result<f32, FilterError> {
        if pass != 0 {
            return Err(FilterError::InvalidPass(pass, 1));
        }

        let k = &self.kernel;
        let x0 = u as isize - k.xc() as isize;
        let y0 = v as isize - k.yc() as isize;

        let inside = x0 >= 0
            && y0 >= 0
            && x0 as usize + k.width() <= source.width()
            && y0 as usize + k.height() <= source.height();

        let mut sum = 0.0f64;
        if inside {
            // the window lies within the plane, skip the indexer
            let samples = source.as_slice();
            for j in 0..k.height() {
                let offset = (y0 as usize + j) * source.width() + x0 as usize;
                let src_row = &samples[offset..offset + k.width()];
                for (&s, &w) in src_row.iter().zip(k.row(j)) {
                    sum += s as f64 * w as f64;
                }
            }
        } else {
            for j in 0..k.height() {
                let y = y0 + j as isize;
                for (i, &w) in k.row(j).iter().enumerate() {
                    sum += source.get_value(x0 + i as isize, y)? as f64 * w as f64;
                }
            }
        }

        Ok(sum as f32)
    }
}

impl Filter for LinearFilter {
    fn pixel_op(&self) -> PixelOp<'_> {
        PixelOp::Scalar(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FilterParams, OutOfBoundsStrategy};
    use rasterfir_image::{Image, ImageSize};

    fn size(width: usize, height: usize) -> ImageSize {
        ImageSize { width, height }
    }

    #[test]
    fn test_identity_kernel() -> Result<(), FilterError> {
        let data = (0..5 * 4 * 3).map(|i| (i * 7 % 256) as u8).collect::<Vec<_>>();
        let mut image = Image::<u8, 3>::new(size(5, 4), data.clone())?;

        let kernel = Kernel2D::new(&[[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]])?;
        LinearFilter::new(kernel).apply_to(&mut image)?;

        assert_eq!(image.as_slice(), data.as_slice());
        Ok(())
    }

    #[test]
    fn test_zero_border() -> Result<(), FilterError> {
        #[rustfmt::skip]
        let mut image = Image::<f32, 1>::new(size(3, 3), vec![
            1.0, 1.0, 1.0,
            1.0, 1.0, 1.0,
            1.0, 1.0, 1.0,
        ])?;

        let kernel = Kernel2D::with_hot_spot(&[[1.0; 3]; 3], 1, 1, false)?;
        let params = FilterParams {
            out_of_bounds: OutOfBoundsStrategy::Zero,
            ..Default::default()
        };
        LinearFilter::new(kernel).apply_to_with(&mut image, &params)?;

        #[rustfmt::skip]
        assert_eq!(image.as_slice(), &[
            4.0, 6.0, 4.0,
            6.0, 9.0, 6.0,
            4.0, 6.0, 4.0,
        ]);
        Ok(())
    }

    #[test]
    fn test_off_center_hot_spot() -> Result<(), FilterError> {
        let mut image = Image::<f32, 1>::new(size(4, 1), vec![1.0, 2.0, 3.0, 4.0])?;

        // out(u) = in(u + 1)
        let kernel = Kernel2D::with_hot_spot(&[[0.0, 1.0]], 0, 0, false)?;
        LinearFilter::new(kernel).apply_to(&mut image)?;

        assert_eq!(image.as_slice(), &[2.0, 3.0, 4.0, 4.0]);
        Ok(())
    }

    #[test]
    fn test_invalid_pass() -> Result<(), FilterError> {
        let filter = LinearFilter::new(Kernel2D::new(&[[1.0]])?);
        let pack = crate::PixelPack::new(size(2, 2), 1, OutOfBoundsStrategy::Zero)?;
        let view = pack.plane(0)?;
        assert_eq!(filter.filter_pixel(&view, 1, 1, 0)?, 0.0);
        assert!(matches!(
            filter.filter_pixel(&view, 0, 0, 1),
            Err(FilterError::InvalidPass(1, 1))
        ));
        Ok(())
    }
}
