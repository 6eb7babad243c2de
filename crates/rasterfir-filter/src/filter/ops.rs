use rasterfir_image::{Image, SampleType};

use crate::{
    engine::{Filter, FilterEngine, FilterParams},
    error::FilterError,
    pack::PixelPack,
};

use super::{
    kernels::{Kernel1D, Kernel2D},
    LinearFilter, LinearFilterSeparable, ScalarMedianFilter,
};

fn filter_into<F, T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    filter: &mut F,
) -> Result<(), FilterError>
where
    F: Filter,
    T: SampleType,
{
    if src.size() != dst.size() {
        return Err(FilterError::ShapeMismatch(
            C,
            src.width(),
            src.height(),
            C,
            dst.width(),
            dst.height(),
        ));
    }

    let params = FilterParams::default();
    let pack = PixelPack::from_image(src, params.out_of_bounds)?;
    let out = FilterEngine::new(params).apply_to_pack(filter, pack)?;
    out.write_to(dst)
}

/// Convolve an image with a 2D kernel.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel` - The 2D kernel.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
pub fn linear_filter<T: SampleType, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    kernel: &Kernel2D,
) -> Result<(), FilterError> {
    filter_into(src, dst, &mut LinearFilter::new(kernel.clone()))
}

/// Convolve an image with a horizontal and a vertical 1D kernel.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_x` - The horizontal kernel.
/// * `kernel_y` - The vertical kernel.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
pub fn separable_filter<T: SampleType, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    kernel_x: &Kernel1D,
    kernel_y: &Kernel1D,
) -> Result<(), FilterError> {
    filter_into(
        src,
        dst,
        &mut LinearFilterSeparable::new(kernel_x.clone(), kernel_y.clone()),
    )
}

/// Blur an image using a box blur filter
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_size` - The size of the kernel (kernel_x, kernel_y).
///
/// PRECONDITION: `src` and `dst` must have the same shape.
pub fn box_blur<T: SampleType, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    kernel_size: (usize, usize),
) -> Result<(), FilterError> {
    let kernel_x = Kernel1D::box_blur(kernel_size.0)?;
    let kernel_y = Kernel1D::box_blur(kernel_size.1)?;
    separable_filter(src, dst, &kernel_x, &kernel_y)
}

/// Blur an image using a gaussian blur filter
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_size` - The size of the kernel (kernel_x, kernel_y).
/// * `sigma` - The sigma of the gaussian kernel.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
pub fn gaussian_blur<T: SampleType, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    kernel_size: (usize, usize),
    sigma: (f32, f32),
) -> Result<(), FilterError> {
    let kernel_x = Kernel1D::gaussian_with_size(kernel_size.0, sigma.0)?;
    let kernel_y = Kernel1D::gaussian_with_size(kernel_size.1, sigma.1)?;
    separable_filter(src, dst, &kernel_x, &kernel_y)
}

/// Apply a median filter with a disc mask to every channel.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `radius` - The radius of the disc mask.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
pub fn median_blur<T: SampleType, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    radius: f64,
) -> Result<(), FilterError> {
    filter_into(src, dst, &mut ScalarMedianFilter::new(radius)?)
}
