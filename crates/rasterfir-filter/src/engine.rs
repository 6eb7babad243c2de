use std::sync::Arc;

use crate::{
    error::FilterError,
    indexer::OutOfBoundsStrategy,
    pack::{NativeImage, PixelPack, PlaneView},
    parallel::{try_for_each_row, ExecutionStrategy},
    progress::FilterProgress,
};

/// Parameters of a filter invocation.
///
/// # Examples
///
/// ```
/// use rasterfir_filter::{ExecutionStrategy, FilterParams, OutOfBoundsStrategy};
///
/// let params = FilterParams {
///     out_of_bounds: OutOfBoundsStrategy::Zero,
///     ..Default::default()
/// };
/// assert_eq!(params.execution, ExecutionStrategy::Auto);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterParams {
    /// How reads outside the image are resolved.
    pub out_of_bounds: OutOfBoundsStrategy,
    /// How the pixel loop of every pass is executed.
    pub execution: ExecutionStrategy,
}

/// A per-pixel operation applied independently to every plane of a pack.
pub trait ScalarPixelOp: Sync {
    /// Compute the new value of pixel `(u, v)` of one plane.
    ///
    /// # Arguments
    ///
    /// * `source` - The plane as it was before the current pass.
    /// * `u` - The column of the pixel.
    /// * `v` - The row of the pixel.
    /// * `pass` - The zero-based pass number.
    fn filter_pixel(
        &self,
        source: &PlaneView<'_>,
        u: usize,
        v: usize,
        pass: usize,
    ) -> Result<f32, FilterError>;
}

/// A per-pixel operation that computes all planes of a pixel jointly.
pub trait VectorPixelOp: Sync {
    /// Compute the new values of pixel `(u, v)` into `out`, one value per plane.
    ///
    /// # Arguments
    ///
    /// * `source` - The pack as it was before the current pass.
    /// * `u` - The column of the pixel.
    /// * `v` - The row of the pixel.
    /// * `pass` - The zero-based pass number.
    /// * `out` - The output pixel, `source.depth()` values.
    fn filter_pixel(
        &self,
        source: &PixelPack,
        u: usize,
        v: usize,
        pass: usize,
        out: &mut [f32],
    ) -> Result<(), FilterError>;
}

/// Number of passes of a separable filter.
pub const SEPARABLE_PASSES: usize = 2;

/// A scalar operation split into a horizontal pass 0 and a vertical pass 1.
///
/// Every implementor is a [`ScalarPixelOp`] that fails with
/// [`FilterError::InvalidPass`] on any other pass. Filters built on it return
/// [`SEPARABLE_PASSES`] from [`Filter::passes_required`].
pub trait ScalarSeparableOp: Sync {
    /// Compute pixel `(u, v)` of the horizontal pass.
    fn filter_x(&self, source: &PlaneView<'_>, u: usize, v: usize) -> Result<f32, FilterError>;

    /// Compute pixel `(u, v)` of the vertical pass.
    fn filter_y(&self, source: &PlaneView<'_>, u: usize, v: usize) -> Result<f32, FilterError>;
}

impl<T: ScalarSeparableOp + ?Sized> ScalarPixelOp for T {
    fn filter_pixel(
        &self,
        source: &PlaneView<'_>,
        u: usize,
        v: usize,
        pass: usize,
    ) -> Result<f32, FilterError> {
        match pass {
            0 => self.filter_x(source, u, v),
            1 => self.filter_y(source, u, v),
            _ => Err(FilterError::InvalidPass(pass, SEPARABLE_PASSES)),
        }
    }
}

/// A vector operation split into a horizontal pass 0 and a vertical pass 1.
///
/// The vector counterpart of [`ScalarSeparableOp`].
pub trait VectorSeparableOp: Sync {
    /// Compute pixel `(u, v)` of the horizontal pass into `out`.
    fn filter_x(
        &self,
        source: &PixelPack,
        u: usize,
        v: usize,
        out: &mut [f32],
    ) -> Result<(), FilterError>;

    /// Compute pixel `(u, v)` of the vertical pass into `out`.
    fn filter_y(
        &self,
        source: &PixelPack,
        u: usize,
        v: usize,
        out: &mut [f32],
    ) -> Result<(), FilterError>;
}

impl<T: VectorSeparableOp + ?Sized> VectorPixelOp for T {
    fn filter_pixel(
        &self,
        source: &PixelPack,
        u: usize,
        v: usize,
        pass: usize,
        out: &mut [f32],
    ) -> Result<(), FilterError> {
        match pass {
            0 => self.filter_x(source, u, v, out),
            1 => self.filter_y(source, u, v, out),
            _ => Err(FilterError::InvalidPass(pass, SEPARABLE_PASSES)),
        }
    }
}

/// The per-pixel operation of a filter, tagged with its dispatch mode.
#[derive(Clone, Copy)]
pub enum PixelOp<'a> {
    /// Applied to each plane separately.
    Scalar(&'a dyn ScalarPixelOp),
    /// Applied to all planes of a pixel at once.
    Vector(&'a dyn VectorPixelOp),
}

/// A multi-pass filter over pixel packs.
///
/// The engine drives every filter through the same sequence: `init_filter` once, then for
/// each pass `init_pass`, the pixel loop over a fresh target pack and the swap of source
/// and target, and finally `close_filter` on the result.
pub trait Filter {
    /// Number of passes the filter needs, at least one.
    fn passes_required(&self) -> usize {
        1
    }

    /// Called once before the first pass.
    fn init_filter(&mut self, _source: &PixelPack) -> Result<(), FilterError> {
        Ok(())
    }

    /// Called before every pass with the pack the pass reads from.
    fn init_pass(&mut self, _source: &PixelPack, _pass: usize) -> Result<(), FilterError> {
        Ok(())
    }

    /// Called once after the last pass with the final pack, before it is written back.
    fn close_filter(&mut self, _result: &PixelPack) -> Result<(), FilterError> {
        Ok(())
    }

    /// The per-pixel operation of the filter.
    fn pixel_op(&self) -> PixelOp<'_>;

    /// Filter a native image in place with the default parameters.
    fn apply_to<I: NativeImage>(&mut self, image: &mut I) -> Result<(), FilterError>
    where
        Self: Sized,
    {
        self.apply_to_with(image, &FilterParams::default())
    }

    /// Filter a native image in place.
    ///
    /// The image is only written once every pass has succeeded.
    fn apply_to_with<I: NativeImage>(
        &mut self,
        image: &mut I,
        params: &FilterParams,
    ) -> Result<(), FilterError>
    where
        Self: Sized,
    {
        FilterEngine::new(*params).apply(self, image)
    }
}

/// Drives filters over pixel packs and reports their progress.
#[derive(Debug, Clone, Default)]
pub struct FilterEngine {
    params: FilterParams,
    progress: Arc<FilterProgress>,
}

impl FilterEngine {
    /// Create a new engine with its own progress counter.
    pub fn new(params: FilterParams) -> Self {
        Self {
            params,
            progress: Arc::new(FilterProgress::new()),
        }
    }

    /// Create a new engine reporting into a shared progress counter.
    pub fn with_progress(params: FilterParams, progress: Arc<FilterProgress>) -> Self {
        Self { params, progress }
    }

    /// The parameters of the engine.
    pub fn params(&self) -> &FilterParams {
        &self.params
    }

    /// The progress counter of the engine.
    pub fn progress(&self) -> &Arc<FilterProgress> {
        &self.progress
    }

    /// Filter a native image in place.
    ///
    /// # Arguments
    ///
    /// * `filter` - The filter to apply.
    /// * `image` - The image to filter, untouched if any pass fails.
    pub fn apply<F, I>(&self, filter: &mut F, image: &mut I) -> Result<(), FilterError>
    where
        F: Filter + ?Sized,
        I: NativeImage,
    {
        let pack = PixelPack::from_image(image, self.params.out_of_bounds)?;
        let result = self.apply_to_pack(filter, pack)?;
        result.write_to(image)
    }

    /// Run every pass of `filter` over `pack` and return the final pack.
    ///
    /// The out-of-bounds strategy of `pack` is used for all reads.
    pub fn apply_to_pack<F>(
        &self,
        filter: &mut F,
        pack: PixelPack,
    ) -> Result<PixelPack, FilterError>
    where
        F: Filter + ?Sized,
    {
        let passes = filter.passes_required();
        if passes == 0 {
            return Err(FilterError::NoPasses);
        }

        let parallel = self.params.execution.is_parallel(pack.size().num_pixels());
        let rows_per_pass = match filter.pixel_op() {
            PixelOp::Scalar(_) => pack.depth() * pack.height(),
            PixelOp::Vector(_) => pack.height(),
        };
        self.progress.reset(passes * rows_per_pass);

        log::debug!(
            "filtering {} pack of depth {} in {} pass(es), parallel: {}",
            pack.size(),
            pack.depth(),
            passes,
            parallel
        );

        filter.init_filter(&pack)?;

        let mut source = pack;
        for pass in 0..passes {
            filter.init_pass(&source, pass)?;

            let target = match filter.pixel_op() {
                PixelOp::Scalar(op) => self.scalar_pass(op, &source, pass, parallel)?,
                PixelOp::Vector(op) => self.vector_pass(op, &source, pass, parallel)?,
            };

            log::debug!("pass {}/{} done, swapping buffers", pass + 1, passes);
            source = target;
        }

        filter.close_filter(&source)?;
        self.progress.finish();
        Ok(source)
    }

    fn scalar_pass(
        &self,
        op: &dyn ScalarPixelOp,
        source: &PixelPack,
        pass: usize,
        parallel: bool,
    ) -> Result<PixelPack, FilterError> {
        let mut target = source.empty_copy();
        let width = source.width();
        let progress = &self.progress;

        for k in 0..source.depth() {
            log::trace!("pass {}: filtering plane {}", pass, k);
            let plane = source.plane(k)?;
            try_for_each_row(
                target.plane_mut(k)?.as_slice_mut(),
                width,
                parallel,
                |v, row| {
                    for (u, out) in row.iter_mut().enumerate() {
                        *out = op.filter_pixel(&plane, u, v, pass)?;
                    }
                    progress.advance(1);
                    Ok(())
                },
            )?;
        }

        Ok(target)
    }

    fn vector_pass(
        &self,
        op: &dyn VectorPixelOp,
        source: &PixelPack,
        pass: usize,
        parallel: bool,
    ) -> Result<PixelPack, FilterError> {
        let depth = source.depth();
        let progress = &self.progress;

        // pixels are computed interleaved and split into planes afterwards
        let mut pixels = vec![0.0f32; source.size().num_pixels() * depth];
        try_for_each_row(
            &mut pixels,
            source.width() * depth,
            parallel,
            |v, row| {
                for (u, out) in row.chunks_exact_mut(depth).enumerate() {
                    op.filter_pixel(source, u, v, pass, out)?;
                }
                progress.advance(1);
                Ok(())
            },
        )?;

        let mut target = source.empty_copy();
        for k in 0..depth {
            target
                .plane_mut(k)?
                .as_slice_mut()
                .iter_mut()
                .zip(pixels.chunks_exact(depth))
                .for_each(|(dst, pixel)| *dst = pixel[k]);
        }

        Ok(target)
    }
}
