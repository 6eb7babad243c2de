use rasterfir_image::{
    packed::{pack_rgb, unpack_rgb},
    Image, ImageError, ImageSize, IndexedImage, PackedRgbImage, SampleType,
};

use crate::{
    error::FilterError,
    indexer::{OutOfBoundsStrategy, PixelIndexer},
};

/// A single-channel grid of `f32` samples, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    samples: Vec<f32>,
}

impl Plane {
    fn zeros(len: usize) -> Self {
        Self {
            samples: vec![0.0; len],
        }
    }

    /// The samples of the plane.
    pub fn as_slice(&self) -> &[f32] {
        &self.samples
    }

    /// The samples of the plane, mutably.
    pub fn as_slice_mut(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    /// Number of samples in the plane.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the plane holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// A read-only view of one plane that resolves coordinates through the pack indexer.
#[derive(Debug, Clone, Copy)]
pub struct PlaneView<'a> {
    samples: &'a [f32],
    indexer: &'a PixelIndexer,
}

impl<'a> PlaneView<'a> {
    /// Width of the plane.
    pub fn width(&self) -> usize {
        self.indexer.width()
    }

    /// Height of the plane.
    pub fn height(&self) -> usize {
        self.indexer.height()
    }

    /// The raw samples of the plane.
    pub fn as_slice(&self) -> &'a [f32] {
        self.samples
    }

    /// Read the sample at `(x, y)`, applying the out-of-bounds strategy.
    ///
    /// Coordinates outside the image read as zero under [`OutOfBoundsStrategy::Zero`].
    #[inline]
    pub fn get_value(&self, x: isize, y: isize) -> Result<f32, FilterError> {
        Ok(match self.indexer.index(x, y)? {
            Some(i) => self.samples[i],
            None => 0.0,
        })
    }
}

/// A channel-agnostic stack of equally sized `f32` planes.
///
/// All planes share one [`PixelIndexer`], so every read of the pack follows the same
/// out-of-bounds strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelPack {
    planes: Vec<Plane>,
    indexer: PixelIndexer,
}

impl PixelPack {
    /// Create a zero-initialized pack.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of every plane.
    /// * `depth` - The number of planes.
    /// * `strategy` - The out-of-bounds strategy used for reads.
    pub fn new(
        size: ImageSize,
        depth: usize,
        strategy: OutOfBoundsStrategy,
    ) -> Result<Self, FilterError> {
        if depth == 0 {
            return Err(FilterError::InvalidDepth);
        }
        let indexer = PixelIndexer::new(size.width, size.height, strategy)?;
        let planes = (0..depth)
            .map(|_| Plane::zeros(size.num_pixels()))
            .collect();
        Ok(Self { planes, indexer })
    }

    /// Create a pack holding one plane per channel of a native image.
    ///
    /// # Arguments
    ///
    /// * `image` - The source image.
    /// * `strategy` - The out-of-bounds strategy used for reads.
    pub fn from_image<I: NativeImage>(
        image: &I,
        strategy: OutOfBoundsStrategy,
    ) -> Result<Self, FilterError> {
        let mut pack = Self::new(image.size(), image.num_planes(), strategy)?;
        image.load_planes(&mut pack.planes);
        Ok(pack)
    }

    /// Create a zero-filled pack with the same shape and strategy.
    pub fn empty_copy(&self) -> Self {
        Self {
            planes: vec![Plane::zeros(self.indexer.width() * self.indexer.height()); self.depth()],
            indexer: self.indexer,
        }
    }

    /// Width of every plane.
    pub fn width(&self) -> usize {
        self.indexer.width()
    }

    /// Height of every plane.
    pub fn height(&self) -> usize {
        self.indexer.height()
    }

    /// Size of every plane.
    pub fn size(&self) -> ImageSize {
        ImageSize {
            width: self.width(),
            height: self.height(),
        }
    }

    /// Number of planes.
    pub fn depth(&self) -> usize {
        self.planes.len()
    }

    /// The shared indexer.
    pub fn indexer(&self) -> &PixelIndexer {
        &self.indexer
    }

    /// The out-of-bounds strategy of the pack.
    pub fn out_of_bounds_strategy(&self) -> OutOfBoundsStrategy {
        self.indexer.strategy()
    }

    /// All planes of the pack.
    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    /// Get a read-only view of plane `k`.
    pub fn plane(&self, k: usize) -> Result<PlaneView<'_>, FilterError> {
        let plane = self
            .planes
            .get(k)
            .ok_or(FilterError::PlaneIndexOutOfBounds(k, self.depth()))?;
        Ok(PlaneView {
            samples: &plane.samples,
            indexer: &self.indexer,
        })
    }

    /// Get mutable access to plane `k`.
    pub fn plane_mut(&mut self, k: usize) -> Result<&mut Plane, FilterError> {
        let depth = self.depth();
        self.planes
            .get_mut(k)
            .ok_or(FilterError::PlaneIndexOutOfBounds(k, depth))
    }

    /// Read the sample of plane `k` at `(x, y)`, applying the out-of-bounds strategy.
    pub fn get_value(&self, k: usize, x: isize, y: isize) -> Result<f32, FilterError> {
        self.plane(k)?.get_value(x, y)
    }

    /// Write the sample of plane `k` at the in-image coordinate `(x, y)`.
    pub fn set_value(&mut self, k: usize, x: usize, y: usize, val: f32) -> Result<(), FilterError> {
        let idx = self.checked_index(x, y)?;
        self.plane_mut(k)?.samples[idx] = val;
        Ok(())
    }

    /// Read all planes at `(x, y)` into `vals`, applying the out-of-bounds strategy.
    pub fn get_pixel_into(&self, x: isize, y: isize, vals: &mut [f32]) -> Result<(), FilterError> {
        if vals.len() != self.depth() {
            return Err(FilterError::InvalidPixelLength(vals.len(), self.depth()));
        }
        match self.indexer.index(x, y)? {
            Some(i) => vals
                .iter_mut()
                .zip(self.planes.iter())
                .for_each(|(v, plane)| *v = plane.samples[i]),
            None => vals.fill(0.0),
        }
        Ok(())
    }

    /// Read all planes at `(x, y)`, applying the out-of-bounds strategy.
    pub fn get_pixel(&self, x: isize, y: isize) -> Result<Vec<f32>, FilterError> {
        let mut vals = vec![0.0; self.depth()];
        self.get_pixel_into(x, y, &mut vals)?;
        Ok(vals)
    }

    /// Write one value per plane at the in-image coordinate `(x, y)`.
    pub fn set_pixel(&mut self, x: usize, y: usize, vals: &[f32]) -> Result<(), FilterError> {
        if vals.len() != self.depth() {
            return Err(FilterError::InvalidPixelLength(vals.len(), self.depth()));
        }
        let idx = self.checked_index(x, y)?;
        self.planes
            .iter_mut()
            .zip(vals.iter())
            .for_each(|(plane, &v)| plane.samples[idx] = v);
        Ok(())
    }

    /// Reset every sample to zero.
    pub fn zero(&mut self) {
        self.planes.iter_mut().for_each(|p| p.samples.fill(0.0));
    }

    /// Write the pack contents into an existing native image of matching shape.
    ///
    /// Integer targets are rounded to the nearest value and saturated, float targets are
    /// copied exactly.
    pub fn write_to<I: NativeImage>(&self, image: &mut I) -> Result<(), FilterError> {
        let size = image.size();
        if size != self.size() || image.num_planes() != self.depth() {
            return Err(FilterError::ShapeMismatch(
                self.depth(),
                self.width(),
                self.height(),
                image.num_planes(),
                size.width,
                size.height,
            ));
        }
        image.store_planes(&self.planes);
        Ok(())
    }

    /// Create a new native image from the pack contents.
    pub fn to_image<I: NativeImage>(&self) -> Result<I, FilterError> {
        let mut image = I::blank(self.size())?;
        self.write_to(&mut image)?;
        Ok(image)
    }

    fn checked_index(&self, x: usize, y: usize) -> Result<usize, FilterError> {
        if x >= self.width() || y >= self.height() {
            return Err(FilterError::OutOfImage(
                x as isize,
                y as isize,
                self.width(),
                self.height(),
            ));
        }
        Ok(y * self.width() + x)
    }
}

/// A native raster encoding that can be decomposed into, and rebuilt from, `f32` planes.
///
/// Implementors guarantee that storing the planes produced by `load_planes` reproduces
/// the original pixels exactly.
pub trait NativeImage {
    /// Size of the image in pixels.
    fn size(&self) -> ImageSize;

    /// Number of planes the image decomposes into.
    fn num_planes(&self) -> usize;

    /// Widen the image samples into `planes`, one plane per channel.
    ///
    /// `planes` has `num_planes()` entries of `width * height` samples each.
    fn load_planes(&self, planes: &mut [Plane]);

    /// Narrow `planes` back into the image samples.
    fn store_planes(&mut self, planes: &[Plane]);

    /// Create an image of the given size with default content.
    fn blank(size: ImageSize) -> Result<Self, ImageError>
    where
        Self: Sized;
}

impl<T: SampleType, const C: usize> NativeImage for Image<T, C> {
    fn size(&self) -> ImageSize {
        Image::size(self)
    }

    fn num_planes(&self) -> usize {
        C
    }

    fn load_planes(&self, planes: &mut [Plane]) {
        for (i, pixel) in self.as_slice().chunks_exact(C).enumerate() {
            for (plane, &sample) in planes.iter_mut().zip(pixel.iter()) {
                plane.samples[i] = sample.to_f32();
            }
        }
    }

    fn store_planes(&mut self, planes: &[Plane]) {
        for (i, pixel) in self.as_slice_mut().chunks_exact_mut(C).enumerate() {
            for (sample, plane) in pixel.iter_mut().zip(planes.iter()) {
                *sample = T::from_f32(plane.samples[i]);
            }
        }
    }

    fn blank(size: ImageSize) -> Result<Self, ImageError> {
        Image::from_size_val(size, T::default())
    }
}

impl NativeImage for PackedRgbImage {
    fn size(&self) -> ImageSize {
        PackedRgbImage::size(self)
    }

    fn num_planes(&self) -> usize {
        3
    }

    fn load_planes(&self, planes: &mut [Plane]) {
        for (i, &pixel) in self.as_slice().iter().enumerate() {
            let rgb = unpack_rgb(pixel);
            for (plane, &c) in planes.iter_mut().zip(rgb.iter()) {
                plane.samples[i] = c as f32;
            }
        }
    }

    fn store_planes(&mut self, planes: &[Plane]) {
        for (i, pixel) in self.as_slice_mut().iter_mut().enumerate() {
            let r = u8::from_f32(planes[0].samples[i]);
            let g = u8::from_f32(planes[1].samples[i]);
            let b = u8::from_f32(planes[2].samples[i]);
            *pixel = (*pixel & 0xff00_0000) | (pack_rgb(r, g, b) & 0x00ff_ffff);
        }
    }

    fn blank(size: ImageSize) -> Result<Self, ImageError> {
        PackedRgbImage::from_size_rgb(size, [0, 0, 0])
    }
}

impl NativeImage for IndexedImage {
    fn size(&self) -> ImageSize {
        IndexedImage::size(self)
    }

    fn num_planes(&self) -> usize {
        1
    }

    fn load_planes(&self, planes: &mut [Plane]) {
        for (dst, &idx) in planes[0].samples.iter_mut().zip(self.indices().iter()) {
            *dst = idx as f32;
        }
    }

    fn store_planes(&mut self, planes: &[Plane]) {
        for (idx, &src) in self.indices_mut().iter_mut().zip(planes[0].samples.iter()) {
            *idx = u8::from_f32(src);
        }
    }

    fn blank(size: ImageSize) -> Result<Self, ImageError> {
        IndexedImage::with_gray_palette(size)
    }
}
