use crate::{error::ImageError, image::ImageSize};

/// Pack three 8-bit components into an opaque `0xAARRGGBB` word.
#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    0xff00_0000 | (r as u32) << 16 | (g as u32) << 8 | b as u32
}

/// Unpack the red, green and blue components of a `0xAARRGGBB` word.
#[inline]
pub fn unpack_rgb(pixel: u32) -> [u8; 3] {
    [(pixel >> 16) as u8, (pixel >> 8) as u8, pixel as u8]
}

/// A color image storing one packed `0xAARRGGBB` word per pixel.
///
/// The alpha byte is carried along but never interpreted.
#[derive(Clone, Debug, PartialEq)]
pub struct PackedRgbImage {
    size: ImageSize,
    data: Vec<u32>,
}

impl PackedRgbImage {
    /// Create a new packed image from one word per pixel.
    ///
    /// # Errors
    ///
    /// If the length of the pixel data does not match the image size, an error is returned.
    pub fn new(size: ImageSize, data: Vec<u32>) -> Result<Self, ImageError> {
        if data.len() != size.num_pixels() {
            return Err(ImageError::InvalidChannelShape(
                data.len(),
                size.num_pixels(),
            ));
        }
        Ok(Self { size, data })
    }

    /// Create a new packed image filled with a single color.
    pub fn from_size_rgb(size: ImageSize, rgb: [u8; 3]) -> Result<Self, ImageError> {
        Self::new(
            size,
            vec![pack_rgb(rgb[0], rgb[1], rgb[2]); size.num_pixels()],
        )
    }

    /// Get the size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Get the width of the image in pixels.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Get the height of the image in pixels.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Get the packed words as a slice.
    pub fn as_slice(&self) -> &[u32] {
        &self.data
    }

    /// Get the packed words as a mutable slice.
    pub fn as_slice_mut(&mut self) -> &mut [u32] {
        &mut self.data
    }

    /// Get the color components at the given coordinates.
    pub fn get_rgb(&self, x: usize, y: usize) -> Result<[u8; 3], ImageError> {
        if x >= self.width() || y >= self.height() {
            return Err(ImageError::PixelIndexOutOfBounds(
                x,
                y,
                self.width(),
                self.height(),
            ));
        }
        Ok(unpack_rgb(self.data[y * self.width() + x]))
    }

    /// Set the color components at the given coordinates, keeping the alpha byte.
    pub fn set_rgb(&mut self, x: usize, y: usize, rgb: [u8; 3]) -> Result<(), ImageError> {
        if x >= self.width() || y >= self.height() {
            return Err(ImageError::PixelIndexOutOfBounds(
                x,
                y,
                self.width(),
                self.height(),
            ));
        }
        let idx = y * self.width() + x;
        let alpha = self.data[idx] & 0xff00_0000;
        self.data[idx] = alpha | (pack_rgb(rgb[0], rgb[1], rgb[2]) & 0x00ff_ffff);
        Ok(())
    }
}

/// An image of 8-bit palette indices together with its color table.
///
/// Filters operate on the raw index values, not on the colors they refer to.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexedImage {
    size: ImageSize,
    indices: Vec<u8>,
    palette: Vec<[u8; 3]>,
}

impl IndexedImage {
    /// Create a new indexed image.
    ///
    /// # Errors
    ///
    /// Fails if the index data does not match the image size or the palette is empty.
    pub fn new(
        size: ImageSize,
        indices: Vec<u8>,
        palette: Vec<[u8; 3]>,
    ) -> Result<Self, ImageError> {
        if indices.len() != size.num_pixels() {
            return Err(ImageError::InvalidChannelShape(
                indices.len(),
                size.num_pixels(),
            ));
        }
        if palette.is_empty() {
            return Err(ImageError::EmptyPalette);
        }
        Ok(Self {
            size,
            indices,
            palette,
        })
    }

    /// Create an all-zero indexed image using a 256 entry gray ramp as palette.
    pub fn with_gray_palette(size: ImageSize) -> Result<Self, ImageError> {
        let palette = (0..=255u8).map(|i| [i, i, i]).collect();
        Self::new(size, vec![0; size.num_pixels()], palette)
    }

    /// Get the size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Get the palette indices as a slice.
    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    /// Get the palette indices as a mutable slice.
    pub fn indices_mut(&mut self) -> &mut [u8] {
        &mut self.indices
    }

    /// Get the color table.
    pub fn palette(&self) -> &[[u8; 3]] {
        &self.palette
    }

    /// Look up the color at the given coordinates.
    ///
    /// Returns `None` for out-of-image coordinates or indices beyond the palette.
    pub fn color(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let idx = self.indices[y * self.size.width + x] as usize;
        self.palette.get(idx).copied()
    }
}
