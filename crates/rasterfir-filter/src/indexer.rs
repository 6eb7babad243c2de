use crate::error::FilterError;

/// Policy for reading pixel locations outside the image bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OutOfBoundsStrategy {
    /// Out-of-image reads yield zero.
    ///
    /// Example: ...d c b a | 0 0 0 0...
    Zero,

    /// Out-of-image reads take the value of the closest border pixel.
    ///
    /// Example: ...d c b a | a a a a...
    #[default]
    NearestBorder,

    /// Out-of-image reads wrap around periodically, tiling the image in both directions.
    ///
    /// Example: ...c d | a b c d | a b...
    MirrorImage,

    /// Out-of-image reads fail with [`FilterError::OutOfImage`].
    ThrowException,
}

/// Maps 2D pixel coordinates to indices into a row-major sample array.
///
/// The indexer is an immutable value; it can be copied freely and shared between threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelIndexer {
    width: usize,
    height: usize,
    strategy: OutOfBoundsStrategy,
}

impl PixelIndexer {
    /// Create a new indexer for an image of the given dimensions.
    ///
    /// # Errors
    ///
    /// Both dimensions must be non-zero.
    pub fn new(
        width: usize,
        height: usize,
        strategy: OutOfBoundsStrategy,
    ) -> Result<Self, FilterError> {
        if width == 0 || height == 0 {
            return Err(FilterError::InvalidImageSize(width, height));
        }
        Ok(Self {
            width,
            height,
            strategy,
        })
    }

    /// Width of the indexed image.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the indexed image.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The out-of-bounds strategy of this indexer.
    pub fn strategy(&self) -> OutOfBoundsStrategy {
        self.strategy
    }

    #[inline]
    fn contains(&self, x: isize, y: isize) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    fn inside_index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Returns the linear index for the pixel coordinates `(x, y)`.
    ///
    /// - `Ok(Some(i))`: a valid index in `[0, width * height)`.
    /// - `Ok(None)`: the coordinate is outside the image and the default value zero
    ///   must be used instead (only with [`OutOfBoundsStrategy::Zero`]).
    ///
    /// # Errors
    ///
    /// With [`OutOfBoundsStrategy::ThrowException`] any out-of-image coordinate fails.
    #[inline]
    pub fn index(&self, x: isize, y: isize) -> Result<Option<usize>, FilterError> {
        if self.contains(x, y) {
            return Ok(Some(self.inside_index(x as usize, y as usize)));
        }

        match self.strategy {
            OutOfBoundsStrategy::Zero => Ok(None),
            OutOfBoundsStrategy::NearestBorder => {
                let xb = x.clamp(0, self.width as isize - 1) as usize;
                let yb = y.clamp(0, self.height as isize - 1) as usize;
                Ok(Some(self.inside_index(xb, yb)))
            }
            OutOfBoundsStrategy::MirrorImage => {
                let xm = x.rem_euclid(self.width as isize) as usize;
                let ym = y.rem_euclid(self.height as isize) as usize;
                Ok(Some(self.inside_index(xm, ym)))
            }
            OutOfBoundsStrategy::ThrowException => Err(FilterError::OutOfImage(
                x,
                y,
                self.width,
                self.height,
            )),
        }
    }
}
