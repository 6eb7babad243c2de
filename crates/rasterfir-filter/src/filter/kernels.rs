use crate::error::FilterError;

/// Multiple of sigma covered on each side of a Gaussian kernel.
pub const GAUSSIAN_SIZE_FACTOR: f64 = 3.5;

// sigma at or below which Gaussian kernels use this value as their variance
const MIN_GAUSSIAN_SIGMA: f64 = 0.1;

fn normalize(weights: &[f32]) -> Result<Vec<f32>, FilterError> {
    let sum = weights.iter().map(|&w| w as f64).sum::<f64>();
    let scale = 1.0 / sum;
    if !scale.is_finite() || !sum.is_finite() {
        return Err(FilterError::ZeroKernelSum);
    }
    Ok(weights.iter().map(|&w| (w as f64 * scale) as f32).collect())
}

fn gaussian_weights(radius: usize, sigma: f64) -> Vec<f32> {
    let variance = if sigma > MIN_GAUSSIAN_SIGMA {
        sigma * sigma
    } else {
        MIN_GAUSSIAN_SIGMA
    };
    (0..2 * radius + 1)
        .map(|i| {
            let x = i as f64 - radius as f64;
            (-(x * x) / (2.0 * variance)).exp() as f32
        })
        .collect()
}

fn gaussian_radius(sigma: f64) -> Result<usize, FilterError> {
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(FilterError::InvalidParameter("sigma", sigma));
    }
    Ok((GAUSSIAN_SIZE_FACTOR * sigma).ceil() as usize)
}

/// An immutable one-dimensional filter kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel1D {
    weights: Vec<f32>,
    xc: usize,
    normalized: bool,
}

impl Kernel1D {
    /// Create a normalized kernel with its hot spot at the center.
    ///
    /// # Arguments
    ///
    /// * `weights` - The kernel weights.
    ///
    /// # Errors
    ///
    /// Fails if the weights are empty or their sum is zero or not finite.
    pub fn new(weights: &[f32]) -> Result<Self, FilterError> {
        let xc = weights.len().saturating_sub(1) / 2;
        Self::with_hot_spot(weights, xc, true)
    }

    /// Create a kernel with an explicit hot spot.
    ///
    /// # Arguments
    ///
    /// * `weights` - The kernel weights.
    /// * `xc` - The hot spot position, must lie inside the kernel.
    /// * `normalize` - Scale the weights so that they sum to one.
    pub fn with_hot_spot(weights: &[f32], xc: usize, normalize: bool) -> Result<Self, FilterError> {
        if weights.is_empty() {
            return Err(FilterError::EmptyKernel);
        }
        if xc >= weights.len() {
            return Err(FilterError::InvalidHotSpot(xc, 0, weights.len(), 1));
        }
        let weights = if normalize {
            self::normalize(weights)?
        } else {
            weights.to_vec()
        };
        Ok(Self {
            weights,
            xc,
            normalized: normalize,
        })
    }

    /// Create a box blur kernel with `kernel_size` equal weights.
    pub fn box_blur(kernel_size: usize) -> Result<Self, FilterError> {
        Self::new(&vec![1.0; kernel_size])
    }

    /// Create a Gaussian kernel wide enough to avoid truncation effects.
    ///
    /// The kernel has `2 * ceil(3.5 * sigma) + 1` weights.
    pub fn gaussian(sigma: f64) -> Result<Self, FilterError> {
        let radius = gaussian_radius(sigma)?;
        Self::new(&gaussian_weights(radius, sigma))
    }

    /// Create a Gaussian kernel with an explicit size.
    ///
    /// # Arguments
    ///
    /// * `kernel_size` - The number of weights.
    /// * `sigma` - The standard deviation of the Gaussian.
    pub fn gaussian_with_size(kernel_size: usize, sigma: f32) -> Result<Self, FilterError> {
        if kernel_size == 0 {
            return Err(FilterError::EmptyKernel);
        }
        let mean = (kernel_size - 1) as f32 / 2.0;
        let sigma_sq = sigma * sigma;

        let weights = (0..kernel_size)
            .map(|i| {
                let x = i as f32 - mean;
                (-(x * x) / (2.0 * sigma_sq)).exp()
            })
            .collect::<Vec<_>>();

        Self::new(&weights)
    }

    /// The kernel weights.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Number of weights.
    pub fn width(&self) -> usize {
        self.weights.len()
    }

    /// The hot spot position.
    pub fn xc(&self) -> usize {
        self.xc
    }

    /// Whether the weights were normalized on construction.
    pub fn is_normalized(&self) -> bool {
        self.normalized
    }
}

/// An immutable two-dimensional filter kernel.
///
/// Weights are stored row-major, `H[j][i]` with the row index `j` first.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel2D {
    weights: Vec<f32>,
    width: usize,
    height: usize,
    xc: usize,
    yc: usize,
    normalized: bool,
}

impl Kernel2D {
    /// Create a normalized kernel with its hot spot at the center.
    ///
    /// # Arguments
    ///
    /// * `rows` - The kernel rows, all of the same length.
    ///
    /// # Examples
    ///
    /// ```
    /// use rasterfir_filter::filter::kernels::Kernel2D;
    ///
    /// let kernel = Kernel2D::new(&[[1.0, 2.0, 1.0], [2.0, 4.0, 2.0], [1.0, 2.0, 1.0]]).unwrap();
    /// assert_eq!(kernel.weight(1, 1), 0.25);
    /// assert_eq!((kernel.xc(), kernel.yc()), (1, 1));
    /// ```
    pub fn new<R: AsRef<[f32]>>(rows: &[R]) -> Result<Self, FilterError> {
        let height = rows.len();
        let width = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        Self::with_hot_spot(
            rows,
            width.saturating_sub(1) / 2,
            height.saturating_sub(1) / 2,
            true,
        )
    }

    /// Create a kernel with an explicit hot spot.
    ///
    /// # Arguments
    ///
    /// * `rows` - The kernel rows, all of the same length.
    /// * `xc` - Column of the hot spot.
    /// * `yc` - Row of the hot spot.
    /// * `normalize` - Scale the weights so that they sum to one.
    pub fn with_hot_spot<R: AsRef<[f32]>>(
        rows: &[R],
        xc: usize,
        yc: usize,
        normalize: bool,
    ) -> Result<Self, FilterError> {
        let height = rows.len();
        let width = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        if width == 0 {
            return Err(FilterError::EmptyKernel);
        }

        let mut weights = Vec::with_capacity(width * height);
        for (j, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != width {
                return Err(FilterError::NonRectangularKernel(j, row.len(), width));
            }
            weights.extend_from_slice(row);
        }

        Self::from_parts(weights, width, height, xc, yc, normalize)
    }

    fn from_parts(
        weights: Vec<f32>,
        width: usize,
        height: usize,
        xc: usize,
        yc: usize,
        normalize: bool,
    ) -> Result<Self, FilterError> {
        if xc >= width || yc >= height {
            return Err(FilterError::InvalidHotSpot(xc, yc, width, height));
        }
        let weights = if normalize {
            self::normalize(&weights)?
        } else {
            weights
        };
        Ok(Self {
            weights,
            width,
            height,
            xc,
            yc,
            normalized: normalize,
        })
    }

    /// Create the 2D kernel equivalent to applying `kernel_x` horizontally and
    /// `kernel_y` vertically.
    ///
    /// The result is `H[j][i] = kernel_x[i] * kernel_y[j]` with the hot spot taken from the
    /// two 1D kernels.
    pub fn from_separable(
        kernel_x: &Kernel1D,
        kernel_y: &Kernel1D,
        normalize: bool,
    ) -> Result<Self, FilterError> {
        let weights = kernel_y
            .weights()
            .iter()
            .flat_map(|&wy| kernel_x.weights().iter().map(move |&wx| wx * wy))
            .collect();
        Self::from_parts(
            weights,
            kernel_x.width(),
            kernel_y.width(),
            kernel_x.xc(),
            kernel_y.xc(),
            normalize,
        )
    }

    /// Create a Gaussian kernel wide enough to avoid truncation effects.
    ///
    /// The kernel has `2 * ceil(3.5 * sigma) + 1` columns and rows respectively.
    pub fn gaussian(sigma_x: f64, sigma_y: f64) -> Result<Self, FilterError> {
        let wx = gaussian_weights(gaussian_radius(sigma_x)?, sigma_x);
        let wy = gaussian_weights(gaussian_radius(sigma_y)?, sigma_y);
        let weights = wy
            .iter()
            .flat_map(|&gy| wx.iter().map(move |&gx| gx * gy))
            .collect();
        Self::from_parts(
            weights,
            wx.len(),
            wy.len(),
            wx.len() / 2,
            wy.len() / 2,
            true,
        )
    }

    /// All weights, row-major.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// The weights of row `j`.
    pub fn row(&self, j: usize) -> &[f32] {
        &self.weights[j * self.width..(j + 1) * self.width]
    }

    /// The weight at column `i` and row `j`.
    pub fn weight(&self, i: usize, j: usize) -> f32 {
        self.weights[j * self.width + i]
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Column of the hot spot.
    pub fn xc(&self) -> usize {
        self.xc
    }

    /// Row of the hot spot.
    pub fn yc(&self) -> usize {
        self.yc
    }

    /// Whether the weights were normalized on construction.
    pub fn is_normalized(&self) -> bool {
        self.normalized
    }
}
