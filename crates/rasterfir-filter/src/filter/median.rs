use crate::{
    engine::{Filter, PixelOp, ScalarPixelOp, VectorPixelOp},
    error::FilterError,
    pack::{PixelPack, PlaneView},
};

/// A disc-shaped support region, stored as offsets from its center.
///
/// A cell `(dx, dy)` with `|dx|, |dy| <= floor(r)` belongs to the mask if
/// `dx^2 + dy^2 <= r^2 + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterMask {
    radius: f64,
    center: usize,
    offsets: Vec<(isize, isize)>,
}

impl FilterMask {
    /// Create a new disc mask.
    ///
    /// # Errors
    ///
    /// The radius must be finite and non-negative.
    pub fn new(radius: f64) -> Result<Self, FilterError> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(FilterError::InvalidParameter("radius", radius));
        }

        let rc = radius.floor() as isize;
        let r2 = radius * radius + 1.0;

        let mut offsets = Vec::new();
        for dy in -rc..=rc {
            for dx in -rc..=rc {
                if ((dx * dx + dy * dy) as f64) <= r2 {
                    offsets.push((dx, dy));
                }
            }
        }

        Ok(Self {
            radius,
            center: rc as usize,
            offsets,
        })
    }

    /// The radius of the disc.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// The position of the center in the enclosing square.
    pub fn center(&self) -> usize {
        self.center
    }

    /// Side length of the enclosing square.
    pub fn size(&self) -> usize {
        2 * self.center + 1
    }

    /// Number of cells in the mask.
    pub fn count(&self) -> usize {
        self.offsets.len()
    }

    /// The cell offsets from the center, row by row.
    pub fn offsets(&self) -> &[(isize, isize)] {
        &self.offsets
    }

    /// Whether the offset `(dx, dy)` belongs to the mask.
    pub fn contains(&self, dx: isize, dy: isize) -> bool {
        self.offsets.contains(&(dx, dy))
    }
}

/// Distance between two color vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DistanceNorm {
    /// Sum of absolute differences.
    #[default]
    L1,
    /// Euclidean distance.
    L2,
    /// Largest absolute difference.
    LInf,
}

impl DistanceNorm {
    /// The distance between `a` and `b`.
    pub fn distance(&self, a: &[f32], b: &[f32]) -> f64 {
        let diffs = a.iter().zip(b).map(|(&x, &y)| (x as f64 - y as f64).abs());
        match self {
            DistanceNorm::L1 => diffs.sum(),
            DistanceNorm::L2 => diffs.map(|d| d * d).sum::<f64>().sqrt(),
            DistanceNorm::LInf => diffs.fold(0.0, f64::max),
        }
    }
}

/// Median filter applied to every plane separately.
#[derive(Debug, Clone)]
pub struct ScalarMedianFilter {
    mask: FilterMask,
}

impl ScalarMedianFilter {
    /// Create a new filter with a disc mask of the given radius.
    pub fn new(radius: f64) -> Result<Self, FilterError> {
        Ok(Self {
            mask: FilterMask::new(radius)?,
        })
    }

    /// The support region of the filter.
    pub fn mask(&self) -> &FilterMask {
        &self.mask
    }
}

impl ScalarPixelOp for ScalarMedianFilter {
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

        let mut values = self
            .mask
            .offsets()
            .iter()
            .map(|&(dx, dy)| source.get_value(u as isize + dx, v as isize + dy))
            .collect::<Result<Vec<_>, _>>()?;

        let mid = values.len() / 2;
        let (_, median, _) = values.select_nth_unstable_by(mid, f32::total_cmp);
        Ok(*median)
    }
}

impl Filter for ScalarMedianFilter {
    fn pixel_op(&self) -> PixelOp<'_> {
        PixelOp::Scalar(self)
    }
}

// the pixels covered by the mask at (u, v), one row of `depth` values each
fn support_region(
    source: &PixelPack,
    mask: &FilterMask,
    u: usize,
    v: usize,
) -> Result<Vec<f32>, FilterError> {
    let depth = source.depth();
    let mut region = vec![0.0; mask.count() * depth];
    for (&(dx, dy), pixel) in mask.offsets().iter().zip(region.chunks_exact_mut(depth)) {
        source.get_pixel_into(u as isize + dx, v as isize + dy, pixel)?;
    }
    Ok(region)
}

/// Vector median filter for multi-plane images.
///
/// Every pixel is replaced by the color of its neighborhood with the smallest summed
/// distance to all other neighborhood colors, unless the original color already has the
/// smallest sum.
#[derive(Debug, Clone)]
pub struct VectorMedianFilter {
    mask: FilterMask,
    norm: DistanceNorm,
}

impl VectorMedianFilter {
    /// Create a new filter using the L1 distance.
    pub fn new(radius: f64) -> Result<Self, FilterError> {
        Self::with_norm(radius, DistanceNorm::L1)
    }

    /// Create a new filter using the given distance norm.
    pub fn with_norm(radius: f64, norm: DistanceNorm) -> Result<Self, FilterError> {
        Ok(Self {
            mask: FilterMask::new(radius)?,
            norm,
        })
    }

    /// The support region of the filter.
    pub fn mask(&self) -> &FilterMask {
        &self.mask
    }

    /// The distance norm of the filter.
    pub fn norm(&self) -> DistanceNorm {
        self.norm
    }

    fn aggregate_distance(&self, p: &[f32], region: &[f32], depth: usize) -> f64 {
        region
            .chunks_exact(depth)
            .map(|q| self.norm.distance(p, q))
            .sum()
    }
}

impl VectorPixelOp for VectorMedianFilter {
    fn filter_pixel(
        &self,
        source: &PixelPack,
        u: usize,
        v: usize,
        pass: usize,
        out: &mut [f32],
    ) -> Result<(), FilterError> {
        if pass != 0 {
            return Err(FilterError::InvalidPass(pass, 1));
        }

        let depth = source.depth();
        source.get_pixel_into(u as isize, v as isize, out)?;
        let region = support_region(source, &self.mask, u, v)?;

        let d_ctr = self.aggregate_distance(out, &region, depth);
        let mut d_min = f64::MAX;
        let mut j_min = 0;
        for (j, p) in region.chunks_exact(depth).enumerate() {
            let d = self.aggregate_distance(p, &region, depth);
            if d < d_min {
                d_min = d;
                j_min = j;
            }
        }

        if d_min < d_ctr {
            out.copy_from_slice(&region[j_min * depth..(j_min + 1) * depth]);
        }
        Ok(())
    }
}

impl Filter for VectorMedianFilter {
    fn pixel_op(&self) -> PixelOp<'_> {
        PixelOp::Vector(self)
    }
}

/// Sharpening vector median filter.
///
/// Like [`VectorMedianFilter`], but the aggregate distance of a color only sums its `a - 1`
/// smallest distances, with `a` between the mask size (no sharpening) and 2 (maximal
/// sharpening). The center is replaced only if it loses by more than `threshold * a`.
#[derive(Debug, Clone)]
pub struct VectorMedianFilterSharpen {
    mask: FilterMask,
    norm: DistanceNorm,
    rank: usize,
    threshold: f64,
}

impl VectorMedianFilterSharpen {
    /// Create a new filter.
    ///
    /// # Arguments
    ///
    /// * `radius` - The radius of the disc mask.
    /// * `sharpen` - The sharpening factor in `[0, 1]`.
    /// * `threshold` - Minimum distance gain per neighbor for replacing the center.
    /// * `norm` - The distance norm.
    pub fn new(
        radius: f64,
        sharpen: f64,
        threshold: f64,
        norm: DistanceNorm,
    ) -> Result<Self, FilterError> {
        if !(0.0..=1.0).contains(&sharpen) {
            return Err(FilterError::InvalidParameter("sharpen", sharpen));
        }
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(FilterError::InvalidParameter("threshold", threshold));
        }

        let mask = FilterMask::new(radius)?;
        let n = mask.count() as f64;
        let rank = (n - sharpen * (n - 2.0) + 0.5).floor().max(1.0) as usize;

        Ok(Self {
            mask,
            norm,
            rank,
            threshold,
        })
    }

    /// The support region of the filter.
    pub fn mask(&self) -> &FilterMask {
        &self.mask
    }

    /// The number of neighbors, including the color itself, in the trimmed distance.
    pub fn rank(&self) -> usize {
        self.rank
    }

    fn trimmed_aggregate_distance(
        &self,
        p: &[f32],
        region: &[f32],
        depth: usize,
        distances: &mut Vec<f64>,
    ) -> f64 {
        if self.rank <= 1 {
            return 0.0;
        }
        distances.clear();
        distances.extend(region.chunks_exact(depth).map(|q| self.norm.distance(p, q)));
        // the smallest entry is the distance of the color to itself
        distances.sort_unstable_by(f64::total_cmp);
        distances.iter().take(self.rank).skip(1).sum()
    }
}

impl VectorPixelOp for VectorMedianFilterSharpen {
    fn filter_pixel(
        &self,
        source: &PixelPack,
        u: usize,
        v: usize,
        pass: usize,
        out: &mut [f32],
    ) -> Result<(), FilterError> {
        if pass != 0 {
            return Err(FilterError::InvalidPass(pass, 1));
        }

        let depth = source.depth();
        source.get_pixel_into(u as isize, v as isize, out)?;
        let region = support_region(source, &self.mask, u, v)?;
        let mut distances = Vec::with_capacity(self.mask.count());

        let d_ctr = self.trimmed_aggregate_distance(out, &region, depth, &mut distances);
        let mut d_min = f64::MAX;
        let mut j_min = 0;
        for (j, p) in region.chunks_exact(depth).enumerate() {
            let d = self.trimmed_aggregate_distance(p, &region, depth, &mut distances);
            if d < d_min {
                d_min = d;
                j_min = j;
            }
        }

        if d_ctr - d_min > self.threshold * self.rank as f64 {
            out.copy_from_slice(&region[j_min * depth..(j_min + 1) * depth]);
        }
        Ok(())
    }
}

impl Filter for VectorMedianFilterSharpen {
    fn pixel_op(&self) -> PixelOp<'_> {
        PixelOp::Vector(self)
    }
}
