use rayon::prelude::*;

use crate::error::FilterError;

/// Number of pixels from which [`ExecutionStrategy::Auto`] switches to the parallel path.
pub const AUTO_PARALLEL_THRESHOLD: usize = 100_000;

/// Controls how the pixel loop of a filter pass is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecutionStrategy {
    /// Run sequentially on the current thread.
    ///
    /// Useful for small images, debugging, or when the overhead of parallelization
    /// outweighs the benefits.
    Serial,

    /// Use the global Rayon thread pool to process rows in parallel.
    Parallel,

    /// Pick [`ExecutionStrategy::Parallel`] for images of at least
    /// [`AUTO_PARALLEL_THRESHOLD`] pixels and [`ExecutionStrategy::Serial`] otherwise.
    #[default]
    Auto,
}

impl ExecutionStrategy {
    /// Whether an image with `num_pixels` pixels is processed in parallel.
    pub fn is_parallel(&self, num_pixels: usize) -> bool {
        match self {
            ExecutionStrategy::Serial => false,
            ExecutionStrategy::Parallel => true,
            ExecutionStrategy::Auto => num_pixels >= AUTO_PARALLEL_THRESHOLD,
        }
    }
}

/// Apply a fallible function to every row of a row-major buffer.
///
/// The closure receives the row index and the mutable row slice. The first error stops
/// the iteration and is returned.
///
/// # Arguments
///
/// * `dst` - The buffer to fill, `row_len` elements per row.
/// * `row_len` - The number of elements in a row, must be non-zero.
/// * `parallel` - Distribute the rows over the Rayon thread pool.
/// * `f` - The row function.
pub(crate) fn try_for_each_row<T, F>(
    dst: &mut [T],
    row_len: usize,
    parallel: bool,
    f: F,
) -> Result<(), FilterError>
where
    T: Send,
    F: Fn(usize, &mut [T]) -> Result<(), FilterError> + Send + Sync,
{
    if parallel {
        dst.par_chunks_mut(row_len)
            .enumerate()
            .try_for_each(|(v, row)| f(v, row))
    } else {
        dst.chunks_mut(row_len)
            .enumerate()
            .try_for_each(|(v, row)| f(v, row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_strategy_selection() {
        assert_eq!(ExecutionStrategy::default(), ExecutionStrategy::Auto);
        assert!(!ExecutionStrategy::Serial.is_parallel(10_000_000));
        assert!(ExecutionStrategy::Parallel.is_parallel(1));
        assert!(!ExecutionStrategy::Auto.is_parallel(AUTO_PARALLEL_THRESHOLD - 1));
        assert!(ExecutionStrategy::Auto.is_parallel(AUTO_PARALLEL_THRESHOLD));
    }

    #[test]
    fn test_rows_serial_and_parallel() -> Result<(), FilterError> {
        for parallel in [false, true] {
            let mut buf = vec![0usize; 4 * 3];
            try_for_each_row(&mut buf, 4, parallel, |v, row| {
                row.iter_mut().enumerate().for_each(|(u, x)| *x = v * 10 + u);
                Ok(())
            })?;
            #[rustfmt::skip]
            assert_eq!(buf, vec![
                0, 1, 2, 3,
                10, 11, 12, 13,
                20, 21, 22, 23,
            ]);
        }
        Ok(())
    }

    #[test]
    fn test_rows_stop_on_error() {
        let visited = AtomicUsize::new(0);
        let mut buf = vec![0u8; 8];
        let res = try_for_each_row(&mut buf, 2, false, |v, _| {
            visited.fetch_add(1, Ordering::Relaxed);
            if v == 1 {
                return Err(FilterError::InvalidPass(v, 1));
            }
            Ok(())
        });
        assert!(matches!(res, Err(FilterError::InvalidPass(1, 1))));
        assert_eq!(visited.load(Ordering::Relaxed), 2);
    }
}
