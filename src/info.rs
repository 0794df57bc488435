//! Summary statistics of an iterations buffer.

use crate::frame::IterationsFrame;

/// Total, smallest and largest iteration count of a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IterationsInfo {
    pub total_iterations: i64,
    pub min_iterations: i32,
    pub max_iterations: i32,
}

impl IterationsInfo {
    /// Statistics over the first `width` columns of `height` rows of stride
    /// `row_size`. An empty area yields all zeros.
    ///
    /// # Panics
    ///
    /// Panics if `width > row_size` or the buffer is shorter than the area.
    pub fn from_rows(iterations: &[i32], width: usize, height: usize, row_size: usize) -> Self {
        assert!(width <= row_size, "width {width} exceeds row size {row_size}");

        if width == 0 || height == 0 {
            return IterationsInfo::default();
        }

        let (total_iterations, min_iterations, max_iterations) = iterations
            .chunks(row_size)
            .take(height)
            .flat_map(|row| &row[..width])
            .fold((0i64, i32::MAX, i32::MIN), |(total, min, max), &n| {
                (total + i64::from(n), min.min(n), max.max(n))
            });

        IterationsInfo {
            total_iterations,
            min_iterations,
            max_iterations,
        }
    }

    /// Statistics over a whole frame.
    pub fn from_frame(frame: &IterationsFrame) -> Self {
        IterationsInfo::from_rows(frame.iterations(), frame.width(), frame.height(), frame.width())
    }
}
