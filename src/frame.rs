//! Owned iterations buffer and the drivers that fill it.
//!
//! An [`IterationsFrame`] holds one `i32` per pixel of a `width x height`
//! image, row-major with a stride of `width`. It maps a [`MandelbrotRegion`]
//! onto that grid and runs a [`Backend`] over it, either in one call, in
//! interleaved row bands (one after the other or concurrently), on the rayon
//! pool, or on the upper half only when the grid is mirrored by the real
//! axis. Every driver yields the same buffer.
//!
//! # Example
//!
//! ```rust
//! use simdbrot::{Backend, IterationsFrame, MandelbrotRegion};
//!
//! let region = MandelbrotRegion::named_or_default(Some("Starfish"));
//! let mut serial = IterationsFrame::new(64, 48).unwrap();
//! let mut parallel = IterationsFrame::new(64, 48).unwrap();
//!
//! serial.calculate(Backend::detect(), &region, 200).unwrap();
//! let report = parallel.calculate_parallel(Backend::detect(), &region, 200).unwrap();
//!
//! assert_eq!(serial.iterations(), parallel.iterations());
//! assert_eq!(report.width, 64);
//! ```

use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use log::{debug, trace};
use ndarray::ArrayView2;
use rayon::prelude::*;

use crate::error::{validation_error, Result};
use crate::info::IterationsInfo;
use crate::region::MandelbrotRegion;
use crate::request::{ComputeRequest, ROWS_PER_PAIR};
use crate::simd::Backend;

/// Timing and parameters of one frame calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationReport {
    pub backend: Backend,
    pub region: MandelbrotRegion,
    pub max_iterations: i32,
    /// Number of kernel calls or rayon workers the rows were spread over.
    pub tasks: usize,
    pub width: usize,
    pub height: usize,
    pub started_at: DateTime<Local>,
    pub elapsed: Duration,
}

impl CalculationReport {
    /// Pixels per second, zero when nothing measurable elapsed.
    pub fn pixels_per_second(&self) -> f64 {
        let seconds = self.elapsed.as_secs_f64();
        if seconds > 0.0 {
            (self.width * self.height) as f64 / seconds
        } else {
            0.0
        }
    }
}

impl fmt::Display for CalculationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let center = self.region.center_and_zoom();
        write!(
            f,
            "{:<15} {}x{} @ ({}, {}) zoom {:.3e}, max {} iterations, {} task(s), started {}, {:.3} ms",
            self.backend.name(),
            self.width,
            self.height,
            center.x,
            center.y,
            center.zoom_factor,
            self.max_iterations,
            self.tasks,
            self.started_at.format("%H:%M:%S%.3f"),
            self.elapsed.as_secs_f64() * 1e3
        )
    }
}

/// Iteration counts of a `width x height` image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationsFrame {
    width: usize,
    height: usize,
    iterations: Vec<i32>,
}

impl IterationsFrame {
    /// Zero-filled frame.
    ///
    /// # Errors
    ///
    /// [`crate::MandelbrotError::ValidationError`] when a side is zero or the
    /// pixel count overflows.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        let len = frame_len(width, height)?;

        Ok(IterationsFrame {
            width,
            height,
            iterations: vec![0; len],
        })
    }

    /// Resizes the frame; the contents are reset to zero.
    pub fn set_size(&mut self, width: usize, height: usize) -> Result<()> {
        let len = frame_len(width, height)?;

        self.iterations.clear();
        self.iterations.resize(len, 0);
        self.width = width;
        self.height = height;

        Ok(())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major counts, `width * height` elements.
    pub fn iterations(&self) -> &[i32] {
        &self.iterations
    }

    /// Counts of row `row`, or `None` past the last row.
    pub fn row(&self, row: usize) -> Option<&[i32]> {
        (row < self.height).then(|| &self.iterations[row * self.width..(row + 1) * self.width])
    }

    /// Counts as a `(height, width)` array view.
    pub fn as_array(&self) -> Result<ArrayView2<'_, i32>> {
        ArrayView2::from_shape((self.height, self.width), &self.iterations)
            .map_err(|e| validation_error(format!("frame shape: {e}")))
    }

    /// Full-frame request sampling `region` on this frame's grid.
    pub fn request(&self, region: &MandelbrotRegion, max_iterations: i32) -> ComputeRequest {
        let (delta_x, delta_y) = region.delta_for(self.width, self.height);

        ComputeRequest::full_frame(
            region.x0,
            region.y0,
            delta_x,
            delta_y,
            self.width,
            self.height,
            max_iterations,
        )
    }

    /// Fills every row with a single kernel call.
    pub fn calculate(
        &mut self,
        backend: Backend,
        region: &MandelbrotRegion,
        max_iterations: i32,
    ) -> Result<CalculationReport> {
        let request = self.request(region, max_iterations);

        self.timed(backend, region, max_iterations, 1, |iterations| {
            backend.calculate(&request, iterations)
        })
    }

    /// Fills row 0 only; the other rows keep their previous counts.
    pub fn calculate_first_row(
        &mut self,
        backend: Backend,
        region: &MandelbrotRegion,
        max_iterations: i32,
    ) -> Result<CalculationReport> {
        let request = ComputeRequest {
            num_rows: 1,
            ..self.request(region, max_iterations)
        };
        let width = self.width;

        let mut report = self.timed(backend, region, max_iterations, 1, |iterations| {
            backend.calculate(&request, &mut iterations[..width])
        })?;
        report.height = 1;

        Ok(report)
    }

    /// Fills the frame with `bands` interleaved kernel calls, one after the
    /// other; call `i` fills the row pairs `i, i + bands, i + 2 * bands, ...`.
    pub fn calculate_banded(
        &mut self,
        backend: Backend,
        region: &MandelbrotRegion,
        max_iterations: i32,
        bands: usize,
    ) -> Result<CalculationReport> {
        if bands == 0 {
            return Err(validation_error("bands must be at least 1"));
        }

        let request = self.request(region, max_iterations);

        self.timed(backend, region, max_iterations, bands, |iterations| {
            (0..bands).try_for_each(|band| backend.calculate(&request.band(band, bands), iterations))
        })
    }

    /// Fills the frame with `bands` interleaved bands running concurrently
    /// on the rayon pool; band `i` fills the row pairs
    /// `i, i + bands, i + 2 * bands, ...` with its own band request.
    ///
    /// The buffer is split into row pairs up front and every band owns its
    /// pairs, so the workers never share rows.
    pub fn calculate_banded_parallel(
        &mut self,
        backend: Backend,
        region: &MandelbrotRegion,
        max_iterations: i32,
        bands: usize,
    ) -> Result<CalculationReport> {
        if bands == 0 {
            return Err(validation_error("bands must be at least 1"));
        }

        let request = self.request(region, max_iterations);
        let chunk_size = ROWS_PER_PAIR * self.width;

        self.timed(backend, region, max_iterations, bands, |iterations| {
            request.validate(iterations.len())?;
            backend.ensure_supported()?;

            let mut band_rows: Vec<Vec<(usize, &mut [i32])>> =
                (0..bands).map(|_| Vec::new()).collect();
            for (pair, rows) in iterations.chunks_mut(chunk_size).enumerate() {
                band_rows[pair % bands].push((pair, rows));
            }

            band_rows
                .into_par_iter()
                .enumerate()
                .try_for_each(|(band, pairs)| {
                    let band_request = request.band(band, bands);
                    trace!("band {band}/{bands}: {} row pairs", pairs.len());

                    pairs
                        .into_iter()
                        .try_for_each(|(pair, rows)| backend.fill_pair(&band_request, pair, rows))
                })
        })
    }

    /// Fills the frame on the rayon pool, one task per row pair.
    pub fn calculate_parallel(
        &mut self,
        backend: Backend,
        region: &MandelbrotRegion,
        max_iterations: i32,
    ) -> Result<CalculationReport> {
        let request = self.request(region, max_iterations);
        let chunk_size = ROWS_PER_PAIR * self.width;
        let tasks = rayon::current_num_threads();

        self.timed(backend, region, max_iterations, tasks, |iterations| {
            request.validate(iterations.len())?;
            backend.ensure_supported()?;

            iterations
                .par_chunks_mut(chunk_size)
                .enumerate()
                .try_for_each(|(pair, rows)| backend.fill_pair(&request, pair, rows))
        })
    }

    /// Computes the upper half and mirrors it when the grid is exactly
    /// symmetric about the real axis, otherwise falls back to
    /// [`IterationsFrame::calculate`].
    ///
    /// The escape loop is symmetric under `y -> -y`, so both give the same
    /// counts.
    pub fn calculate_mirrored(
        &mut self,
        backend: Backend,
        region: &MandelbrotRegion,
        max_iterations: i32,
    ) -> Result<CalculationReport> {
        let request = self.request(region, max_iterations);

        if !request.is_symmetric_about_real_axis() {
            debug!("grid is not symmetric about the real axis, computing every row");
            return self.calculate(backend, region, max_iterations);
        }

        let (width, height) = (self.width, self.height);
        let upper_rows = height.div_ceil(2);
        let upper = ComputeRequest {
            num_rows: upper_rows,
            ..request
        };

        self.timed(backend, region, max_iterations, 1, |iterations| {
            backend.calculate(&upper, &mut iterations[..upper_rows * width])?;

            for row in upper_rows..height {
                let source = (height - 1 - row) * width;
                iterations.copy_within(source..source + width, row * width);
            }

            Ok(())
        })
    }

    /// Total, smallest and largest count of the frame.
    pub fn info(&self) -> IterationsInfo {
        IterationsInfo::from_frame(self)
    }

    fn timed<F>(
        &mut self,
        backend: Backend,
        region: &MandelbrotRegion,
        max_iterations: i32,
        tasks: usize,
        run: F,
    ) -> Result<CalculationReport>
    where
        F: FnOnce(&mut [i32]) -> Result<()>,
    {
        debug!(
            "{}: calculating {}x{} frame, max {} iterations, {} task(s)",
            backend.name(),
            self.width,
            self.height,
            max_iterations,
            tasks
        );

        let started_at = Local::now();
        let start = Instant::now();

        run(&mut self.iterations)?;

        let elapsed = start.elapsed();
        trace!("{}: frame done in {:?}", backend.name(), elapsed);

        Ok(CalculationReport {
            backend,
            region: *region,
            max_iterations,
            tasks,
            width: self.width,
            height: self.height,
            started_at,
            elapsed,
        })
    }
}

fn frame_len(width: usize, height: usize) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(validation_error(format!(
            "frame size must be at least 1x1, got {width}x{height}"
        )));
    }

    width
        .checked_mul(height)
        .ok_or_else(|| validation_error(format!("frame size {width}x{height} overflows")))
}
