//! Parameter block describing one grid evaluation.
//!
//! A [`ComputeRequest`] tells a kernel where the grid sits in the complex
//! plane, how dense it is, and which rows of the logical image this call has
//! to fill. Rows are handed out in pairs: pair `p` covers rows `2p` and
//! `2p + 1`, and a call visits the pairs
//!
//! ```text
//! first_row_div2, first_row_div2 + row_delta_div2, first_row_div2 + 2 * row_delta_div2, ...
//! ```
//!
//! while `2p < num_rows`. `num_rows` is the height of the whole image and the
//! output buffer always covers the whole image, so `k` calls with
//! `first_row_div2 = 0..k` and `row_delta_div2 = k` fill every row exactly
//! once and produce the same buffer as a single call with
//! `first_row_div2 = 0, row_delta_div2 = 1`.
//!
//! # Example
//!
//! ```rust
//! use simdbrot::ComputeRequest;
//!
//! let request = ComputeRequest::full_frame(-2.0, -1.0, 0.01, 0.01, 300, 200, 100);
//! let band = request.band(1, 4);
//!
//! assert_eq!(band.row_pairs().take(3).collect::<Vec<_>>(), vec![1, 5, 9]);
//! assert_eq!(band.pair_rows(1), 2..4);
//! ```

use std::iter::StepBy;
use std::ops::Range;

use crate::error::{buffer_error, validation_error, Result};

/// Squared escape radius; a point has escaped once `|z|^2` exceeds it.
pub const ESCAPE_RADIUS_SQUARED: f64 = 4.0;

/// Number of consecutive rows a kernel iterates together.
pub const ROWS_PER_PAIR: usize = 2;

/// Grid and row-band parameters of a single kernel call.
///
/// A plain Rust value, not an FFI record: the output buffer travels
/// separately as a slice and the counts use native index types.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComputeRequest {
    /// Real part of the grid origin (column 0).
    pub x0: f64,
    /// Imaginary part of the grid origin (row 0).
    pub y0: f64,
    /// Real step between two columns.
    pub delta_x: f64,
    /// Imaginary step between two rows.
    pub delta_y: f64,
    /// Number of columns per row, also the row stride of the buffer.
    pub row_size: usize,
    /// Upper bound of the escape-iteration count, at least 1.
    pub max_iterations: i32,
    /// First row pair this call fills.
    pub first_row_div2: usize,
    /// Height of the whole image in rows.
    pub num_rows: usize,
    /// Distance between two row pairs filled by this call, at least 1.
    pub row_delta_div2: usize,
}

impl ComputeRequest {
    /// Request covering every row of a `row_size x num_rows` image in one call.
    pub fn full_frame(
        x0: f64,
        y0: f64,
        delta_x: f64,
        delta_y: f64,
        row_size: usize,
        num_rows: usize,
        max_iterations: i32,
    ) -> Self {
        ComputeRequest {
            x0,
            y0,
            delta_x,
            delta_y,
            row_size,
            max_iterations,
            first_row_div2: 0,
            num_rows,
            row_delta_div2: 1,
        }
    }

    /// Same grid, restricted to the interleaved band `band` out of `bands`.
    pub fn band(self, band: usize, bands: usize) -> Self {
        ComputeRequest {
            first_row_div2: band,
            row_delta_div2: bands,
            ..self
        }
    }

    /// Number of `i32` elements the output buffer must hold.
    ///
    /// Returns `None` when `row_size * num_rows` overflows.
    pub fn required_len(&self) -> Option<usize> {
        self.row_size.checked_mul(self.num_rows)
    }

    /// Checks the request against an output buffer of `len` elements.
    ///
    /// A request with `num_rows == 0` selects no rows at all and is valid
    /// whatever its other parameters and the buffer.
    pub fn validate(&self, len: usize) -> Result<()> {
        if self.num_rows == 0 {
            return Ok(());
        }

        let required = self.validate_parameters()?;

        if len < required {
            return Err(buffer_error(required, len));
        }

        Ok(())
    }

    /// Checks everything but the buffer; returns the number of elements the
    /// whole image needs.
    pub fn validate_parameters(&self) -> Result<usize> {
        if self.max_iterations < 1 {
            return Err(validation_error(format!(
                "max_iterations must be at least 1, got {}",
                self.max_iterations
            )));
        }

        if self.row_size == 0 {
            return Err(validation_error("row_size must be at least 1"));
        }

        if self.row_delta_div2 == 0 {
            return Err(validation_error("row_delta_div2 must be at least 1"));
        }

        self.required_len().ok_or_else(|| {
            validation_error(format!(
                "row_size * num_rows overflows ({} x {})",
                self.row_size, self.num_rows
            ))
        })
    }

    /// Number of row pairs in the whole image; the last one may hold a single row.
    #[inline(always)]
    pub fn num_pairs(&self) -> usize {
        self.num_rows.div_ceil(ROWS_PER_PAIR)
    }

    /// Indices of the row pairs this call fills, in increasing order.
    pub fn row_pairs(&self) -> StepBy<Range<usize>> {
        (self.first_row_div2..self.num_pairs()).step_by(self.row_delta_div2.max(1))
    }

    /// Whether `pair` is one of [`ComputeRequest::row_pairs`].
    pub fn selects_pair(&self, pair: usize) -> bool {
        pair >= self.first_row_div2
            && pair < self.num_pairs()
            && (pair - self.first_row_div2) % self.row_delta_div2.max(1) == 0
    }

    /// Image rows covered by `pair`.
    #[inline(always)]
    pub fn pair_rows(&self, pair: usize) -> Range<usize> {
        let first = pair * ROWS_PER_PAIR;
        first..(first + ROWS_PER_PAIR).min(self.num_rows)
    }

    /// Buffer elements covered by `pair`.
    #[inline(always)]
    pub fn pair_span(&self, pair: usize) -> Range<usize> {
        let rows = self.pair_rows(pair);
        rows.start * self.row_size..rows.end * self.row_size
    }

    /// Real coordinate of column `column`.
    #[inline(always)]
    pub fn column_x(&self, column: usize) -> f64 {
        (column as f64).mul_add(self.delta_x, self.x0)
    }

    /// Imaginary coordinate of row `row`.
    #[inline(always)]
    pub fn row_y(&self, row: usize) -> f64 {
        (row as f64).mul_add(self.delta_y, self.y0)
    }

    /// True when row `r` and row `num_rows - 1 - r` sit at exactly opposite
    /// imaginary coordinates for every `r`.
    ///
    /// That holds iff `(num_rows - 1) * delta_y + 2 * y0` is exactly zero,
    /// which one fused multiply-add decides without rounding error. The
    /// kernels are then guaranteed to produce mirrored rows.
    pub fn is_symmetric_about_real_axis(&self) -> bool {
        self.num_rows > 1
            && ((self.num_rows - 1) as f64).mul_add(self.delta_y, self.y0 + self.y0) == 0.0
    }
}
