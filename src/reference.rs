//! Straightforward escape-time on complex numbers.
//!
//! Evaluates `z <- z^2 + c` with [`Complex64`] arithmetic and no fused
//! operations. The rounding differs from the kernels, so a pixel close to the
//! boundary of the set may land one or two iterations apart; anywhere else
//! the counts agree. Used as an independent oracle in tests and benches.

use num::complex::Complex64;

use crate::error::Result;
use crate::request::{ComputeRequest, ESCAPE_RADIUS_SQUARED};

/// Number of steps before `|z|^2 > 4`, with `z` starting at `c`, capped at
/// `max_iterations`.
///
/// # Example
///
/// ```rust
/// use num::complex::Complex64;
/// use simdbrot::reference::escape_time;
///
/// assert_eq!(escape_time(Complex64::new(0.0, 0.0), 100), 100);
/// assert_eq!(escape_time(Complex64::new(2.0, 0.0), 100), 1);
/// ```
pub fn escape_time(c: Complex64, max_iterations: i32) -> i32 {
    let mut z = c;

    for n in 0..max_iterations {
        let norm = z.norm_sqr();
        if norm > ESCAPE_RADIUS_SQUARED || norm.is_nan() {
            return n;
        }
        z = z * z + c;
    }

    max_iterations.max(0)
}

/// Fills the rows `request` selects, same layout as the kernels.
pub fn calculate(request: &ComputeRequest, iterations: &mut [i32]) -> Result<()> {
    request.validate(iterations.len())?;

    for pair in request.row_pairs() {
        for row in request.pair_rows(pair) {
            let y = request.row_y(row);
            let out = &mut iterations[row * request.row_size..(row + 1) * request.row_size];

            for (column, count) in out.iter_mut().enumerate() {
                let c = Complex64::new(request.column_x(column), y);
                *count = escape_time(c, request.max_iterations);
            }
        }
    }

    Ok(())
}
