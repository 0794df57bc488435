//! Portable one-lane kernel.
//!
//! [`F64x1`] runs the shared escape loop on plain `f64` values. It is the
//! fallback backend on CPUs without AVX2/FMA and handles the trailing
//! columns of the vector backends. `f64::mul_add` is correctly rounded on
//! every target, so the counts match the vector kernels bit for bit.
//!
//! On targets built without the `fma` feature (baseline x86-64 included)
//! `f64::mul_add` lowers to a software FMA call from libm. That makes this
//! backend roughly 30 times slower than the AVX2 kernel; the exact rounding
//! is kept because a plain `a * b + c` would give different counts.

use crate::request::ComputeRequest;
use crate::simd::kernel;
use crate::simd::traits::EscapeLanes;

/// A single `f64` lane.
#[derive(Copy, Clone, Debug, PartialEq)]
#[repr(transparent)]
pub struct F64x1(f64);

impl EscapeLanes for F64x1 {
    const LANES: usize = 1;

    type Mask = bool;
    type Counts = i32;

    #[inline(always)]
    unsafe fn splat(value: f64) -> Self {
        F64x1(value)
    }

    #[inline(always)]
    unsafe fn columns(first: usize) -> Self {
        F64x1(first as f64)
    }

    #[inline(always)]
    unsafe fn add(self, rhs: Self) -> Self {
        F64x1(self.0 + rhs.0)
    }

    #[inline(always)]
    unsafe fn mul(self, rhs: Self) -> Self {
        F64x1(self.0 * rhs.0)
    }

    #[inline(always)]
    unsafe fn mul_add(self, b: Self, c: Self) -> Self {
        F64x1(self.0.mul_add(b.0, c.0))
    }

    #[inline(always)]
    unsafe fn neg_mul_add(self, b: Self, c: Self) -> Self {
        // negation is exact, so this is -(a * b) + c rounded once
        F64x1((-self.0).mul_add(b.0, c.0))
    }

    #[inline(always)]
    unsafe fn le(self, rhs: Self) -> bool {
        self.0 <= rhs.0
    }

    #[inline(always)]
    unsafe fn mask_all() -> bool {
        true
    }

    #[inline(always)]
    unsafe fn mask_and(a: bool, b: bool) -> bool {
        a & b
    }

    #[inline(always)]
    unsafe fn mask_or(a: bool, b: bool) -> bool {
        a | b
    }

    #[inline(always)]
    unsafe fn mask_is_empty(mask: bool) -> bool {
        !mask
    }

    #[inline(always)]
    unsafe fn zero_counts() -> i32 {
        0
    }

    #[inline(always)]
    unsafe fn increment(counts: i32, mask: bool) -> i32 {
        counts + i32::from(mask)
    }

    #[inline(always)]
    unsafe fn store_counts(counts: i32, out: &mut [i32]) {
        out[0] = counts;
    }
}

/// Escape-iteration count of the single point `cx + cy i`.
///
/// Same arithmetic as every backend: `z` starts at `c`, and the result is
/// the number of steps taken before `|z|^2 > 4`, capped at `max_iterations`.
///
/// # Example
///
/// ```rust
/// use simdbrot::simd::scalar::escape_count;
///
/// assert_eq!(escape_count(0.0, 0.0, 50), 50);
/// assert_eq!(escape_count(2.0, 0.0, 50), 1);
/// assert_eq!(escape_count(3.0, 0.0, 50), 0);
/// ```
pub fn escape_count(cx: f64, cy: f64, max_iterations: i32) -> i32 {
    // SAFETY: the one-lane type only uses portable floating-point operations.
    unsafe {
        kernel::escape_pair(F64x1(cx), F64x1(cy), F64x1(cy), max_iterations).0
    }
}

/// Fills the rows selected by a validated request.
pub(crate) fn calculate(request: &ComputeRequest, iterations: &mut [i32]) {
    // SAFETY: see `escape_count`.
    unsafe { kernel::calculate::<F64x1>(request, iterations) }
}

/// Fills one row pair of a validated request.
pub(crate) fn fill_pair(request: &ComputeRequest, pair: usize, rows: &mut [i32]) {
    // SAFETY: see `escape_count`.
    unsafe { kernel::fill_pair::<F64x1>(request, pair, rows) }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Plain transcription of the recurrence, no lanes involved.
    fn trace(cx: f64, cy: f64, max_iterations: i32) -> i32 {
        let (mut a, mut b) = (cx, cy);
        let mut n = 0;
        while n < max_iterations {
            let magnitude = b.mul_add(b, a * a);
            if magnitude > 4.0 || magnitude.is_nan() {
                break;
            }
            let minus_bb_plus_x = (-b).mul_add(b, cx);
            b = (a + a).mul_add(b, cy);
            a = a.mul_add(a, minus_bb_plus_x);
            n += 1;
        }
        n
    }

    #[test]
    fn test_origin_never_escapes() {
        assert_eq!(escape_count(0.0, 0.0, 1), 1);
        assert_eq!(escape_count(0.0, 0.0, 1000), 1000);
    }

    #[test]
    fn test_two_escapes_after_one_step() {
        // |2|^2 = 4 is not > 4, then 2^2 + 2 = 6 escapes
        assert_eq!(escape_count(2.0, 0.0, 100), 1);
        assert_eq!(trace(2.0, 0.0, 100), 1);
    }

    #[test]
    fn test_far_point_escapes_immediately() {
        assert_eq!(escape_count(3.0, 0.0, 100), 0);
        assert_eq!(escape_count(0.0, -2.5, 100), 0);
    }

    #[test]
    fn test_minus_two_stays_bounded() {
        // -2 -> 2 -> 2 -> ... sits exactly on the radius
        assert_eq!(escape_count(-2.0, 0.0, 500), 500);
    }

    #[test]
    fn test_nan_counts_as_escaped() {
        assert_eq!(escape_count(f64::NAN, 0.0, 10), 0);
    }

    #[test]
    fn test_matches_trace_on_a_line() {
        for i in 0..400 {
            let cx = -2.1 + i as f64 * 0.0071;
            let cy = 0.3 - i as f64 * 0.0013;
            assert_eq!(escape_count(cx, cy, 256), trace(cx, cy, 256), "c = {cx} + {cy}i");
        }
    }

    #[test]
    fn test_fill_pair_odd_height() {
        let request = ComputeRequest::full_frame(-1.5, -0.5, 0.5, 0.5, 3, 3, 20);
        let mut iterations = vec![-1; 9];

        fill_pair(&request, 1, &mut iterations[6..9]);

        assert!(iterations[..6].iter().all(|&n| n == -1));
        for column in 0..3 {
            assert_eq!(
                iterations[6 + column],
                escape_count(request.column_x(column), request.row_y(2), 20)
            );
        }
    }
}
