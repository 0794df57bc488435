//! Lane-generic escape-time loop and row-pair driver.
//!
//! Every backend instantiates these functions with its own [`EscapeLanes`]
//! type from inside a `#[target_feature]` entry point; they are
//! `#[inline(always)]` so the whole loop is compiled with the backend's
//! instruction set.
//!
//! Per point, with `c = x + yi` and `z = a + bi` starting at `c`:
//!
//! ```text
//! |z|^2 = fma(b, b, a * a)            escape once > 4 (or NaN)
//! a'    = fma(a, a, -(b * b) + x)     = a^2 - b^2 + x
//! b'    = fma(a + a, b, y)            = 2ab + y
//! ```
//!
//! Columns are evaluated `LANES` at a time and the two rows of a pair are
//! interleaved in the same loop, so two independent dependency chains are in
//! flight. A lane that escaped keeps iterating with a frozen counter until
//! every lane of both rows is done.

use std::ops::Range;

use crate::request::{ComputeRequest, ESCAPE_RADIUS_SQUARED, ROWS_PER_PAIR};
use crate::simd::scalar::F64x1;
use crate::simd::traits::EscapeLanes;

/// One step of `z <- z^2 + c`.
#[inline(always)]
unsafe fn step<V: EscapeLanes>(a: V, b: V, x: V, y: V) -> (V, V) {
    let minus_bb_plus_x = b.neg_mul_add(b, x);
    let next_b = a.add(a).mul_add(b, y);
    let next_a = a.mul_add(a, minus_bb_plus_x);
    (next_a, next_b)
}

/// Escape counts of the lanes of `x` on the rows `y_upper` and `y_lower`.
#[inline(always)]
pub(crate) unsafe fn escape_pair<V: EscapeLanes>(
    x: V,
    y_upper: V,
    y_lower: V,
    max_iterations: i32,
) -> (V::Counts, V::Counts) {
    let four = V::splat(ESCAPE_RADIUS_SQUARED);

    let (mut a1, mut b1) = (x, y_upper);
    let (mut a2, mut b2) = (x, y_lower);

    let mut active1 = V::mask_all();
    let mut active2 = V::mask_all();

    let mut iterations1 = V::zero_counts();
    let mut iterations2 = V::zero_counts();

    for _ in 0..max_iterations {
        let magnitude1 = b1.mul_add(b1, a1.mul(a1));
        let magnitude2 = b2.mul_add(b2, a2.mul(a2));

        // sticky: once out, a lane never counts again
        active1 = V::mask_and(active1, magnitude1.le(four));
        active2 = V::mask_and(active2, magnitude2.le(four));

        if V::mask_is_empty(V::mask_or(active1, active2)) {
            break;
        }

        iterations1 = V::increment(iterations1, active1);
        iterations2 = V::increment(iterations2, active2);

        (a1, b1) = step(a1, b1, x, y_upper);
        (a2, b2) = step(a2, b2, x, y_lower);
    }

    (iterations1, iterations2)
}

/// Fills `columns` of one row pair, `V::LANES` columns per block.
///
/// `columns.len()` must be a multiple of `V::LANES`.
#[inline(always)]
unsafe fn fill_columns<V: EscapeLanes>(
    request: &ComputeRequest,
    columns: Range<usize>,
    y: (f64, f64),
    upper: &mut [i32],
    mut lower: Option<&mut [i32]>,
) {
    debug_assert_eq!(columns.len() % V::LANES, 0);

    let delta_x = V::splat(request.delta_x);
    let x0 = V::splat(request.x0);
    let y_upper = V::splat(y.0);
    let y_lower = V::splat(y.1);

    for column in columns.step_by(V::LANES) {
        let x = V::columns(column).mul_add(delta_x, x0);
        let (counts_upper, counts_lower) =
            escape_pair(x, y_upper, y_lower, request.max_iterations);

        V::store_counts(counts_upper, &mut upper[column..column + V::LANES]);

        if let Some(lower) = lower.as_deref_mut() {
            V::store_counts(counts_lower, &mut lower[column..column + V::LANES]);
        }
    }
}

/// Fills the rows of `pair`; `rows` is exactly the buffer span of the pair.
///
/// Full blocks go through `V`, the remaining `row_size % V::LANES` columns
/// through the one-lane type with the same arithmetic.
#[inline(always)]
pub(crate) unsafe fn fill_pair<V: EscapeLanes>(
    request: &ComputeRequest,
    pair: usize,
    rows: &mut [i32],
) {
    let row_size = request.row_size;
    let pair_rows = request.pair_rows(pair);

    debug_assert_eq!(rows.len(), pair_rows.len() * row_size);

    let y_upper = request.row_y(pair_rows.start);

    // A trailing single row is iterated twice and the copy is dropped
    let (upper, mut lower, y_lower) = if pair_rows.len() == ROWS_PER_PAIR {
        let (upper, lower) = rows.split_at_mut(row_size);
        (upper, Some(lower), request.row_y(pair_rows.start + 1))
    } else {
        (rows, None, y_upper)
    };

    let vector_end = row_size - row_size % V::LANES;

    fill_columns::<V>(
        request,
        0..vector_end,
        (y_upper, y_lower),
        upper,
        lower.as_deref_mut(),
    );

    fill_columns::<F64x1>(request, vector_end..row_size, (y_upper, y_lower), upper, lower);
}

/// Fills every row pair the request selects.
#[inline(always)]
pub(crate) unsafe fn calculate<V: EscapeLanes>(request: &ComputeRequest, iterations: &mut [i32]) {
    for pair in request.row_pairs() {
        let span = request.pair_span(pair);
        fill_pair::<V>(request, pair, &mut iterations[span]);
    }
}
