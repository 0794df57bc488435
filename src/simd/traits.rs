/// Lane-level operations the escape-time loop is written against.
///
/// Each implementation wraps one register width (1, 4 or 8 `f64` lanes).
/// The loop in [`crate::simd::kernel`] only talks to this trait, so every
/// backend performs the same sequence of roundings and the iteration counts
/// are bit-identical across backends.
///
/// All methods are `unsafe`: vector implementations are only sound on a CPU
/// that supports their instruction set, which the caller guarantees.
pub trait EscapeLanes: Copy {
    /// Number of `f64` lanes.
    const LANES: usize;

    /// Per-lane "still iterating" flags.
    type Mask: Copy;

    /// Per-lane iteration counters.
    type Counts: Copy;

    /// # Safety
    ///
    /// The CPU must support the implementation's instruction set.
    unsafe fn splat(value: f64) -> Self;

    /// Lane `i` holds `first + i` converted exactly to `f64`.
    ///
    /// # Safety
    ///
    /// The CPU must support the implementation's instruction set.
    unsafe fn columns(first: usize) -> Self;

    /// # Safety
    ///
    /// The CPU must support the implementation's instruction set.
    unsafe fn add(self, rhs: Self) -> Self;

    /// # Safety
    ///
    /// The CPU must support the implementation's instruction set.
    unsafe fn mul(self, rhs: Self) -> Self;

    /// `self * b + c` with a single rounding.
    ///
    /// # Safety
    ///
    /// The CPU must support the implementation's instruction set.
    unsafe fn mul_add(self, b: Self, c: Self) -> Self;

    /// `-(self * b) + c` with a single rounding.
    ///
    /// # Safety
    ///
    /// The CPU must support the implementation's instruction set.
    unsafe fn neg_mul_add(self, b: Self, c: Self) -> Self;

    /// Ordered `self <= rhs`; NaN lanes compare false.
    ///
    /// # Safety
    ///
    /// The CPU must support the implementation's instruction set.
    unsafe fn le(self, rhs: Self) -> Self::Mask;

    /// # Safety
    ///
    /// The CPU must support the implementation's instruction set.
    unsafe fn mask_all() -> Self::Mask;

    /// # Safety
    ///
    /// The CPU must support the implementation's instruction set.
    unsafe fn mask_and(a: Self::Mask, b: Self::Mask) -> Self::Mask;

    /// # Safety
    ///
    /// The CPU must support the implementation's instruction set.
    unsafe fn mask_or(a: Self::Mask, b: Self::Mask) -> Self::Mask;

    /// True when no lane is set.
    ///
    /// # Safety
    ///
    /// The CPU must support the implementation's instruction set.
    unsafe fn mask_is_empty(mask: Self::Mask) -> bool;

    /// # Safety
    ///
    /// The CPU must support the implementation's instruction set.
    unsafe fn zero_counts() -> Self::Counts;

    /// Adds one to the counters of the lanes set in `mask`.
    ///
    /// # Safety
    ///
    /// The CPU must support the implementation's instruction set.
    unsafe fn increment(counts: Self::Counts, mask: Self::Mask) -> Self::Counts;

    /// Writes the `LANES` counters to `out[..LANES]`.
    ///
    /// # Safety
    ///
    /// The CPU must support the implementation's instruction set.
    ///
    /// # Panics
    ///
    /// Panics if `out` holds fewer than `LANES` elements.
    unsafe fn store_counts(counts: Self::Counts, out: &mut [i32]);
}
