//! AVX-512F 8-lane f64 vector for the escape-time loop.
//!
//! Unlike the AVX2 path, comparisons produce `__mmask8` bit masks, and the
//! counters are bumped with a masked add instead of a subtraction of the
//! comparison result. The eight `i64` counters are narrowed to `i32` with
//! `vpmovqd` before the store.

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use crate::simd::traits::EscapeLanes;

/// The number of f64 lanes in an AVX-512 vector.
pub const LANE_COUNT: usize = 8;

const LANE_OFFSETS: [f64; LANE_COUNT] = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];

/// An 8-lane, 64-bit floating-point SIMD vector using AVX-512F intrinsics.
#[derive(Copy, Clone, Debug)]
#[repr(transparent)]
pub struct F64x8 {
    elements: __m512d,
}

impl F64x8 {
    #[inline(always)]
    fn from_elements(elements: __m512d) -> Self {
        F64x8 { elements }
    }
}

impl EscapeLanes for F64x8 {
    const LANES: usize = LANE_COUNT;

    type Mask = __mmask8;
    type Counts = __m512i;

    #[inline(always)]
    unsafe fn splat(value: f64) -> Self {
        Self::from_elements(_mm512_set1_pd(value))
    }

    #[inline(always)]
    unsafe fn columns(first: usize) -> Self {
        let offsets = _mm512_loadu_pd(LANE_OFFSETS.as_ptr());
        Self::from_elements(_mm512_add_pd(_mm512_set1_pd(first as f64), offsets))
    }

    #[inline(always)]
    unsafe fn add(self, rhs: Self) -> Self {
        Self::from_elements(_mm512_add_pd(self.elements, rhs.elements))
    }

    #[inline(always)]
    unsafe fn mul(self, rhs: Self) -> Self {
        Self::from_elements(_mm512_mul_pd(self.elements, rhs.elements))
    }

    #[inline(always)]
    unsafe fn mul_add(self, b: Self, c: Self) -> Self {
        Self::from_elements(_mm512_fmadd_pd(self.elements, b.elements, c.elements))
    }

    #[inline(always)]
    unsafe fn neg_mul_add(self, b: Self, c: Self) -> Self {
        Self::from_elements(_mm512_fnmadd_pd(self.elements, b.elements, c.elements))
    }

    #[inline(always)]
    unsafe fn le(self, rhs: Self) -> __mmask8 {
        _mm512_cmp_pd_mask::<_CMP_LE_OQ>(self.elements, rhs.elements)
    }

    #[inline(always)]
    unsafe fn mask_all() -> __mmask8 {
        0xFF
    }

    #[inline(always)]
    unsafe fn mask_and(a: __mmask8, b: __mmask8) -> __mmask8 {
        a & b
    }

    #[inline(always)]
    unsafe fn mask_or(a: __mmask8, b: __mmask8) -> __mmask8 {
        a | b
    }

    #[inline(always)]
    unsafe fn mask_is_empty(mask: __mmask8) -> bool {
        mask == 0
    }

    #[inline(always)]
    unsafe fn zero_counts() -> __m512i {
        _mm512_setzero_si512()
    }

    #[inline(always)]
    unsafe fn increment(counts: __m512i, mask: __mmask8) -> __m512i {
        _mm512_mask_add_epi64(counts, mask, counts, _mm512_set1_epi64(1))
    }

    #[inline(always)]
    unsafe fn store_counts(counts: __m512i, out: &mut [i32]) {
        assert!(out.len() >= LANE_COUNT, "Output must hold {LANE_COUNT} counters");

        let narrowed = _mm512_cvtepi64_epi32(counts);
        _mm256_storeu_si256(out.as_mut_ptr() as *mut __m256i, narrowed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_and_store() {
        if !std::is_x86_feature_detected!("avx512f") {
            return;
        }

        unsafe {
            let mut out = [0i32; LANE_COUNT];
            let mask = F64x8::columns(3).le(F64x8::splat(6.0));
            let counts = F64x8::increment(F64x8::zero_counts(), mask);
            F64x8::store_counts(counts, &mut out);
            assert_eq!(out, [1, 1, 1, 1, 0, 0, 0, 0]);
        }
    }
}
