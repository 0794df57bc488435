//! AVX2 4-lane f64 vector for the escape-time loop.
//!
//! `F64x4` wraps a `__m256d` and implements [`EscapeLanes`] with AVX, AVX2
//! and FMA3 instructions:
//!
//! - arithmetic: `vaddpd`, `vmulpd`, `vfmadd`, `vfnmadd`
//! - lane masks: `vcmppd` (ordered, non-signaling `<=`) results, all ones per
//!   active lane
//! - counters: four `i64` lanes, incremented by subtracting the mask (-1)
//! - store: the low halves of the counters are gathered with `vpermd` and
//!   written as four `i32`

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use crate::simd::traits::EscapeLanes;

/// Number of f64 elements that fit in a 256-bit register.
pub const LANE_COUNT: usize = 4;

const LANE_OFFSETS: [f64; LANE_COUNT] = [0.0, 1.0, 2.0, 3.0];

/// AVX2 SIMD vector containing 4 packed f64 values.
#[derive(Copy, Clone, Debug)]
#[repr(transparent)]
pub struct F64x4 {
    elements: __m256d,
}

impl F64x4 {
    #[inline(always)]
    fn from_elements(elements: __m256d) -> Self {
        F64x4 { elements }
    }
}

impl EscapeLanes for F64x4 {
    const LANES: usize = LANE_COUNT;

    type Mask = __m256d;
    type Counts = __m256i;

    #[inline(always)]
    unsafe fn splat(value: f64) -> Self {
        Self::from_elements(_mm256_set1_pd(value))
    }

    #[inline(always)]
    unsafe fn columns(first: usize) -> Self {
        let offsets = _mm256_loadu_pd(LANE_OFFSETS.as_ptr());
        Self::from_elements(_mm256_add_pd(_mm256_set1_pd(first as f64), offsets))
    }

    #[inline(always)]
    unsafe fn add(self, rhs: Self) -> Self {
        Self::from_elements(_mm256_add_pd(self.elements, rhs.elements))
    }

    #[inline(always)]
    unsafe fn mul(self, rhs: Self) -> Self {
        Self::from_elements(_mm256_mul_pd(self.elements, rhs.elements))
    }

    #[inline(always)]
    unsafe fn mul_add(self, b: Self, c: Self) -> Self {
        Self::from_elements(_mm256_fmadd_pd(self.elements, b.elements, c.elements))
    }

    #[inline(always)]
    unsafe fn neg_mul_add(self, b: Self, c: Self) -> Self {
        Self::from_elements(_mm256_fnmadd_pd(self.elements, b.elements, c.elements))
    }

    #[inline(always)]
    unsafe fn le(self, rhs: Self) -> __m256d {
        _mm256_cmp_pd::<_CMP_LE_OQ>(self.elements, rhs.elements)
    }

    #[inline(always)]
    unsafe fn mask_all() -> __m256d {
        _mm256_castsi256_pd(_mm256_set1_epi64x(-1))
    }

    #[inline(always)]
    unsafe fn mask_and(a: __m256d, b: __m256d) -> __m256d {
        _mm256_and_pd(a, b)
    }

    #[inline(always)]
    unsafe fn mask_or(a: __m256d, b: __m256d) -> __m256d {
        _mm256_or_pd(a, b)
    }

    #[inline(always)]
    unsafe fn mask_is_empty(mask: __m256d) -> bool {
        _mm256_movemask_pd(mask) == 0
    }

    #[inline(always)]
    unsafe fn zero_counts() -> __m256i {
        _mm256_setzero_si256()
    }

    #[inline(always)]
    unsafe fn increment(counts: __m256i, mask: __m256d) -> __m256i {
        // active lanes are all ones, i.e. -1 as i64
        _mm256_sub_epi64(counts, _mm256_castpd_si256(mask))
    }

    #[inline(always)]
    unsafe fn store_counts(counts: __m256i, out: &mut [i32]) {
        assert!(out.len() >= LANE_COUNT, "Output must hold {LANE_COUNT} counters");

        // counters never exceed i32::MAX, the low dword of each lane is the value
        let low_dwords = _mm256_setr_epi32(0, 2, 4, 6, 0, 0, 0, 0);
        let packed = _mm256_permutevar8x32_epi32(counts, low_dwords);

        _mm_storeu_si128(out.as_mut_ptr() as *mut __m128i, _mm256_castsi256_si128(packed));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn available() -> bool {
        std::is_x86_feature_detected!("avx2") && std::is_x86_feature_detected!("fma")
    }

    #[test]
    fn test_columns_and_store() {
        if !available() {
            return;
        }

        unsafe {
            let mut out = [0i32; LANE_COUNT];
            let mask = F64x4::columns(10).le(F64x4::splat(11.5));
            let counts = F64x4::increment(F64x4::increment(F64x4::zero_counts(), mask), mask);
            F64x4::store_counts(counts, &mut out);
            assert_eq!(out, [2, 2, 0, 0]);
        }
    }

    #[test]
    fn test_mask_is_empty() {
        if !available() {
            return;
        }

        unsafe {
            let nan = F64x4::splat(f64::NAN);
            assert!(F64x4::mask_is_empty(nan.le(F64x4::splat(4.0))));
            assert!(!F64x4::mask_is_empty(F64x4::mask_all()));
        }
    }
}
