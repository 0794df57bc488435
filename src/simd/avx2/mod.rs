//! AVX2 + FMA3 kernel on 256-bit registers.
//!
//! Four `f64` columns per block, two rows per pair. This is the baseline
//! vector path for x86-64 CPUs since Haswell (Intel) and Excavator (AMD).
//!
//! # Architecture Requirements
//!
//! - **CPU Support**: `avx2` and `fma`, checked at runtime by
//!   [`crate::simd::Backend::is_supported`]
//! - **Target Architecture**: x86 or x86_64
//! - **Compilation**: the entry points enable the features themselves with
//!   `#[target_feature]`, no global `-C target-feature` is needed

pub mod f64x4;

use crate::request::ComputeRequest;
use crate::simd::kernel;

use self::f64x4::F64x4;

/// Fills the rows selected by a validated request.
///
/// # Safety
///
/// The CPU must support `avx2` and `fma`.
#[target_feature(enable = "avx2,fma")]
pub(crate) unsafe fn calculate(request: &ComputeRequest, iterations: &mut [i32]) {
    kernel::calculate::<F64x4>(request, iterations)
}

/// Fills one row pair of a validated request.
///
/// # Safety
///
/// The CPU must support `avx2` and `fma`.
#[target_feature(enable = "avx2,fma")]
pub(crate) unsafe fn fill_pair(request: &ComputeRequest, pair: usize, rows: &mut [i32]) {
    kernel::fill_pair::<F64x4>(request, pair, rows)
}
