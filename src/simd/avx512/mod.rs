//! AVX-512F kernel on 512-bit registers.
//!
//! Eight `f64` columns per block, two rows per pair. Only compiled when the
//! toolchain ships the AVX-512 intrinsics (see `build.rs`), and only entered
//! after `avx512f` was detected on the running CPU.

pub mod f64x8;

use crate::request::ComputeRequest;
use crate::simd::kernel;

use self::f64x8::F64x8;

/// Fills the rows selected by a validated request.
///
/// # Safety
///
/// The CPU must support `avx512f`.
#[target_feature(enable = "avx512f,avx2,fma")]
pub(crate) unsafe fn calculate(request: &ComputeRequest, iterations: &mut [i32]) {
    kernel::calculate::<F64x8>(request, iterations)
}

/// Fills one row pair of a validated request.
///
/// # Safety
///
/// The CPU must support `avx512f`.
#[target_feature(enable = "avx512f,avx2,fma")]
pub(crate) unsafe fn fill_pair(request: &ComputeRequest, pair: usize, rows: &mut [i32]) {
    kernel::fill_pair::<F64x8>(request, pair, rows)
}
