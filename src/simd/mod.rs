//! Kernel backends and their selection.
//!
//! Three interchangeable kernels implement the same escape-time loop:
//!
//! | Backend | Lanes | Requires |
//! |---------|-------|----------|
//! | [`Backend::Avx512`] | 8 | `avx512f`, `avx2`, `fma` |
//! | [`Backend::Fma`] | 4 | `avx2`, `fma` |
//! | [`Backend::Scalar`] | 1 | nothing |
//!
//! They differ only in throughput: every backend produces the same count for
//! every pixel. [`Backend::detect`] picks the fastest one the CPU supports,
//! once per process; any supported backend can also be chosen explicitly.
//!
//! # Example
//!
//! ```rust
//! use simdbrot::{Backend, ComputeRequest};
//!
//! let request = ComputeRequest::full_frame(-2.0, -1.0, 0.01, 0.01, 300, 200, 100);
//! let mut iterations = vec![0; 300 * 200];
//!
//! Backend::detect().calculate(&request, &mut iterations).unwrap();
//!
//! let mut scalar = vec![0; 300 * 200];
//! Backend::Scalar.calculate(&request, &mut scalar).unwrap();
//!
//! assert_eq!(iterations, scalar);
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use log::{debug, trace};

use crate::error::{buffer_error, unknown_backend, unsupported_backend, validation_error, Result};
use crate::request::ComputeRequest;

pub(crate) mod kernel;
pub mod scalar;
pub mod traits;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub mod avx2;

#[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), avx512_kernel))]
pub mod avx512;

pub use traits::EscapeLanes;

static DETECTED: OnceLock<Backend> = OnceLock::new();

/// A kernel implementation, selected by CPU capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Backend {
    /// 512-bit registers, 8 lanes.
    Avx512,
    /// 256-bit registers with fused multiply-add, 4 lanes.
    Fma,
    /// Portable scalar code, 1 lane.
    Scalar,
}

impl Backend {
    /// Every backend, best first.
    pub const ALL: [Backend; 3] = [Backend::Avx512, Backend::Fma, Backend::Scalar];

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Backend::Avx512 => "AVX-512 Double",
            Backend::Fma => "AVX2 Double",
            Backend::Scalar => "Double",
        }
    }

    /// Selection priority, lower is preferred.
    pub fn priority(self) -> u32 {
        match self {
            Backend::Avx512 => 1,
            Backend::Fma => 2,
            Backend::Scalar => 3,
        }
    }

    /// Columns evaluated per instruction.
    pub fn lanes(self) -> usize {
        match self {
            Backend::Avx512 => 8,
            Backend::Fma => 4,
            Backend::Scalar => 1,
        }
    }

    /// CPU features the backend needs, as understood by `is_x86_feature_detected!`.
    pub fn required_features(self) -> &'static [&'static str] {
        match self {
            Backend::Avx512 => &["avx512f", "avx2", "fma"],
            Backend::Fma => &["avx2", "fma"],
            Backend::Scalar => &[],
        }
    }

    /// Whether this backend is compiled in and the running CPU can execute it.
    pub fn is_supported(self) -> bool {
        match self {
            Backend::Avx512 => avx512_supported(),
            Backend::Fma => fma_supported(),
            Backend::Scalar => true,
        }
    }

    /// The best supported backend; detection runs once per process.
    pub fn detect() -> Backend {
        *DETECTED.get_or_init(|| {
            let backend = Backend::ALL
                .into_iter()
                .find(|backend| backend.is_supported())
                .unwrap_or(Backend::Scalar);

            debug!(
                "selected {} kernel ({} lanes per row)",
                backend.name(),
                backend.lanes()
            );

            backend
        })
    }

    /// Supported backends, best first.
    pub fn supported() -> Vec<Backend> {
        Backend::ALL
            .into_iter()
            .filter(|backend| backend.is_supported())
            .collect()
    }

    /// Looks a backend up by display name or short alias, case-insensitively.
    pub fn from_name(name: &str) -> Result<Backend> {
        match name.trim().to_ascii_lowercase().as_str() {
            "avx-512 double" | "avx-512" | "avx512" => Ok(Backend::Avx512),
            "avx2 double" | "avx2" | "fma" => Ok(Backend::Fma),
            "double" | "scalar" => Ok(Backend::Scalar),
            _ => Err(unknown_backend(name)),
        }
    }

    /// Fills every row `request` selects in `iterations`.
    ///
    /// The request is validated against the buffer and the backend against
    /// the CPU before anything is written; on error the buffer is untouched.
    /// A request with `num_rows == 0` succeeds without writing.
    ///
    /// # Errors
    ///
    /// - [`crate::MandelbrotError::ValidationError`] for invalid parameters
    /// - [`crate::MandelbrotError::BufferError`] when `iterations` is too short
    /// - [`crate::MandelbrotError::UnsupportedBackend`] when the CPU lacks the
    ///   backend's instructions
    pub fn calculate(self, request: &ComputeRequest, iterations: &mut [i32]) -> Result<()> {
        request.validate(iterations.len())?;
        self.ensure_supported()?;

        trace!(
            "{}: {} x {} rows from pair {} every {} pairs, max {} iterations",
            self.name(),
            request.row_size,
            request.num_rows,
            request.first_row_div2,
            request.row_delta_div2,
            request.max_iterations
        );

        match self {
            #[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), avx512_kernel))]
            // SAFETY: `ensure_supported` detected avx512f.
            Backend::Avx512 => unsafe { avx512::calculate(request, iterations) },
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            // SAFETY: `ensure_supported` detected avx2 and fma.
            Backend::Fma => unsafe { avx2::calculate(request, iterations) },
            _ => scalar::calculate(request, iterations),
        }

        Ok(())
    }

    /// Fills the rows of row pair `pair` into `rows`, which holds exactly
    /// those rows (`request.pair_span(pair)` of the whole image).
    ///
    /// Lets workers own disjoint pairs of one buffer, for instance through
    /// `chunks_mut(2 * row_size)`, and run interleaved bands concurrently.
    /// `pair` must be one of `request.row_pairs()`.
    ///
    /// # Errors
    ///
    /// - [`crate::MandelbrotError::ValidationError`] for invalid parameters
    ///   or a pair outside the request's band
    /// - [`crate::MandelbrotError::BufferError`] when `rows` is not the
    ///   pair's span
    /// - [`crate::MandelbrotError::UnsupportedBackend`] when the CPU lacks the
    ///   backend's instructions
    ///
    /// # Example
    ///
    /// ```rust
    /// use simdbrot::{Backend, ComputeRequest};
    ///
    /// let request = ComputeRequest::full_frame(-2.0, -1.0, 0.01, 0.01, 300, 200, 100);
    /// let mut iterations = vec![0; 300 * 200];
    ///
    /// let mut bands: Vec<Vec<(usize, &mut [i32])>> = vec![Vec::new(), Vec::new()];
    /// for (pair, rows) in iterations.chunks_mut(2 * 300).enumerate() {
    ///     bands[pair % 2].push((pair, rows));
    /// }
    ///
    /// std::thread::scope(|scope| {
    ///     for (band, pairs) in bands.into_iter().enumerate() {
    ///         let band_request = request.band(band, 2);
    ///         scope.spawn(move || {
    ///             for (pair, rows) in pairs {
    ///                 Backend::detect().fill_pair(&band_request, pair, rows).unwrap();
    ///             }
    ///         });
    ///     }
    /// });
    ///
    /// let mut naive = vec![0; 300 * 200];
    /// Backend::detect().calculate(&request, &mut naive).unwrap();
    /// assert_eq!(iterations, naive);
    /// ```
    pub fn fill_pair(self, request: &ComputeRequest, pair: usize, rows: &mut [i32]) -> Result<()> {
        request.validate_parameters()?;

        if !request.selects_pair(pair) {
            return Err(validation_error(format!(
                "row pair {} is not in the band starting at {} every {} pairs of {}",
                pair,
                request.first_row_div2,
                request.row_delta_div2,
                request.num_pairs()
            )));
        }

        let span = request.pair_span(pair);
        if rows.len() != span.len() {
            return Err(buffer_error(span.len(), rows.len()));
        }

        self.ensure_supported()?;

        match self {
            #[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), avx512_kernel))]
            // SAFETY: `ensure_supported` detected avx512f.
            Backend::Avx512 => unsafe { avx512::fill_pair(request, pair, rows) },
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            // SAFETY: `ensure_supported` detected avx2 and fma.
            Backend::Fma => unsafe { avx2::fill_pair(request, pair, rows) },
            _ => scalar::fill_pair(request, pair, rows),
        }

        Ok(())
    }

    pub(crate) fn ensure_supported(self) -> Result<()> {
        if self.is_supported() {
            Ok(())
        } else {
            Err(unsupported_backend(self.name()))
        }
    }
}

impl Default for Backend {
    fn default() -> Self {
        Backend::detect()
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = crate::error::MandelbrotError;

    fn from_str(s: &str) -> Result<Self> {
        Backend::from_name(s)
    }
}

#[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), avx512_kernel))]
fn avx512_supported() -> bool {
    std::is_x86_feature_detected!("avx512f") && fma_supported()
}

#[cfg(not(all(any(target_arch = "x86", target_arch = "x86_64"), avx512_kernel)))]
fn avx512_supported() -> bool {
    false
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn fma_supported() -> bool {
    std::is_x86_feature_detected!("avx2") && std::is_x86_feature_detected!("fma")
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
fn fma_supported() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MandelbrotError;

    #[test]
    fn test_scalar_always_supported() {
        assert!(Backend::Scalar.is_supported());
        assert!(Backend::supported().contains(&Backend::Scalar));
    }

    #[test]
    fn test_detect_is_best_supported() {
        let detected = Backend::detect();
        assert!(detected.is_supported());
        assert_eq!(Backend::supported()[0], detected);
        assert_eq!(Backend::detect(), detected);
    }

    #[test]
    fn test_priority_order_matches_all() {
        let priorities: Vec<u32> = Backend::ALL.iter().map(|b| b.priority()).collect();
        assert_eq!(priorities, vec![1, 2, 3]);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Backend::from_name("AVX-512 Double"), Ok(Backend::Avx512));
        assert_eq!(Backend::from_name("avx2"), Ok(Backend::Fma));
        assert_eq!(" FMA ".parse::<Backend>(), Ok(Backend::Fma));
        assert_eq!(Backend::from_name("Double"), Ok(Backend::Scalar));
        assert_eq!(
            Backend::from_name("neon"),
            Err(MandelbrotError::UnknownBackend {
                name: "neon".to_string()
            })
        );
    }

    #[test]
    fn test_display_round_trips_through_from_name() {
        for backend in Backend::ALL {
            assert_eq!(Backend::from_name(&backend.to_string()), Ok(backend));
        }
    }

    #[test]
    fn test_unsupported_backend_leaves_buffer_untouched() {
        let request = ComputeRequest::full_frame(-2.0, -1.0, 0.5, 0.5, 4, 4, 10);

        for backend in Backend::ALL.into_iter().filter(|b| !b.is_supported()) {
            let mut iterations = vec![-1; 16];
            assert_eq!(
                backend.calculate(&request, &mut iterations),
                Err(MandelbrotError::UnsupportedBackend {
                    name: backend.name()
                })
            );
            assert!(iterations.iter().all(|&n| n == -1));
        }
    }

    #[test]
    fn test_empty_request_is_noop() {
        let request = ComputeRequest::full_frame(-2.0, -1.0, 0.5, 0.5, 4, 0, 10);
        let mut iterations: Vec<i32> = Vec::new();

        for backend in Backend::supported() {
            assert!(backend.calculate(&request, &mut iterations).is_ok());
        }
    }
}
