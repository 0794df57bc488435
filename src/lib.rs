#![cfg_attr(
    all(
        any(target_arch = "x86", target_arch = "x86_64"),
        rustc_channel = "nightly",
        not(avx512_stable)
    ),
    feature(avx512_target_feature, stdarch_x86_avx512)
)]

//! Mandelbrot escape-iteration counts on SIMD lanes.
//!
//! The crate evaluates `z <- z^2 + c` over a rectangular grid of `f64`
//! points and writes one `i32` per pixel: the number of steps taken before
//! `|z|^2 > 4`, capped at a maximum. Three kernels share the same arithmetic
//! and produce identical buffers:
//!
//! - AVX-512F, 8 lanes
//! - AVX2 with FMA, 4 lanes
//! - portable scalar, 1 lane
//!
//! The best one is picked at runtime by [`Backend::detect`].
//!
//! Rows are processed two at a time. A [`ComputeRequest`] selects which row
//! pairs a call fills, so independent workers can each take an interleaved
//! band of the same buffer. [`IterationsFrame`] wraps that into serial,
//! banded, rayon-parallel and mirrored drivers over a [`MandelbrotRegion`].
//!
//! # Example
//!
//! ```rust
//! use simdbrot::{Backend, IterationsFrame, MandelbrotRegion};
//!
//! let mut frame = IterationsFrame::new(300, 200).unwrap();
//! let report = frame
//!     .calculate_parallel(Backend::detect(), &MandelbrotRegion::default(), 100)
//!     .unwrap();
//!
//! println!("{report}");
//! println!("{:?}", frame.info());
//! ```

pub mod error;
pub mod frame;
pub mod info;
pub mod reference;
pub mod region;
pub mod request;
pub mod simd;

pub use error::{MandelbrotError, Result};
pub use frame::{CalculationReport, IterationsFrame};
pub use info::IterationsInfo;
pub use region::{CenterAndZoom, MandelbrotRegion};
pub use request::ComputeRequest;
pub use simd::Backend;
