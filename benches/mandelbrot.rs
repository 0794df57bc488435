//! Escape-Iteration Benchmarks across Backends and Drivers
//!
//! Measures how fast each kernel fills a frame, and how the frame drivers
//! scale on top of the fastest one.
//!
//! # Benchmark Categories
//!
//! ## 1. **Backend Comparison**
//! - Scalar `f64` kernel (baseline)
//! - AVX2 + FMA kernel, 4 lanes
//! - AVX-512F kernel, 8 lanes (when compiled in and supported)
//! - `num::Complex64` reference loop, for scale
//!
//! ## 2. **Driver Comparison**
//! - Single naive call
//! - Interleaved row bands, run one after the other and concurrently
//! - Rayon row-pair parallelism
//! - Real-axis mirroring
//!
//! ## 3. **Workload Shape**
//! - `Default` region: most pixels escape fast, memory and dispatch bound
//! - `Black` region: every pixel hits the cap, pure FMA throughput

use std::hint::black_box;
use std::time::Instant;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use simdbrot::reference;
use simdbrot::{Backend, IterationsFrame, MandelbrotRegion};

// ================================================================================================
// BENCHMARK CONFIGURATION
// ================================================================================================

/// Frame sizes, 3:2 like the default region.
///
/// - **150x100**: 15k pixels, fits in L1 with room to spare
/// - **300x200**: 60k pixels, the smallest size a UI would show
/// - **900x600**: 540k pixels, a typical window
const FRAME_SIZES: &[(usize, usize)] = &[(150, 100), (300, 200), (900, 600)];

/// Regions with very different iteration profiles.
const REGIONS: &[&str] = &["Default", "Black", "Starfish"];

const MAX_ITERATIONS: i32 = 256;

// ================================================================================================
// BENCHMARK IMPLEMENTATIONS
// ================================================================================================

/// One serial frame per supported backend, plus the complex reference.
fn benchmark_backends(c: &mut Criterion) {
    for &name in REGIONS {
        let region = MandelbrotRegion::named_or_default(Some(name));

        for &(width, height) in FRAME_SIZES {
            let mut group = c.benchmark_group(format!("Backends_{name}_{width}x{height}"));
            group.throughput(Throughput::Elements((width * height) as u64));

            let mut frame = IterationsFrame::new(width, height).unwrap();

            for backend in Backend::supported() {
                group.bench_function(BenchmarkId::new(backend.name(), width * height), |b| {
                    b.iter(|| {
                        frame
                            .calculate(backend, black_box(&region), MAX_ITERATIONS)
                            .unwrap();
                        black_box(frame.iterations());
                    })
                });
            }

            // The reference is slow; keep it to the small frames
            if width * height <= 60_000 {
                let request = frame.request(&region, MAX_ITERATIONS);
                let mut iterations = vec![0; width * height];

                group.bench_function(BenchmarkId::new("Complex64", width * height), |b| {
                    b.iter(|| {
                        reference::calculate(black_box(&request), &mut iterations).unwrap();
                        black_box(&iterations);
                    })
                });
            }

            group.finish();
        }
    }
}

/// Frame drivers on top of the detected backend.
fn benchmark_drivers(c: &mut Criterion) {
    let backend = Backend::detect();
    let (width, height) = *FRAME_SIZES.last().unwrap();

    // steps of 1/256 with rows centred on the real axis, so mirroring
    // takes the fast path
    let step = 1.0 / 256.0;
    let y0 = -0.5 * (height - 1) as f64 * step;
    let region = MandelbrotRegion {
        x0: -2.25,
        y0,
        x1: -2.25 + width as f64 * step,
        y1: y0 + height as f64 * step,
    };

    let mut group = c.benchmark_group(format!("Drivers_{}_{width}x{height}", backend.name()));
    group.throughput(Throughput::Elements((width * height) as u64));

    let mut frame = IterationsFrame::new(width, height).unwrap();

    group.bench_function("naive", |b| {
        b.iter(|| frame.calculate(backend, black_box(&region), MAX_ITERATIONS).unwrap())
    });

    for bands in [2, 4, 8] {
        group.bench_with_input(BenchmarkId::new("banded", bands), &bands, |b, &bands| {
            b.iter(|| {
                frame
                    .calculate_banded(backend, black_box(&region), MAX_ITERATIONS, bands)
                    .unwrap()
            })
        });
    }

    for bands in [2, 4, 8] {
        group.bench_with_input(
            BenchmarkId::new("banded parallel", bands),
            &bands,
            |b, &bands| {
                b.iter(|| {
                    frame
                        .calculate_banded_parallel(backend, black_box(&region), MAX_ITERATIONS, bands)
                        .unwrap()
                })
            },
        );
    }

    group.bench_function("parallel", |b| {
        b.iter(|| {
            frame
                .calculate_parallel(backend, black_box(&region), MAX_ITERATIONS)
                .unwrap()
        })
    });

    group.bench_function("mirrored", |b| {
        b.iter(|| {
            frame
                .calculate_mirrored(backend, black_box(&region), MAX_ITERATIONS)
                .unwrap()
        })
    });

    group.finish();
}

/// Main benchmark orchestrator function.
fn all_benchmarks(c: &mut Criterion) {
    println!("🚀 Starting Escape-Iteration Benchmarks");
    println!(
        "   Backends: {}",
        Backend::supported()
            .iter()
            .map(|backend| backend.name())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let start_time = Instant::now();

    benchmark_backends(c);
    benchmark_drivers(c);

    let elapsed = start_time.elapsed();
    println!(
        "✅ Benchmark suite completed in {:.2} seconds",
        elapsed.as_secs_f64()
    );
}

// ================================================================================================
// CRITERION INTEGRATION
// ================================================================================================

criterion_group!(benches, all_benchmarks);
criterion_main!(benches);
