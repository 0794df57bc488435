use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use simdbrot::simd::scalar::escape_count;
use simdbrot::{Backend, ComputeRequest};

fn calculate(backend: Backend, request: &ComputeRequest) -> Vec<i32> {
    let mut iterations = vec![-1; request.row_size * request.num_rows];
    backend.calculate(request, &mut iterations).unwrap();
    iterations
}

fn random_request(rng: &mut StdRng) -> ComputeRequest {
    let row_size = rng.random_range(1..=67);
    let num_rows = rng.random_range(1..=23);
    let x0 = rng.random_range(-2.5..0.5);
    let y0 = rng.random_range(-1.5..0.5);
    let delta_x = rng.random_range(0.001..0.1);
    let delta_y = rng.random_range(0.001..0.1);
    let max_iterations = rng.random_range(1..=300);

    ComputeRequest::full_frame(x0, y0, delta_x, delta_y, row_size, num_rows, max_iterations)
}

#[test]
fn test_backends_agree_on_random_grids() {
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..200 {
        let request = random_request(&mut rng);
        let expected = calculate(Backend::Scalar, &request);

        for backend in Backend::supported() {
            assert_eq!(
                calculate(backend, &request),
                expected,
                "{backend} disagrees with scalar on {request:?}"
            );
        }
    }
}

#[test]
fn test_backends_agree_on_every_tail_length() {
    // widths 1..=17 cover every remainder of 4 and 8 lanes
    for row_size in 1..=17 {
        for num_rows in 1..=5 {
            let request =
                ComputeRequest::full_frame(-2.1, -1.2, 0.173, 0.41, row_size, num_rows, 80);
            let expected = calculate(Backend::Scalar, &request);

            for backend in Backend::supported() {
                assert_eq!(calculate(backend, &request), expected, "{backend} {row_size}x{num_rows}");
            }
        }
    }
}

#[test]
fn test_repeated_calls_are_identical() {
    let request = ComputeRequest::full_frame(-0.8, 0.05, 0.0007, 0.0007, 131, 37, 1000);

    for backend in Backend::supported() {
        let first = calculate(backend, &request);
        let mut second = first.clone();
        backend.calculate(&request, &mut second).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_matches_point_by_point_scalar() {
    let request = ComputeRequest::full_frame(-1.9, -0.9, 0.031, 0.029, 41, 9, 150);

    for backend in Backend::supported() {
        let iterations = calculate(backend, &request);

        for row in 0..request.num_rows {
            for column in 0..request.row_size {
                assert_eq!(
                    iterations[row * request.row_size + column],
                    escape_count(request.column_x(column), request.row_y(row), 150),
                    "{backend} at ({column}, {row})"
                );
            }
        }
    }
}

#[test]
fn test_larger_buffer_keeps_its_tail() {
    let request = ComputeRequest::full_frame(-2.0, -1.0, 0.1, 0.1, 10, 5, 20);

    for backend in Backend::supported() {
        let mut iterations = vec![-7; 60];
        backend.calculate(&request, &mut iterations).unwrap();
        assert!(iterations[..50].iter().all(|&n| (0..=20).contains(&n)));
        assert!(iterations[50..].iter().all(|&n| n == -7));
    }
}
