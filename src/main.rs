use std::env;
use std::process::ExitCode;

use log::{info, warn};

use simdbrot::error::validation_error;
use simdbrot::{Backend, CalculationReport, IterationsFrame, MandelbrotRegion, Result};

const USAGE: &str = "usage: simdbrot [region] [width] [height] [max_iterations]";

const DEFAULT_WIDTH: usize = 630;
const DEFAULT_HEIGHT: usize = 420;
const DEFAULT_MAX_ITERATIONS: i32 = 256;

struct Arguments {
    region_name: String,
    width: usize,
    height: usize,
    max_iterations: i32,
}

impl Arguments {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let region_name = args.next().unwrap_or_else(|| "Default".to_string());
        let width = parse_or(args.next(), "width", DEFAULT_WIDTH)?;
        let height = parse_or(args.next(), "height", DEFAULT_HEIGHT)?;
        let max_iterations = parse_or(args.next(), "max_iterations", DEFAULT_MAX_ITERATIONS)?;

        if let Some(extra) = args.next() {
            return Err(validation_error(format!("unexpected argument '{extra}'")));
        }

        Ok(Arguments {
            region_name,
            width,
            height,
            max_iterations,
        })
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, name: &str, default: T) -> Result<T> {
    match value {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| validation_error(format!("{name} must be a number, got '{value}'"))),
    }
}

fn print_report(label: &str, report: &CalculationReport, frame: &IterationsFrame) {
    let info = frame.info();
    println!("  {label:<9} {report}");
    println!(
        "            {:.1} Mpixel/s, iterations total {} min {} max {}",
        report.pixels_per_second() / 1e6,
        info.total_iterations,
        info.min_iterations,
        info.max_iterations
    );
}

// Returns whether every backend produced the same frame
fn run(arguments: &Arguments) -> Result<bool> {
    let region = match MandelbrotRegion::named(&arguments.region_name) {
        Some(region) => region,
        None => {
            warn!(
                "unknown region '{}', using Default (known: {})",
                arguments.region_name,
                MandelbrotRegion::names().collect::<Vec<_>>().join(", ")
            );
            MandelbrotRegion::default()
        }
    };

    let center = region.center_and_zoom();
    println!(
        "Region {} centred on ({}, {}) zoom {}, {}x{} pixels, max {} iterations",
        arguments.region_name,
        center.x,
        center.y,
        center.zoom_factor,
        arguments.width,
        arguments.height,
        arguments.max_iterations
    );
    println!("Selected backend: {}", Backend::detect());

    let mut expected: Option<IterationsFrame> = None;
    let mut agree = true;

    for backend in Backend::supported() {
        println!("{backend} ({} lanes)", backend.lanes());

        let mut serial = IterationsFrame::new(arguments.width, arguments.height)?;
        let report = serial.calculate(backend, &region, arguments.max_iterations)?;
        print_report("serial", &report, &serial);

        let mut parallel = IterationsFrame::new(arguments.width, arguments.height)?;
        let report = parallel.calculate_parallel(backend, &region, arguments.max_iterations)?;
        print_report("parallel", &report, &parallel);

        let mut banded = IterationsFrame::new(arguments.width, arguments.height)?;
        let bands = rayon::current_num_threads();
        let report =
            banded.calculate_banded_parallel(backend, &region, arguments.max_iterations, bands)?;
        print_report("banded", &report, &banded);

        let mut mirrored = IterationsFrame::new(arguments.width, arguments.height)?;
        let report = mirrored.calculate_mirrored(backend, &region, arguments.max_iterations)?;
        print_report("mirrored", &report, &mirrored);

        if serial != parallel || serial != banded || serial != mirrored {
            println!("  serial, parallel, banded and mirrored frames differ");
            agree = false;
        }

        if expected.as_ref().is_some_and(|expected| *expected != serial) {
            println!("  frame differs from {}", Backend::detect());
            agree = false;
        }

        if expected.is_none() {
            expected = Some(serial);
        }
    }

    info!("all backends done, agreement: {agree}");

    Ok(agree)
}

fn main() -> ExitCode {
    env_logger::init();

    let arguments = match Arguments::parse(env::args().skip(1)) {
        Ok(arguments) => arguments,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    match run(&arguments) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            eprintln!("backends disagree");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
