//! A CLI tool for applying a VOI transformation
//! to a list of modality values.
use clap::Parser;
use dicom_voi::{DeviceLut, WindowLevel, voi_transform};
use snafu::{Report, ResultExt, Whatever};
use tracing::{Level, debug};

/// Exit code for any other error.
const ERROR_OTHER: i32 = -128;

/// Map modality values to display values
/// with a window level and an optional device LUT
#[derive(Debug, Parser)]
#[command(version)]
struct App {
    /// The window width
    #[arg(short = 'w', long = "width", allow_negative_numbers = true)]
    width: f64,

    /// The window center
    #[arg(short = 'c', long = "center", allow_negative_numbers = true)]
    center: f64,

    /// The device LUT entries, separated by commas
    #[arg(long = "lut", value_delimiter = ',')]
    lut: Vec<u16>,

    /// The modality value mapped to the first device LUT entry
    /// (default is 0)
    #[arg(long = "first-value-mapped", allow_negative_numbers = true)]
    first_value_mapped: Option<i32>,

    /// The modality values to transform
    #[arg(required = true, allow_negative_numbers = true)]
    values: Vec<f64>,

    /// Verbose mode
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn main() {
    run().unwrap_or_else(|e| {
        eprintln!("{}", Report::from_error(e));
        std::process::exit(ERROR_OTHER);
    });
}

fn run() -> Result<(), Whatever> {
    let App {
        width,
        center,
        lut,
        first_value_mapped,
        values,
        verbose,
    } = App::parse();

    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(if verbose { Level::DEBUG } else { Level::INFO })
            .finish(),
    )
    .unwrap_or_else(|e| {
        eprintln!("{}", snafu::Report::from_error(e));
    });

    let outputs = transform_values(width, center, lut, first_value_mapped, &values)?;
    for (value, output) in values.iter().zip(outputs) {
        println!("{}\t{}", value, output);
    }

    Ok(())
}

/// Build the VOI transformation from the command line options
/// and apply it to each of the given values.
fn transform_values(
    width: f64,
    center: f64,
    lut: Vec<u16>,
    first_value_mapped: Option<i32>,
    values: &[f64],
) -> Result<Vec<f64>, Whatever> {
    if lut.is_empty() && first_value_mapped.is_some() {
        snafu::whatever!("--first-value-mapped requires a device LUT (--lut)");
    }

    let lut = if lut.is_empty() {
        None
    } else {
        let lut = DeviceLut::new(first_value_mapped.unwrap_or(0), lut)
            .whatever_context("Could not create the device LUT")?;
        Some(lut)
    };

    let window_level = WindowLevel::new(width, center);
    let voi = voi_transform(window_level, lut.as_ref());
    debug!("Applying {:?}", voi);

    Ok(voi.map_iter(values.iter().copied()).collect())
}
