//! Command line front end for the scanning pipeline.
//!
//! `scandoc detect` prints the found corners as JSON, `scandoc rectify`
//! flattens a page (optionally with a filter), `scandoc filter` applies a
//! filter in place of the full pipeline.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use image::ImageReader;
use nalgebra::Point2;

use scandoc::scan::{detect_page, from_core_image, scan_page, to_core_image};
use scandoc::{apply_filter, CornerSource, DetectParams, FilterKind, Quad};

#[derive(Parser)]
#[command(name = "scandoc", version, about = "Document scanner: detect, rectify, filter")]
struct Cli {
    /// Increase log verbosity (-v: debug, -vv: trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Find the document boundary and print its corners as JSON.
    Detect {
        /// Input photo.
        input: PathBuf,
        #[command(flatten)]
        tuning: Tuning,
    },
    /// Rectify a page to an axis-aligned image.
    Rectify {
        /// Input photo.
        input: PathBuf,
        /// Output image path.
        output: PathBuf,
        /// Corners as x0,y0,x1,y1,x2,y2,x3,y3 (detected when omitted).
        #[arg(long, value_delimiter = ',', num_args = 8)]
        corners: Option<Vec<f32>>,
        /// Post-processing filter.
        #[arg(long, default_value = "identity", value_parser = parse_filter)]
        filter: FilterKind,
        #[command(flatten)]
        tuning: Tuning,
    },
    /// Apply a filter without detection or rectification.
    Filter {
        /// Input image.
        input: PathBuf,
        /// Output image path.
        output: PathBuf,
        /// Filter to apply.
        #[arg(value_parser = parse_filter)]
        kind: FilterKind,
    },
}

#[derive(Args)]
struct Tuning {
    /// Canny low threshold.
    #[arg(long)]
    low: Option<f32>,
    /// Canny high threshold.
    #[arg(long)]
    high: Option<f32>,
}

impl Tuning {
    fn params(&self) -> DetectParams {
        let mut p = DetectParams::default();
        if let Some(low) = self.low {
            p.low_threshold = low;
        }
        if let Some(high) = self.high {
            p.high_threshold = high;
        }
        p
    }
}

fn parse_filter(s: &str) -> Result<FilterKind, String> {
    match s {
        "identity" => Ok(FilterKind::Identity),
        "grayscale" => Ok(FilterKind::Grayscale),
        "binarize" => Ok(FilterKind::Binarize),
        "enhance" => Ok(FilterKind::Enhance),
        other => Err(format!(
            "unknown filter '{other}' (expected identity, grayscale, binarize or enhance)"
        )),
    }
}

fn corners_from_flat(values: &[f32]) -> Result<Quad, Box<dyn std::error::Error>> {
    let pts = [
        Point2::new(values[0], values[1]),
        Point2::new(values[2], values[3]),
        Point2::new(values[4], values[5]),
        Point2::new(values[6], values[7]),
    ];
    Ok(Quad::new(scandoc::core::order_corners(pts))?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    scandoc::core::init_with_level(level)?;

    match cli.command {
        Command::Detect { input, tuning } => {
            let img = ImageReader::open(&input)?.decode()?;
            match detect_page(&img, &tuning.params())? {
                Some(quad) => println!("{}", serde_json::to_string_pretty(quad.corners())?),
                None => println!("no document detected"),
            }
        }
        Command::Rectify {
            input,
            output,
            corners,
            filter,
            tuning,
        } => {
            let img = ImageReader::open(&input)?.decode()?;
            let corners = match corners {
                Some(flat) => Some(CornerSource::UserAdjusted(corners_from_flat(&flat)?)),
                None => None,
            };
            let scanned = scan_page(&img, corners, filter, &tuning.params())?;
            log::info!(
                "rectified to {}x{} (corners {})",
                scanned.page.width(),
                scanned.page.height(),
                match scanned.source {
                    Some(CornerSource::Detected(_)) => "detected",
                    Some(CornerSource::UserAdjusted(_)) => "user-supplied",
                    None => "full frame",
                }
            );
            scanned.page.save(&output)?;
        }
        Command::Filter {
            input,
            output,
            kind,
        } => {
            let img = ImageReader::open(&input)?.decode()?;
            let out = apply_filter(&to_core_image(&img), kind);
            from_core_image(&out).save(&output)?;
        }
    }

    Ok(())
}
