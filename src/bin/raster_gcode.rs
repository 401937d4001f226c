//! Image to burn program
//!
//! Shrinks an image to a coarse grid of gray shades and writes a serpentine
//! G-code program that crosses dark pixels slowly and light ones fast.
//!
//! Usage:
//!   cargo run --bin raster_gcode -- portrait.jpg -o portrait.g --preview small.png

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use image::GenericImageView;
use log::info;
use solarplot::init_logging;
use solarplot::raster::{self, RasterSettings, RasterStats};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Turns an image into a shaded G-code burn program",
    long_about = None
)]
struct Args {
    /// Image to burn
    image: PathBuf,

    /// Where to write the program (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Save the quantized grid, scaled back to the image size
    #[arg(short, long)]
    preview: Option<PathBuf>,

    /// Grid columns
    #[arg(long, default_value_t = 32)]
    columns: u32,

    /// Grid rows
    #[arg(long, default_value_t = 32)]
    rows: u32,

    /// Burn width in inches
    #[arg(long, default_value_t = 5.0)]
    size_x: f64,

    /// Burn height in inches
    #[arg(long, default_value_t = 5.0)]
    size_y: f64,

    /// Feed for the darkest shade, inches per minute
    #[arg(long, default_value_t = 10.0)]
    min_feed: f64,

    /// Feed for the lightest shade, inches per minute
    #[arg(long, default_value_t = 30.0)]
    max_feed: f64,

    /// Number of gray levels
    #[arg(long, default_value_t = 8)]
    shades: u32,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

impl Args {
    fn settings(&self) -> RasterSettings {
        RasterSettings {
            size_x: self.size_x,
            size_y: self.size_y,
            columns: self.columns,
            rows: self.rows,
            min_feed: self.min_feed,
            max_feed: self.max_feed,
            shades: self.shades,
            ..RasterSettings::default()
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let settings = args.settings();
    settings.validate()?;

    let image = raster::load(&args.image)?;
    let (width, height) = image.dimensions();
    info!(
        "{} is {}x{}, sampling to {}x{}",
        args.image.display(),
        width,
        height,
        settings.columns,
        settings.rows
    );

    let mut data = raster::grayscale(&image, settings.columns, settings.rows);
    raster::normalize(&mut data);
    raster::quantize(&mut data, settings.shades);

    let stats: RasterStats = match &args.output {
        Some(path) => raster::generate(&data, &settings, BufWriter::new(File::create(path)?))?,
        None => raster::generate(&data, &settings, io::stdout().lock())?,
    };

    eprintln!("Pixels: {}", stats.pixels);
    eprintln!("Moves: {}", stats.moves);
    eprintln!("Pixels per move: {:.2}", stats.pixels_per_move());

    if let Some(path) = &args.preview {
        raster::preview(&data, width, height).save(path)?;
        info!("preview written to {}", path.display());
    }
    Ok(())
}
