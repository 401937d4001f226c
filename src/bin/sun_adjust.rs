//! Sun drift correction for burn programs
//!
//! Reads a G-code program (a file or stdin), rewrites every X/Y move for the
//! drift of the sun expected when the machine gets there, and writes the
//! result to a file or stdout. A run summary goes to stderr.
//!
//! Usage:
//!   cargo run --bin sun_adjust -- drawing.g -o drawing_sun.g --start 14:00
//!   cargo run --bin sun_adjust -- --drift --location palo-alto

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use log::info;
use solarplot::config::LocationPreset;
use solarplot::solar::drift_table;
use solarplot::time::{format_duration, FixedClock, SystemClock};
use solarplot::{
    init_logging, Clock, ClockReading, Config, InputUnits, Location, OffsetSource, Rewriter,
    SolarTracker, TimeOfDay,
};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Length of the drift table, in seconds
const DRIFT_DURATION_S: f64 = 20.0 * 60.0;
const DRIFT_STEP_S: f64 = 60.0;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Corrects a G-code burn program for the movement of the sun",
    long_about = None
)]
struct Args {
    /// Program to rewrite (stdin when omitted)
    input: Option<PathBuf>,

    /// Where to write the rewritten program (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use a known site instead of the configured one
    #[arg(short, long, value_enum)]
    location: Option<LocationPreset>,

    /// Site latitude in degrees, north positive
    #[arg(long, requires = "longitude", allow_hyphen_values = true)]
    latitude: Option<f64>,

    /// Site longitude in degrees, east positive
    #[arg(long, requires = "latitude", allow_hyphen_values = true)]
    longitude: Option<f64>,

    /// Height of the magnifying glass above the board, in meters
    #[arg(long)]
    height: Option<f64>,

    /// Linear unit of the program
    #[arg(short, long, value_enum)]
    units: Option<InputUnits>,

    /// Time of day the job starts, HH:MM or HH:MM:SS (default: now)
    #[arg(short, long)]
    start: Option<TimeOfDay>,

    /// Day of the year the job runs, 0 for January 1st (default: today)
    #[arg(short, long)]
    day: Option<u32>,

    /// Print the drift over the next twenty minutes instead of rewriting
    #[arg(long, action = ArgAction::SetTrue)]
    drift: bool,

    /// Log every move
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(preset) = self.location {
            config.location = preset.location();
        }
        if let (Some(latitude), Some(longitude)) = (self.latitude, self.longitude) {
            config.location =
                Location::from_degrees(latitude, longitude, config.location.mounting_height_m);
        }
        if let Some(height) = self.height {
            config.location.mounting_height_m = height;
        }
        if let Some(units) = self.units {
            config.units = units;
        }

        config.validate()?;
        Ok(config)
    }

    /// The wall clock, pinned to whatever `--start` and `--day` fix
    fn clock(&self) -> Box<dyn Clock> {
        if self.start.is_none() && self.day.is_none() {
            return Box::new(SystemClock);
        }
        let now = SystemClock.now();
        Box::new(FixedClock(ClockReading::new(
            self.start.unwrap_or(now.time_of_day),
            self.day.unwrap_or(now.day_of_year),
        )))
    }
}

fn print_drift(tracker: &SolarTracker, config: &Config, start: TimeOfDay) {
    let units = config.units;
    let table = drift_table(tracker, start.as_f64(), DRIFT_DURATION_S, DRIFT_STEP_S);

    println!("Drift from {} ({:?})", start, units);
    for sample in table {
        let time = format_duration(start.as_f64() + sample.elapsed);
        match sample.offset {
            Some(offset) => println!(
                "{}  {:>10.4} {:>10.4}",
                time,
                units.from_meters(offset.x),
                units.from_meters(offset.y)
            ),
            None => println!("{}  unavailable", time),
        }
    }
}

fn rewrite<S: OffsetSource>(args: &Args, source: S, config: &Config, start: TimeOfDay) -> Result<()> {
    let rewriter = Rewriter::from_config(source, config, start);

    let summary = match (&args.input, &args.output) {
        (Some(input), Some(output)) => rewriter.run(
            BufReader::new(File::open(input)?),
            BufWriter::new(File::create(output)?),
        )?,
        (Some(input), None) => rewriter.run(BufReader::new(File::open(input)?), io::stdout().lock())?,
        (None, Some(output)) => rewriter.run(io::stdin().lock(), BufWriter::new(File::create(output)?))?,
        (None, None) => rewriter.run(io::stdin().lock(), io::stdout().lock())?,
    };

    eprintln!("{}", summary);
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = args.config()?;
    let reading = args.clock().now();
    info!(
        "site {:.3}, {:.3} at {:.2} m, start {} on day {}",
        config.location.latitude_deg,
        config.location.longitude_deg,
        config.location.mounting_height_m,
        reading.time_of_day,
        reading.day_of_year
    );

    let tracker = SolarTracker::establish(&config.location, reading)?;

    if args.drift {
        print_drift(&tracker, &config, reading.time_of_day);
        return Ok(());
    }
    rewrite(&args, tracker, &config, reading.time_of_day)
}
