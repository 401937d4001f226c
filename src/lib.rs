//! Solarplot: sun-tracking correction for magnifying-glass burn programs
//!
//! A magnifying glass mounted over an XY table focuses sunlight into a burn
//! spot. As the sun moves across the sky the spot drifts across the board.
//! This crate rewrites a G-code program offline so every programmed point is
//! nudged by the drift expected at the moment the machine reaches it.
//!
//! The pieces, leaves first:
//! - [`coordinates`]: vector math and line/plane projection
//! - [`solar`]: sun position, the initial board frame and the drift offset
//! - [`gcode`]: the streaming lexer and rewrite engine
//! - [`raster`]: turns an image into a burn program
//! - [`config`] and [`time`]: the location, units and clock the run consumes

use thiserror::Error;

pub mod config;
pub mod constants;
pub mod coordinates;
pub mod gcode;
pub mod raster;
pub mod solar;
pub mod time;

// Re-export commonly used types
pub use config::{Config, InputUnits, Location};
pub use coordinates::Cartesian3;
pub use gcode::{Rewriter, RunSummary};
pub use solar::{BoardFrame, OffsetSource, SolarTracker};
pub use time::{Clock, ClockReading, TimeOfDay};

/// Main error type for the solarplot library
#[derive(Debug, Error)]
pub enum SolarplotError {
    #[error("Geometry undefined: {0}")]
    GeometryUndefined(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Time(#[from] time::TimeError),

    #[error(transparent)]
    Gcode(#[from] gcode::GcodeError),
}

/// Result type for solarplot operations
pub type Result<T> = std::result::Result<T, SolarplotError>;

/// Installs the stderr logging subscriber used by the command line tools
///
/// The filter defaults to `info` and honours `RUST_LOG`. Records emitted
/// through the `log` macros in this crate are forwarded to the subscriber.
pub fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second call (e.g. from tests) leaves the first subscriber in place
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
