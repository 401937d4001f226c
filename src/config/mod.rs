//! Run configuration: where the table stands and how the program measures
//!
//! Everything the rewrite consumes besides the clock lives in [`Config`]:
//! the site location and mounting height, the linear unit of the input
//! program and the rapid traverse speed. A configuration can be loaded from
//! a JSON file; any field left out takes the default, which is the Santa
//! Cruz preset with an inch-based program.
//!
//! ```json
//! {
//!   "location": { "latitude_deg": 37.442, "longitude_deg": -122.141, "mounting_height_m": 0.4 },
//!   "units": "inches",
//!   "rapid_feed_per_minute": 60.0
//! }
//! ```

use crate::constants::{
    DEG2RAD, INCH_TO_METER, MM_TO_METER, MOUNTING_HEIGHT_M, RAPID_IPM,
};
use crate::{Result, SolarplotError};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Linear unit of the input program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InputUnits {
    #[default]
    Inches,
    Millimeters,
}

impl InputUnits {
    /// Meters per one input unit
    pub fn meters_per_unit(&self) -> f64 {
        match self {
            InputUnits::Inches => INCH_TO_METER,
            InputUnits::Millimeters => MM_TO_METER,
        }
    }

    pub fn to_meters(&self, value: f64) -> f64 {
        value * self.meters_per_unit()
    }

    pub fn from_meters(&self, meters: f64) -> f64 {
        meters / self.meters_per_unit()
    }

    /// Units per minute (how F words are written) to meters per second
    pub fn feed_to_mps(&self, per_minute: f64) -> f64 {
        per_minute * self.meters_per_unit() / 60.0
    }

    pub fn feed_from_mps(&self, mps: f64) -> f64 {
        mps * 60.0 / self.meters_per_unit()
    }
}

/// Site of the plotter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    /// Distance from the magnifying glass to the work surface
    #[serde(default = "default_mounting_height")]
    pub mounting_height_m: f64,
}

fn default_mounting_height() -> f64 {
    MOUNTING_HEIGHT_M
}

impl Location {
    pub fn from_degrees(latitude_deg: f64, longitude_deg: f64, mounting_height_m: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
            mounting_height_m,
        }
    }

    /// Latitude in radians
    pub fn latitude(&self) -> f64 {
        self.latitude_deg * DEG2RAD
    }

    /// Longitude in radians, east positive
    pub fn longitude(&self) -> f64 {
        self.longitude_deg * DEG2RAD
    }
}

impl Default for Location {
    fn default() -> Self {
        LocationPreset::SantaCruz.location()
    }
}

/// Known sites
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LocationPreset {
    SanFrancisco,
    PaloAlto,
    SantaCruz,
}

impl LocationPreset {
    pub fn location(&self) -> Location {
        let (latitude, longitude) = match self {
            LocationPreset::SanFrancisco => (37.775, -122.417),
            LocationPreset::PaloAlto => (37.442, -122.141),
            LocationPreset::SantaCruz => (36.974, -122.029),
        };
        Location::from_degrees(latitude, longitude, MOUNTING_HEIGHT_M)
    }
}

/// Everything a run needs besides the clock
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub location: Location,
    pub units: InputUnits,
    /// G0 speed, in input units per minute
    pub rapid_feed_per_minute: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            location: Location::default(),
            units: InputUnits::Inches,
            rapid_feed_per_minute: RAPID_IPM,
        }
    }
}

impl Config {
    /// Loads and validates a JSON configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let config: Config = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Rapid traverse speed in meters per second
    pub fn rapid_speed_mps(&self) -> f64 {
        self.units.feed_to_mps(self.rapid_feed_per_minute)
    }

    /// Rejects values the geometry or the clock cannot work with
    pub fn validate(&self) -> Result<()> {
        let location = &self.location;
        if !(-90.0..=90.0).contains(&location.latitude_deg) {
            return Err(SolarplotError::Config(format!(
                "latitude {} is outside [-90, 90] degrees",
                location.latitude_deg
            )));
        }
        if !(-180.0..=180.0).contains(&location.longitude_deg) {
            return Err(SolarplotError::Config(format!(
                "longitude {} is outside [-180, 180] degrees",
                location.longitude_deg
            )));
        }
        if !(location.mounting_height_m > 0.0) {
            return Err(SolarplotError::Config(format!(
                "mounting height must be positive, got {} m",
                location.mounting_height_m
            )));
        }
        if !(self.rapid_feed_per_minute > 0.0) {
            return Err(SolarplotError::Config(format!(
                "rapid feed must be positive, got {}",
                self.rapid_feed_per_minute
            )));
        }
        Ok(())
    }
}
