//! Time module for the run clock
//!
//! The rewrite engine only needs two things from the host clock: the number
//! of seconds since local midnight and the day of the year. They are read
//! once, through the [`Clock`] trait, at the start of a run.

use crate::constants::DAY_SECONDS;
use chrono::{Datelike, Local, Timelike};
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for time operations
#[derive(Debug, Error)]
pub enum TimeError {
    #[error("Invalid time format: {0}")]
    InvalidFormat(String),

    #[error("Time out of range: {0}")]
    OutOfRange(String),
}

/// Result type for time operations
pub type Result<T> = std::result::Result<T, TimeError>;

lazy_static! {
    /// `HH:MM` or `HH:MM:SS`
    static ref TIME_OF_DAY: Regex =
        Regex::new(r"^\s*(\d{1,2}):(\d{2})(?::(\d{2}))?\s*$").expect("time pattern is valid");
}

/// Whole seconds since local midnight, always in `[0, 86400)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeOfDay(u32);

impl TimeOfDay {
    /// Wraps any second count into a single day
    ///
    /// Negative values wrap forward by whole days, so `-1` is `23:59:59`.
    pub fn from_seconds(seconds: i64) -> Self {
        TimeOfDay(seconds.rem_euclid(DAY_SECONDS) as u32)
    }

    /// Builds a time from hours, minutes and seconds
    pub fn from_hms(hours: u32, minutes: u32, seconds: u32) -> Result<Self> {
        if hours >= 24 || minutes >= 60 || seconds >= 60 {
            return Err(TimeError::OutOfRange(format!(
                "{:02}:{:02}:{:02}",
                hours, minutes, seconds
            )));
        }
        Ok(TimeOfDay(hours * 3600 + minutes * 60 + seconds))
    }

    /// Seconds since midnight
    pub fn seconds(&self) -> u32 {
        self.0
    }

    /// Seconds since midnight as a float, for the geometry model
    pub fn as_f64(&self) -> f64 {
        f64::from(self.0)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_duration(self.as_f64()))
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self> {
        let caps = TIME_OF_DAY
            .captures(s)
            .ok_or_else(|| TimeError::InvalidFormat(s.to_string()))?;

        let field = |index: usize| -> Result<u32> {
            match caps.get(index) {
                Some(m) => m
                    .as_str()
                    .parse()
                    .map_err(|_| TimeError::InvalidFormat(s.to_string())),
                None => Ok(0),
            }
        };

        TimeOfDay::from_hms(field(1)?, field(2)?, field(3)?)
    }
}

/// Formats a span of seconds as `HH:MM:SS`
///
/// Fractional seconds are truncated. Hours are not wrapped, so a job that
/// runs past a day reads `25:00:00`.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total / 60) % 60;
    let secs = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// What the host clock reports at the start of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockReading {
    pub time_of_day: TimeOfDay,
    /// Day of the year, 0-indexed (January 1st is day 0)
    pub day_of_year: u32,
}

impl ClockReading {
    pub fn new(time_of_day: TimeOfDay, day_of_year: u32) -> Self {
        Self {
            time_of_day,
            day_of_year,
        }
    }

    /// Reads the wall clock fields of any chrono date-time
    pub fn from_datetime<T: Datelike + Timelike>(datetime: &T) -> Self {
        Self {
            time_of_day: TimeOfDay::from_seconds(i64::from(datetime.num_seconds_from_midnight())),
            day_of_year: datetime.ordinal0(),
        }
    }
}

/// Source of "now" for a run
pub trait Clock {
    fn now(&self) -> ClockReading;
}

/// The host's local wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> ClockReading {
        ClockReading::from_datetime(&Local::now())
    }
}

/// A clock pinned to one reading, for reproducible runs
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub ClockReading);

impl Clock for FixedClock {
    fn now(&self) -> ClockReading {
        self.0
    }
}
