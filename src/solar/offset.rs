//! Drift of the burn spot relative to the board frame

use super::{sun_position, BoardFrame};
use crate::config::Location;
use crate::time::ClockReading;
use crate::Result;
use log::info;
use nalgebra::Vector2;

/// Where the sun's focus lands at a later instant, in board coordinates
///
/// The line from the glass toward the sun's new position is intersected with
/// the initial board plane; the result is measured from the board origin
/// along the board's X and Y axes, in meters.
///
/// Returns `None` when no offset exists at this instant: the sun direction
/// is undefined or the rays run parallel to the board.
pub fn offset(
    frame: &BoardFrame,
    longitude: f64,
    seconds_since_midnight: f64,
    day_of_year: u32,
) -> Option<Vector2<f64>> {
    let sun = sun_position(longitude, seconds_since_midnight, day_of_year);
    let to_sun = (sun - frame.magnifier).normalize()?;

    frame.plane().project_line(frame.magnifier, to_sun)
}

/// Something that can say how far the burn spot has drifted at a given time
pub trait OffsetSource {
    /// Offset in meters at `seconds_since_midnight`, or `None` if unavailable
    fn offset_at(&self, seconds_since_midnight: f64) -> Option<Vector2<f64>>;
}

/// Offset source backed by the solar model for one site and day
#[derive(Debug, Clone, Copy)]
pub struct SolarTracker {
    pub frame: BoardFrame,
    pub longitude: f64,
    pub day_of_year: u32,
}

impl SolarTracker {
    /// Establishes the board frame for `location` at the clock reading
    pub fn establish(location: &Location, start: ClockReading) -> Result<Self> {
        let frame = super::initial_frame(
            location.longitude(),
            location.latitude(),
            start.time_of_day.as_f64(),
            start.day_of_year,
            location.mounting_height_m,
        )?;
        info!(
            "board frame established at {} on day {}, origin {}",
            start.time_of_day, start.day_of_year, frame.origin
        );

        Ok(Self {
            frame,
            longitude: location.longitude(),
            day_of_year: start.day_of_year,
        })
    }
}

impl OffsetSource for SolarTracker {
    fn offset_at(&self, seconds_since_midnight: f64) -> Option<Vector2<f64>> {
        offset(
            &self.frame,
            self.longitude,
            seconds_since_midnight,
            self.day_of_year,
        )
    }
}

/// One row of a drift table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftSample {
    /// Seconds since the start of the table
    pub elapsed: f64,
    pub offset: Option<Vector2<f64>>,
}

/// Samples the drift every `step_s` seconds for `duration_s` seconds
///
/// The first sample is at `start_s` itself; the last one is the final step
/// strictly before `start_s + duration_s`.
pub fn drift_table<S: OffsetSource>(
    source: &S,
    start_s: f64,
    duration_s: f64,
    step_s: f64,
) -> Vec<DriftSample> {
    if !(step_s > 0.0) || !(duration_s > 0.0) {
        return Vec::new();
    }

    let count = (duration_s / step_s).ceil() as usize;
    (0..count)
        .map(|i| {
            let elapsed = i as f64 * step_s;
            DriftSample {
                elapsed,
                offset: source.offset_at(start_s + elapsed),
            }
        })
        .collect()
}
