//! Solar geometry model
//!
//! A deliberately simple model of where the sun is: the Earth spins once per
//! 86400 seconds and the sun's inclination above the equator follows a cosine
//! over a 365-day year with its minimum at the winter solstice. There is no
//! equation of time, no leap-year handling and no time zone correction; the
//! drift between two instants a few hours apart is what matters here, and the
//! model is good enough for that.
//!
//! All positions are in the Earth-centered frame described in
//! [`crate::coordinates::cartesian`].

use crate::constants::{
    DAY_S, EARTH_INCLINATION, EARTH_SUN_DISTANCE_M, TAU, WINTER_SOLSTICE_DAY, YEAR_DAYS,
};
use crate::coordinates::Cartesian3;
use std::f64::consts::PI;

pub mod frame;
pub mod offset;

pub use frame::{initial_frame, BoardFrame};
pub use offset::{drift_table, offset, DriftSample, OffsetSource, SolarTracker};

/// Sun inclination above the equator on a given day
///
/// `day_of_year` is 0-indexed. The sun is lowest at the winter solstice,
/// taken as day -9 (December 22nd), so the inclination is
/// `-cos(2π·(day - (-9))/365) · max_inclination`.
pub fn sun_inclination(max_inclination: f64, day_of_year: f64) -> f64 {
    let days_from_solstice = day_of_year - WINTER_SOLSTICE_DAY;
    let radians_from_solstice = days_from_solstice / YEAR_DAYS * TAU;

    // Negated because the count starts at the solstice, where the sun is lowest
    -radians_from_solstice.cos() * max_inclination
}

/// Sun position in meters, Earth-centered
///
/// The sun sits opposite the observer's meridian at local midnight and moves
/// westward (toward negative longitude) as the day advances.
pub fn sun_position(longitude: f64, seconds_since_midnight: f64, day_of_year: u32) -> Cartesian3 {
    let radians_since_midnight = -seconds_since_midnight / DAY_S * TAU;
    let inclination = sun_inclination(EARTH_INCLINATION, f64::from(day_of_year));

    Cartesian3::from_polar(
        EARTH_SUN_DISTANCE_M,
        longitude + PI + radians_since_midnight,
        inclination,
    )
}
