//! Constants module for the solar tracking model and machine units

use std::f64::consts::PI;

// Astronomical distances
/// Mean Earth-Sun distance in meters
pub const EARTH_SUN_DISTANCE_M: f64 = 149_597_887.5 * 1000.0;
/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371.0 * 1000.0;

// Time constants
/// Seconds in a day
pub const DAY_S: f64 = 86_400.0;
/// Seconds in a day, as an integer
pub const DAY_SECONDS: i64 = 86_400;
/// Days per year used by the seasonal inclination model
pub const YEAR_DAYS: f64 = 365.0;
/// Day of the (0-indexed) year of the winter solstice, counted back into December
pub const WINTER_SOLSTICE_DAY: f64 = -9.0;

// Angles
/// Degrees to radians conversion factor
pub const DEG2RAD: f64 = PI / 180.0;
/// Tau (2*PI) for full circle
pub const TAU: f64 = 2.0 * PI;

/// Tilt of the Earth's axis, the sun's maximum inclination above the equator
pub const EARTH_INCLINATION: f64 = 23.4 * DEG2RAD;

// Machine units
/// Inches to meters
pub const INCH_TO_METER: f64 = 0.0254;
/// Millimeters to meters
pub const MM_TO_METER: f64 = 0.001;
/// Inches per minute to meters per second
pub const IPM_TO_MPS: f64 = INCH_TO_METER / 60.0;
/// Default rapid traverse (G0) speed in inches per minute
pub const RAPID_IPM: f64 = 60.0;
/// Default rapid traverse (G0) speed in meters per second
pub const RAPID_MPS: f64 = RAPID_IPM * IPM_TO_MPS;

/// Distance from the magnifying glass to the work surface in meters
pub const MOUNTING_HEIGHT_M: f64 = 0.40;
