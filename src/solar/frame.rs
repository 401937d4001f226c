//! The board frame: the work surface at the moment the job starts
//!
//! The table is assumed to start out facing the sun squarely. Its Z axis
//! points from the magnifying glass at the sun, its X axis is the edge that
//! stays level with the ground, and its origin is where the sun's rays focus,
//! one mounting height below the glass.

use super::sun_position;
use crate::constants::EARTH_RADIUS_M;
use crate::coordinates::{Cartesian3, Plane};
use crate::{Result, SolarplotError};
use log::debug;

/// Fixed reference frame of a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardFrame {
    /// Position of the magnifying glass
    pub magnifier: Cartesian3,
    /// Focal point on the board at the start of the run
    pub origin: Cartesian3,
    pub x_axis: Cartesian3,
    pub y_axis: Cartesian3,
    /// Board normal, pointing at the sun
    pub z_axis: Cartesian3,
}

impl BoardFrame {
    /// Builds the frame for a glass at `magnifier` looking at a sun at `sun`
    ///
    /// Fails with [`SolarplotError::GeometryUndefined`] when the sun sits on
    /// the glass, or straight above it along the Earth's radius (no level
    /// edge can be chosen then).
    pub fn facing(magnifier: Cartesian3, sun: Cartesian3, mounting_height: f64) -> Result<Self> {
        let to_sun = (sun - magnifier).normalize().ok_or_else(|| {
            SolarplotError::GeometryUndefined("magnifier coincides with the sun".to_string())
        })?;

        let z_axis = to_sun;
        let x_axis = magnifier.cross(&z_axis).normalize().ok_or_else(|| {
            SolarplotError::GeometryUndefined(
                "sun is directly overhead, board edge is undefined".to_string(),
            )
        })?;
        let y_axis = z_axis.cross(&x_axis).normalize().ok_or_else(|| {
            SolarplotError::GeometryUndefined("board Y axis is degenerate".to_string())
        })?;

        let origin = magnifier - to_sun * mounting_height;

        Ok(Self {
            magnifier,
            origin,
            x_axis,
            y_axis,
            z_axis,
        })
    }

    /// The board as a plane, for projections
    pub fn plane(&self) -> Plane {
        Plane {
            origin: self.origin,
            x_axis: self.x_axis,
            y_axis: self.y_axis,
            normal: self.z_axis,
        }
    }
}

/// Establishes the board frame for a site and instant
///
/// `longitude` and `latitude` are in radians, `mounting_height` in meters.
pub fn initial_frame(
    longitude: f64,
    latitude: f64,
    seconds_since_midnight: f64,
    day_of_year: u32,
    mounting_height: f64,
) -> Result<BoardFrame> {
    // Earth space: center at the origin, X through longitude 0, Z through the north pole
    let magnifier = Cartesian3::from_polar(EARTH_RADIUS_M, longitude, latitude);
    let sun = sun_position(longitude, seconds_since_midnight, day_of_year);
    debug!("magnifier: {}", magnifier);
    debug!("sun: {}", sun);

    BoardFrame::facing(magnifier, sun, mounting_height)
}
