//! # Cartesian Coordinate Module
//!
//! A 3D Cartesian vector used for every spatial quantity in the tracking
//! model: the magnifier position, the sun position and the board's basis
//! vectors.
//!
//! ## Coordinate System Convention
//!
//! Positions live in an Earth-centered frame measured in meters:
//! - **X-axis**: Through the equator at longitude 0
//! - **Y-axis**: Through the equator at longitude +90°
//! - **Z-axis**: Through the north pole
//!
//! ## Examples
//!
//! ```rust
//! use solarplot::coordinates::cartesian::Cartesian3;
//!
//! let east = Cartesian3::new(1.0, 0.0, 0.0);
//! let north = Cartesian3::new(0.0, 0.0, 1.0);
//!
//! assert_eq!(east.dot(&north), 0.0);
//! assert!(Cartesian3::new(0.0, 0.0, 0.0).normalize().is_none());
//! ```

use nalgebra::Vector3;

/// Three-dimensional Cartesian vector
///
/// Represents either a position (meters from the Earth's center) or a
/// direction. The interpretation depends on context; unit vectors produced
/// by [`Cartesian3::normalize`] have a length of 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cartesian3 {
    /// X-component (toward longitude 0 on the equator)
    pub x: f64,
    /// Y-component (toward longitude +90° on the equator)
    pub y: f64,
    /// Z-component (toward the north pole)
    pub z: f64,
}

impl Cartesian3 {
    /// Creates a new Cartesian vector
    ///
    /// # Examples
    ///
    /// ```rust
    /// use solarplot::coordinates::cartesian::Cartesian3;
    ///
    /// let v = Cartesian3::new(1.0, 2.0, 3.0);
    /// assert_eq!(v.y, 2.0);
    /// ```
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Cartesian3 { x, y, z }
    }

    /// The zero vector
    pub fn zero() -> Self {
        Cartesian3::new(0.0, 0.0, 0.0)
    }

    /// Creates a Cartesian vector from polar coordinates
    ///
    /// # Arguments
    ///
    /// * `radius` - Distance from the origin
    /// * `longitude` - Angle around the Z axis in radians, measured from +X
    /// * `latitude` - Angle above the XY plane in radians
    ///
    /// # Mathematical Conversion
    ///
    /// - `x = radius * cos(longitude) * cos(latitude)`
    /// - `y = radius * sin(longitude) * cos(latitude)`
    /// - `z = radius * sin(latitude)`
    ///
    /// # Examples
    ///
    /// ```rust
    /// use solarplot::coordinates::cartesian::Cartesian3;
    /// use std::f64::consts::PI;
    ///
    /// let pole = Cartesian3::from_polar(2.0, 0.0, PI / 2.0);
    /// assert!(pole.x.abs() < 1e-15);
    /// assert!((pole.z - 2.0).abs() < 1e-15);
    /// ```
    pub fn from_polar(radius: f64, longitude: f64, latitude: f64) -> Self {
        let cos_lat = latitude.cos();
        Cartesian3 {
            x: radius * longitude.cos() * cos_lat,
            y: radius * longitude.sin() * cos_lat,
            z: radius * latitude.sin(),
        }
    }

    /// Euclidean length, `sqrt(dot(self, self))`
    ///
    /// ```rust
    /// use solarplot::coordinates::cartesian::Cartesian3;
    ///
    /// assert_eq!(Cartesian3::new(3.0, 4.0, 0.0).length(), 5.0);
    /// ```
    pub fn length(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Returns a unit vector in the same direction
    ///
    /// Returns `None` when the length is exactly zero. This is an expected
    /// outcome for degenerate geometry, not a fault; callers decide what a
    /// missing direction means for them.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use solarplot::coordinates::cartesian::Cartesian3;
    ///
    /// let unit = Cartesian3::new(3.0, 4.0, 0.0).normalize().unwrap();
    /// assert!((unit.x - 0.6).abs() < 1e-12);
    /// assert!((unit.y - 0.8).abs() < 1e-12);
    /// ```
    pub fn normalize(&self) -> Option<Cartesian3> {
        let length = self.length();
        if length == 0.0 {
            None
        } else {
            Some(*self * (1.0 / length))
        }
    }

    /// Dot product, `x₁*x₂ + y₁*y₂ + z₁*z₂`
    pub fn dot(&self, other: &Cartesian3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Right-handed cross product
    ///
    /// ```text
    /// cross = (y₁*z₂ - z₁*y₂, z₁*x₂ - x₁*z₂, x₁*y₂ - y₁*x₂)
    /// ```
    ///
    /// ```rust
    /// use solarplot::coordinates::cartesian::Cartesian3;
    ///
    /// let x = Cartesian3::new(1.0, 0.0, 0.0);
    /// let y = Cartesian3::new(0.0, 1.0, 0.0);
    /// assert_eq!(x.cross(&y), Cartesian3::new(0.0, 0.0, 1.0));
    /// ```
    pub fn cross(&self, other: &Cartesian3) -> Cartesian3 {
        Cartesian3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Converts to nalgebra Vector3 for linear algebra operations
    pub fn to_vector3(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Creates from nalgebra Vector3
    pub fn from_vector3(vec: Vector3<f64>) -> Self {
        Cartesian3 {
            x: vec.x,
            y: vec.y,
            z: vec.z,
        }
    }
}

impl std::fmt::Display for Cartesian3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4}, {:.4})", self.x, self.y, self.z)
    }
}

// Arithmetic operations for convenience
impl std::ops::Add for Cartesian3 {
    type Output = Cartesian3;

    fn add(self, other: Cartesian3) -> Cartesian3 {
        Cartesian3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl std::ops::Sub for Cartesian3 {
    type Output = Cartesian3;

    fn sub(self, other: Cartesian3) -> Cartesian3 {
        Cartesian3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl std::ops::Mul<f64> for Cartesian3 {
    type Output = Cartesian3;

    fn mul(self, scalar: f64) -> Cartesian3 {
        Cartesian3 {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}

impl std::ops::Mul<Cartesian3> for f64 {
    type Output = Cartesian3;

    fn mul(self, vector: Cartesian3) -> Cartesian3 {
        vector * self
    }
}
