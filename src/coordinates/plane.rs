//! Line/plane intersection expressed in a plane's own 2D basis

use super::cartesian::Cartesian3;
use nalgebra::Vector2;

/// An oriented plane: an origin plus an in-plane basis and its normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub origin: Cartesian3,
    pub x_axis: Cartesian3,
    pub y_axis: Cartesian3,
    pub normal: Cartesian3,
}

impl Plane {
    /// Intersects the line through `point` along `direction` with this plane
    pub fn project_line(&self, point: Cartesian3, direction: Cartesian3) -> Option<Vector2<f64>> {
        project_line_onto_plane(
            point,
            direction,
            self.origin,
            self.x_axis,
            self.y_axis,
            self.normal,
        )
    }
}

/// Intersects the line `p + v·t` with the plane through `o` normal to `z`
///
/// The intersection must satisfy both
///
/// ```text
/// q = p + v·t
/// dot(q - o, z) = 0
/// ```
///
/// which gives `t = -dot(p - o, z) / dot(v, z)`. The intersection is then
/// returned relative to `o` in the `(x, y)` basis.
///
/// Returns `None` when the line is parallel to the plane (`dot(v, z) == 0`).
///
/// # Examples
///
/// ```rust
/// use solarplot::coordinates::cartesian::Cartesian3;
/// use solarplot::coordinates::plane::project_line_onto_plane;
///
/// let x = Cartesian3::new(1.0, 0.0, 0.0);
/// let y = Cartesian3::new(0.0, 1.0, 0.0);
/// let z = Cartesian3::new(0.0, 0.0, 1.0);
///
/// // Straight down onto the XY plane from (2, 3, 5)
/// let hit = project_line_onto_plane(
///     Cartesian3::new(2.0, 3.0, 5.0),
///     Cartesian3::new(0.0, 0.0, -1.0),
///     Cartesian3::zero(),
///     x,
///     y,
///     z,
/// )
/// .unwrap();
/// assert_eq!((hit.x, hit.y), (2.0, 3.0));
/// ```
pub fn project_line_onto_plane(
    p: Cartesian3,
    v: Cartesian3,
    o: Cartesian3,
    x: Cartesian3,
    y: Cartesian3,
    z: Cartesian3,
) -> Option<Vector2<f64>> {
    let dot_vz = v.dot(&z);
    if dot_vz == 0.0 {
        return None;
    }

    let t = -(p - o).dot(&z) / dot_vz;
    let q = p + v * t;

    let dq = q - o;
    Some(Vector2::new(dq.dot(&x), dq.dot(&y)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn xy_plane(origin: Cartesian3) -> Plane {
        Plane {
            origin,
            x_axis: Cartesian3::new(1.0, 0.0, 0.0),
            y_axis: Cartesian3::new(0.0, 1.0, 0.0),
            normal: Cartesian3::new(0.0, 0.0, 1.0),
        }
    }

    #[test]
    fn test_perpendicular_line_hits_foot_point() {
        let plane = xy_plane(Cartesian3::new(1.0, 1.0, 0.0));
        let hit = plane
            .project_line(Cartesian3::new(4.0, -2.0, 3.0), Cartesian3::new(0.0, 0.0, 1.0))
            .unwrap();
        assert_abs_diff_eq!(hit.x, 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(hit.y, -3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_oblique_line() {
        // From (0, 0, 2) heading along (1, 0, -1) lands at x = 2
        let plane = xy_plane(Cartesian3::zero());
        let hit = plane
            .project_line(Cartesian3::new(0.0, 0.0, 2.0), Cartesian3::new(1.0, 0.0, -1.0))
            .unwrap();
        assert_abs_diff_eq!(hit.x, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(hit.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_parallel_line_has_no_intersection() {
        let plane = xy_plane(Cartesian3::zero());
        let hit = plane.project_line(Cartesian3::new(0.0, 0.0, 2.0), Cartesian3::new(1.0, 1.0, 0.0));
        assert!(hit.is_none());
    }

    #[test]
    fn test_point_already_on_plane() {
        let plane = xy_plane(Cartesian3::new(0.0, 0.0, -1.0));
        let hit = plane
            .project_line(Cartesian3::new(0.5, 0.25, -1.0), Cartesian3::new(0.3, 0.1, 0.9))
            .unwrap();
        assert_abs_diff_eq!(hit.x, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(hit.y, 0.25, epsilon = 1e-12);
    }
}
