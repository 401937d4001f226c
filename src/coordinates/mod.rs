//! Vector math for the tracking model

pub mod cartesian;
pub mod plane;

pub use cartesian::Cartesian3;
pub use plane::{project_line_onto_plane, Plane};
