//! Coordinate value types: vectors, sky positions and observer locations

pub mod cartesian;
pub mod latlong;

pub use cartesian::Cartesian3;
pub use latlong::LatLong;

// Re-export the equatorial coordinate type from framelib
pub use crate::framelib::inertial::RaDec;
