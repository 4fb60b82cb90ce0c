//! Geographic position of the observer

use crate::coordinates::cartesian::Cartesian3;
use crate::framelib::inertial::RaDec;
use serde::{Deserialize, Serialize};

/// Geographic latitude and longitude in degrees
///
/// Latitude is clamped to [-90, 90] and longitude is wrapped into (-180, 180]
/// on construction. The fields are private so that a `LatLong` can never hold
/// an out-of-range value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "RawLatLong", into = "RawLatLong")]
pub struct LatLong {
    latitude: f64,
    longitude: f64,
}

#[derive(Serialize, Deserialize)]
struct RawLatLong {
    latitude: f64,
    longitude: f64,
}

impl From<RawLatLong> for LatLong {
    fn from(raw: RawLatLong) -> Self {
        LatLong::new(raw.latitude, raw.longitude)
    }
}

impl From<LatLong> for RawLatLong {
    fn from(loc: LatLong) -> Self {
        RawLatLong {
            latitude: loc.latitude,
            longitude: loc.longitude,
        }
    }
}

impl LatLong {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        LatLong {
            latitude: latitude.clamp(-90.0, 90.0),
            longitude: wrap_longitude(longitude),
        }
    }

    /// Latitude in degrees, north positive
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees, east positive
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle angle to another location, in degrees
    pub fn distance_from(&self, other: &LatLong) -> f64 {
        self.to_unit_vector().distance_from(&other.to_unit_vector())
    }

    fn to_unit_vector(self) -> Cartesian3 {
        RaDec::new(self.longitude, self.latitude).to_geocentric()
    }
}

fn wrap_longitude(longitude: f64) -> f64 {
    let wrapped = (longitude + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 {
        180.0
    } else {
        wrapped
    }
}

impl std::fmt::Display for LatLong {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}°, {:.4}°)", self.latitude, self.longitude)
    }
}
