//! Magnetic declination providers
//!
//! Declination is the angle from true North to magnetic North, in degrees,
//! positive when magnetic North lies to the east.

use crate::constants::{DAY_MS, DEG2RAD, RAD2DEG};
use crate::coordinates::LatLong;
use serde::{Deserialize, Serialize};

/// Supplies the magnetic declination at a place and time
pub trait MagneticDeclination: Send + Sync {
    /// Declination in degrees east of true North
    fn declination(&self, location: &LatLong, time_millis: i64) -> f64;
}

impl<F> MagneticDeclination for F
where
    F: Fn(&LatLong, i64) -> f64 + Send + Sync,
{
    fn declination(&self, location: &LatLong, time_millis: i64) -> f64 {
        self(location, time_millis)
    }
}

/// Treats magnetic North as true North
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroMagneticDeclination;

impl MagneticDeclination for ZeroMagneticDeclination {
    fn declination(&self, _location: &LatLong, _time_millis: i64) -> f64 {
        0.0
    }
}

/// Degree-1 (tilted dipole) terms of the IGRF-13 main field, in nT
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DipoleCoefficients {
    pub g10: f64,
    pub g11: f64,
    pub h11: f64,
}

/// IGRF-13 at epoch 2020.0
pub const IGRF13_2020: DipoleCoefficients = DipoleCoefficients {
    g10: -29_404.8,
    g11: -1_450.9,
    h11: 4_652.5,
};

/// IGRF-13 predictive secular variation, nT per year
pub const IGRF13_SECULAR_VARIATION: DipoleCoefficients = DipoleCoefficients {
    g10: 5.7,
    g11: 7.4,
    h11: -25.9,
};

/// 2020-01-01T00:00:00Z in milliseconds since the Unix epoch
pub const IGRF13_EPOCH_MS: i64 = 1_577_836_800_000;

const JULIAN_YEAR_MS: f64 = 365.25 * DAY_MS as f64;

/// Declination from the tilted-dipole part of the geomagnetic field
///
/// Only the first-degree terms are kept, so the result can be off by ten
/// degrees or more where the non-dipole field is strong. It is smooth and
/// cheap, which is what a sky map needs between location fixes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DipoleMagneticDeclination {
    pub coefficients: DipoleCoefficients,
    pub secular_variation: DipoleCoefficients,
    pub epoch_ms: i64,
}

impl Default for DipoleMagneticDeclination {
    fn default() -> Self {
        DipoleMagneticDeclination {
            coefficients: IGRF13_2020,
            secular_variation: IGRF13_SECULAR_VARIATION,
            epoch_ms: IGRF13_EPOCH_MS,
        }
    }
}

impl DipoleMagneticDeclination {
    /// Coefficients advanced linearly to `time_millis`
    pub fn coefficients_at(&self, time_millis: i64) -> DipoleCoefficients {
        let years = (time_millis as f64 - self.epoch_ms as f64) / JULIAN_YEAR_MS;
        let c = &self.coefficients;
        let sv = &self.secular_variation;
        DipoleCoefficients {
            g10: c.g10 + sv.g10 * years,
            g11: c.g11 + sv.g11 * years,
            h11: c.h11 + sv.h11 * years,
        }
    }

    /// Northward and eastward field components at the Earth's surface, in nT
    ///
    /// Uses a spherical Earth, so geographic latitude stands in for geocentric.
    pub fn horizontal_field(&self, location: &LatLong, time_millis: i64) -> (f64, f64) {
        let c = self.coefficients_at(time_millis);
        let colatitude = (90.0 - location.latitude()) * DEG2RAD;
        let longitude = location.longitude() * DEG2RAD;
        let (sin_t, cos_t) = colatitude.sin_cos();
        let (sin_p, cos_p) = longitude.sin_cos();

        let north = -c.g10 * sin_t + (c.g11 * cos_p + c.h11 * sin_p) * cos_t;
        let east = c.g11 * sin_p - c.h11 * cos_p;
        (north, east)
    }
}

impl MagneticDeclination for DipoleMagneticDeclination {
    fn declination(&self, location: &LatLong, time_millis: i64) -> f64 {
        let (north, east) = self.horizontal_field(location, time_millis);
        east.atan2(north) * RAD2DEG
    }
}

/// Selects a built-in declination provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MagneticModel {
    #[default]
    Zero,
    Dipole,
}

impl MagneticModel {
    pub fn provider(&self) -> Box<dyn MagneticDeclination> {
        match self {
            MagneticModel::Zero => Box::new(ZeroMagneticDeclination),
            MagneticModel::Dipole => Box::new(DipoleMagneticDeclination::default()),
        }
    }
}
