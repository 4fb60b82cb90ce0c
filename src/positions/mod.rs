//! Geocentric positions of solar system bodies
//!
//! Planet positions are the difference of two heliocentric vectors (the
//! planet's and the Earth's) rotated from the ecliptic into the equatorial
//! frame. The Sun has no elements of its own: it is seen in the direction
//! opposite to the Earth's heliocentric vector. The Moon is handled by its own
//! lunar theory.

use crate::celestial::CelestialObject;
use crate::coordinates::{Cartesian3, RaDec};
use crate::framelib::inertial::{ecliptic_to_equatorial, InertialFrame};
use crate::planetlib::{moon, Body};
use crate::time::julian_centuries;
use crate::{Result, SkyframeError};
use chrono::{DateTime, Utc};

/// Heliocentric ecliptic position of `body` in AU
///
/// The Sun sits at the origin. The Moon has no heliocentric orbit in this
/// model and returns [`SkyframeError::NoOrbitalElements`].
pub fn heliocentric_position(body: Body, time: &DateTime<Utc>) -> Result<Cartesian3> {
    heliocentric_at_centuries(body, julian_centuries(time))
}

fn heliocentric_at_centuries(body: Body, centuries: f64) -> Result<Cartesian3> {
    match body {
        Body::Sun => Ok(Cartesian3::zero()),
        _ => body.orbital_elements_at_centuries(centuries)?.heliocentric(),
    }
}

/// Geocentric equatorial vector from the Earth to `body` in AU
///
/// Defined for the Sun and the planets.
pub fn geocentric_vector(body: Body, time: &DateTime<Utc>) -> Result<Cartesian3> {
    let centuries = julian_centuries(time);
    let earth = heliocentric_at_centuries(Body::Earth, centuries)?;
    let target = match body {
        Body::Earth => {
            return Err(SkyframeError::InvalidInput(
                "the Earth has no geocentric direction".to_string(),
            ))
        }
        Body::Moon => return Err(SkyframeError::NoOrbitalElements(Body::Moon)),
        _ => heliocentric_at_centuries(body, centuries)?,
    };
    Ok(ecliptic_to_equatorial(&(target - earth)))
}

/// Geocentric right ascension and declination of `body` at `time`
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use skyframe::positions::position_of;
/// use skyframe::Body;
///
/// // Close to the March equinox the Sun sits near RA 0, Dec 0
/// let t = Utc.with_ymd_and_hms(2010, 3, 20, 17, 32, 0).unwrap();
/// let sun = position_of(Body::Sun, &t).unwrap();
/// assert!(sun.dec.abs() < 0.1);
/// ```
pub fn position_of(body: Body, time: &DateTime<Utc>) -> Result<RaDec> {
    match body {
        Body::Moon => Ok(moon::lunar_position(time)),
        _ => Ok(RaDec::from_cartesian(geocentric_vector(body, time)?)),
    }
}

impl CelestialObject for Body {
    fn position_at(&self, time: &DateTime<Utc>) -> Result<RaDec> {
        position_of(*self, time)
    }
}
