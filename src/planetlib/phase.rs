//! Phase, illumination and apparent brightness
//!
//! Planet phases come from the Sun–planet–Earth triangle. The Moon uses its
//! elongation from the Sun instead, which is accurate to about a percent.

use super::moon::lunar_position;
use super::Body;
use crate::constants::{DEG2RAD, LUNAR_CYCLE_DAYS, RAD2DEG};
use crate::positions::{geocentric_vector, heliocentric_position};
use crate::{Result, SkyframeError};
use chrono::{DateTime, Duration, Utc};
use log::trace;

/// `time + offset`, or `TimeOutOfRange` past the last representable instant
fn offset_time(time: &DateTime<Utc>, offset: Duration) -> Result<DateTime<Utc>> {
    time.checked_add_signed(offset)
        .ok_or_else(|| SkyframeError::TimeOutOfRange(format!("{} after {}", offset, time)))
}

/// Angle between the geocentric directions of the Moon and the Sun, in degrees
///
/// 0° at new moon, close to 180° at full moon.
pub fn moon_elongation(time: &DateTime<Utc>) -> Result<f64> {
    let sun = geocentric_vector(Body::Sun, time)?;
    let moon = lunar_position(time).to_geocentric();
    Ok(sun.angular_distance(&moon) * RAD2DEG)
}

/// Phase angle of `body` in degrees: the Sun–body–Earth angle
///
/// 0° means the lit hemisphere faces the Earth. The Sun is always 0°.
pub fn phase_angle(body: Body, time: &DateTime<Utc>) -> Result<f64> {
    match body {
        Body::Sun => Ok(0.0),
        Body::Earth => Err(SkyframeError::InvalidInput(
            "the Earth has no phase as seen from itself".to_string(),
        )),
        Body::Moon => Ok(180.0 - moon_elongation(time)?),
        _ => {
            let triangle = SunBodyEarth::at(body, time)?;
            Ok(triangle.phase_angle())
        }
    }
}

/// Fraction of the visible disk that is lit, in percent
pub fn percent_illuminated(body: Body, time: &DateTime<Utc>) -> Result<f64> {
    let phase = phase_angle(body, time)?;
    Ok(50.0 * (1.0 + (phase * DEG2RAD).cos()))
}

/// Apparent visual magnitude of `body`
///
/// The Sun and Moon get fixed nominal values. Saturn's rings are not modelled.
pub fn magnitude(body: Body, time: &DateTime<Utc>) -> Result<f64> {
    let base: fn(f64) -> f64 = match body {
        Body::Sun => return Ok(-27.0),
        Body::Moon => return Ok(-10.0),
        Body::Earth => {
            return Err(SkyframeError::InvalidInput(
                "the Earth has no apparent magnitude".to_string(),
            ))
        }
        Body::Mercury => |p| -0.42 + (3.80 - (2.73 - 2.00 * p) * p) * p,
        Body::Venus => |p| -4.40 + (0.09 + (2.39 - 0.65 * p) * p) * p,
        Body::Mars => |p| -1.52 + 1.6 * p,
        Body::Jupiter => |p| -9.40 + 0.5 * p,
        Body::Saturn => |_| -8.75,
        Body::Uranus => |_| -7.19,
        Body::Neptune => |_| -6.87,
        Body::Pluto => |_| -1.0,
    };

    let triangle = SunBodyEarth::at(body, time)?;
    // Phase angle in units of 100°
    let p = triangle.phase_angle() / 100.0;
    let mag = base(p) + 5.0 * (triangle.sun_distance * triangle.earth_distance).log10();
    trace!("{} magnitude {:.2} at phase {:.1}°", body, mag, p * 100.0);
    Ok(mag)
}

/// Image resource name for the Moon's current phase, `moon0` (new) to `moon7`
///
/// Crescent, quarter and gibbous images come in waxing (1-3) and waning (5-7)
/// variants, told apart by whether the elongation grows over the next day.
pub fn lunar_phase_image(time: &DateTime<Utc>) -> Result<&'static str> {
    let elongation = moon_elongation(time)?;
    if elongation < 22.5 {
        return Ok("moon0");
    }
    if elongation > 150.0 {
        return Ok("moon4");
    }

    let waxing = moon_elongation(&offset_time(time, Duration::days(1))?)? > elongation;
    let image = match (elongation, waxing) {
        (e, true) if e < 67.5 => "moon1",
        (e, true) if e < 112.5 => "moon2",
        (_, true) => "moon3",
        (e, false) if e < 67.5 => "moon7",
        (e, false) if e < 112.5 => "moon6",
        (_, false) => "moon5",
    };
    Ok(image)
}

/// Estimated instant of the next full moon after `time`
///
/// Treats the Moon as moving uniformly through a 29.53 day synodic cycle, so
/// the estimate is good to about a day.
pub fn next_full_moon(time: &DateTime<Utc>) -> Result<DateTime<Utc>> {
    let elongation = moon_elongation(time)?;
    let waxing = moon_elongation(&offset_time(time, Duration::hours(1))?)? > elongation;

    // Position in the synodic cycle: 0° new, 180° full
    let cycle_angle = if waxing {
        elongation
    } else {
        360.0 - elongation
    };
    let days = (180.0 - cycle_angle).rem_euclid(360.0) / 360.0 * LUNAR_CYCLE_DAYS;
    let millis = (days * 86_400_000.0).round() as i64;
    offset_time(time, Duration::milliseconds(millis))
}

/// Distances of the Sun–body–Earth triangle, in AU
struct SunBodyEarth {
    /// Sun to body
    sun_distance: f64,
    /// Earth to body
    earth_distance: f64,
    /// Sun to Earth
    earth_orbit: f64,
}

impl SunBodyEarth {
    fn at(body: Body, time: &DateTime<Utc>) -> Result<Self> {
        let planet = heliocentric_position(body, time)?;
        let earth = heliocentric_position(Body::Earth, time)?;
        Ok(SunBodyEarth {
            sun_distance: planet.length(),
            earth_distance: (planet - earth).length(),
            earth_orbit: earth.length(),
        })
    }

    /// Angle at the body, in degrees
    fn phase_angle(&self) -> f64 {
        let d = self.earth_distance;
        let r = self.sun_distance;
        let cos = (d * d + r * r - self.earth_orbit * self.earth_orbit) / (2.0 * d * r);
        cos.clamp(-1.0, 1.0).acos() * RAD2DEG
    }
}
