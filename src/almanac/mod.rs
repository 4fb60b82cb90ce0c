//! Rise and set times
//!
//! The solver iterates on the UT of the event within one UTC day: each step
//! looks up the body's position at the current estimate, compares its local
//! hour angle with the hour angle at which it crosses the horizon, and moves
//! the estimate by the difference.

use crate::constants::{DEG2RAD, DEGREES_PER_HOUR, HOUR_MS, RAD2DEG};
use crate::coordinates::LatLong;
use crate::planetlib::Body;
use crate::positions::position_of;
use crate::time::{mean_sidereal_time, normalize_hours, start_of_utc_day};
use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Iteration budget for [`next_rise_set`]
pub const RISE_SET_MAX_ITERATIONS: usize = 25;
/// Convergence threshold on the UT correction, in hours (about 30 seconds)
pub const RISE_SET_TOLERANCE_HOURS: f64 = 0.008;

// Below this cos(lat)·cos(dec) the hour angle is undefined
const POLE_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiseSetIndicator {
    Rise,
    Set,
}

impl RiseSetIndicator {
    fn sign(&self) -> f64 {
        match self {
            RiseSetIndicator::Rise => 1.0,
            RiseSetIndicator::Set => -1.0,
        }
    }
}

/// Why a body has no rise or set on the day in question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HorizonClass {
    /// Above the horizon all day
    Circumpolar,
    /// Below the horizon all day
    NeverRises,
}

impl std::fmt::Display for HorizonClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HorizonClass::Circumpolar => f.write_str("circumpolar"),
            HorizonClass::NeverRises => f.write_str("never rises"),
        }
    }
}

/// Result of a rise/set query
///
/// "There is no event" and "the solver gave up" are kept apart so callers
/// can tell a circumpolar Sun from a numerical failure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RiseSetOutcome {
    Converged(DateTime<Utc>),
    NoEventInRange(HorizonClass),
    FailedToConverge,
}

impl RiseSetOutcome {
    /// The event time, if there is one
    pub fn time(&self) -> Option<DateTime<Utc>> {
        match self {
            RiseSetOutcome::Converged(t) => Some(*t),
            _ => None,
        }
    }
}

fn cos_hour_angle(altitude: f64, latitude: f64, declination: f64) -> (f64, f64) {
    let sin_alt = (altitude * DEG2RAD).sin();
    let (lat, dec) = (latitude * DEG2RAD, declination * DEG2RAD);
    let numerator = sin_alt - lat.sin() * dec.sin();
    let denominator = lat.cos() * dec.cos();
    (numerator, denominator)
}

/// Classifies a declination that never crosses the given altitude
///
/// Returns `None` when the body does cross it, i.e. when [`hour_angle`] is
/// meaningful. All angles in degrees.
pub fn horizon_class(altitude: f64, latitude: f64, declination: f64) -> Option<HorizonClass> {
    let (numerator, denominator) = cos_hour_angle(altitude, latitude, declination);
    if denominator.abs() < POLE_EPSILON {
        // At the pole every body keeps a constant altitude
        return Some(if numerator < 0.0 {
            HorizonClass::Circumpolar
        } else {
            HorizonClass::NeverRises
        });
    }

    let cos_h = numerator / denominator;
    if cos_h < -1.0 {
        Some(HorizonClass::Circumpolar)
    } else if cos_h > 1.0 {
        Some(HorizonClass::NeverRises)
    } else {
        None
    }
}

/// Hour angle, in degrees from the meridian, at which a body of the given
/// declination reaches `altitude` as seen from `latitude`
///
/// `cos H = (sin alt − sin lat · sin dec) / (cos lat · cos dec)`. The cosine is
/// clamped, so circumpolar bodies give 180° and bodies that never rise give 0°.
pub fn hour_angle(altitude: f64, latitude: f64, declination: f64) -> f64 {
    let (numerator, denominator) = cos_hour_angle(altitude, latitude, declination);
    let cos_h = if denominator.abs() < POLE_EPSILON {
        if numerator < 0.0 {
            -1.0
        } else {
            1.0
        }
    } else {
        numerator / denominator
    };
    cos_h.clamp(-1.0, 1.0).acos() * RAD2DEG
}

/// `ut` hours into the day starting at `day_start`, if representable
fn at_ut(day_start: &DateTime<Utc>, ut: f64) -> Option<DateTime<Utc>> {
    day_start.checked_add_signed(Duration::milliseconds((ut * HOUR_MS as f64).round() as i64))
}

/// Next rise or set of `body` as seen from `location`, at or after `now`
///
/// The event is solved for on the UTC day containing `now`; if it falls
/// before `now` the following day's event is returned instead.
pub fn next_rise_set(
    body: Body,
    now: &DateTime<Utc>,
    location: &LatLong,
    indicator: RiseSetIndicator,
) -> RiseSetOutcome {
    let day_start = start_of_utc_day(now);
    let altitude = body.horizon_correction();
    let sign = indicator.sign();

    let mut ut = 12.0;
    let mut delta = f64::INFINITY;
    let mut iterations = 0;

    while delta.abs() > RISE_SET_TOLERANCE_HOURS && iterations < RISE_SET_MAX_ITERATIONS {
        let Some(instant) = at_ut(&day_start, ut) else {
            warn!(
                "{:?} of {} abandoned: {:.3} h after {} is out of range",
                indicator, body, ut, day_start
            );
            return RiseSetOutcome::FailedToConverge;
        };
        let radec = match position_of(body, &instant) {
            Ok(radec) => radec,
            Err(e) => {
                warn!("{:?} of {} abandoned: {}", indicator, body, e);
                return RiseSetOutcome::FailedToConverge;
            }
        };

        if let Some(class) = horizon_class(altitude, location.latitude(), radec.dec) {
            debug!("{} is {} at {}", body, class, location);
            return RiseSetOutcome::NoEventInRange(class);
        }

        let greenwich_hour_angle = mean_sidereal_time(&instant, 0.0) - radec.ra;
        let h = hour_angle(altitude, location.latitude(), radec.dec);
        let correction =
            (greenwich_hour_angle + location.longitude() + sign * h) / DEGREES_PER_HOUR;
        // Shortest way round the day
        delta = (correction + 12.0).rem_euclid(24.0) - 12.0;
        ut = normalize_hours(ut - delta);
        iterations += 1;
    }

    if delta.abs() > RISE_SET_TOLERANCE_HOURS {
        warn!(
            "{:?} of {} did not converge after {} iterations (last step {:.4} h)",
            indicator, body, iterations, delta
        );
        return RiseSetOutcome::FailedToConverge;
    }
    debug!(
        "{:?} of {} converged in {} iterations at {:.3} h UT",
        indicator, body, iterations, ut
    );

    let event = at_ut(&day_start, ut).and_then(|event| {
        if event < *now {
            event.checked_add_signed(Duration::days(1))
        } else {
            Some(event)
        }
    });
    match event {
        Some(event) => RiseSetOutcome::Converged(event),
        None => {
            warn!("{:?} of {} falls after the last representable instant", indicator, body);
            RiseSetOutcome::FailedToConverge
        }
    }
}
