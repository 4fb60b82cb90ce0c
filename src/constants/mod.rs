//! Constants module for astronomical calculations

use std::f64::consts::PI;

// Time constants
/// J2000.0 epoch as Julian date
pub const J2000: f64 = 2_451_545.0;
/// Days in a Julian century
pub const JULIAN_CENTURY_DAYS: f64 = 36_525.0;
/// Offset applied by the 1900-2099 Julian Day formula
pub const JULIAN_DAY_OFFSET: f64 = 1_721_013.5;
/// Hours in a day
pub const DAY_H: f64 = 24.0;

/// Milliseconds in a second
pub const SECOND_MS: i64 = 1_000;
/// Milliseconds in a minute
pub const MINUTE_MS: i64 = 60 * SECOND_MS;
/// Milliseconds in an hour
pub const HOUR_MS: i64 = 60 * MINUTE_MS;
/// Milliseconds in a day
pub const DAY_MS: i64 = 24 * HOUR_MS;
/// Milliseconds in a week
pub const WEEK_MS: i64 = 7 * DAY_MS;

// Sidereal time
/// Greenwich mean sidereal time at J2000.0 in degrees
pub const GMST_AT_J2000_DEG: f64 = 280.461;
/// Rate of Greenwich mean sidereal time in degrees per day
pub const GMST_RATE_DEG_PER_DAY: f64 = 360.985_647_37;

// Angles
/// Degrees to radians conversion factor
pub const DEG2RAD: f64 = PI / 180.0;
/// Radians to degrees conversion factor
pub const RAD2DEG: f64 = 180.0 / PI;
/// Tau (2*PI) for full circle
pub const TAU: f64 = 2.0 * PI;
/// Degrees of right ascension per hour
pub const DEGREES_PER_HOUR: f64 = 15.0;

// Earth
/// Mean obliquity of the ecliptic at J2000.0 in degrees
pub const OBLIQUITY_J2000_DEG: f64 = 23.439_281;

// Moon
/// Mean length of the synodic month in days
pub const LUNAR_CYCLE_DAYS: f64 = 29.53;

/// Altitude of the upper limb of the Sun or Moon at rise/set, in degrees
pub const DISK_HORIZON_CORRECTION_DEG: f64 = -0.83;
