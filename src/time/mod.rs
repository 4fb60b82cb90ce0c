//! Time module for astronomical time calculations
//!
//! Instants are `chrono::DateTime<Utc>` throughout. This module converts them
//! to the quantities the rest of the crate needs: Julian Day, Julian centuries
//! since J2000.0, and mean sidereal time.
//!
//! The Julian Day formula used here is the compact one valid for Gregorian
//! dates from 1900 through 2099. Outside that range it keeps returning a
//! number but drifts by whole days per century, which is in line with the
//! accuracy of the orbital model that consumes it.

pub mod clock;

pub use clock::{Clock, FixedClock, SystemClock, TimeTravelClock, TravelSpeed};

use crate::constants::{
    DAY_H, GMST_AT_J2000_DEG, GMST_RATE_DEG_PER_DAY, J2000, JULIAN_CENTURY_DAYS,
    JULIAN_DAY_OFFSET,
};
use crate::{Result, SkyframeError};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};

/// Julian Day of a UTC instant
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use skyframe::time::julian_day;
///
/// let j2000 = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
/// assert_eq!(julian_day(&j2000), 2451545.0);
/// ```
pub fn julian_day(instant: &DateTime<Utc>) -> f64 {
    let year = instant.year() as f64;
    let month = instant.month() as f64;
    let day = instant.day() as f64;

    367.0 * year - (7.0 * (year + ((month + 9.0) / 12.0).floor()) / 4.0).floor()
        + (275.0 * month / 9.0).floor()
        + day
        + JULIAN_DAY_OFFSET
        + ut_hours(instant) / DAY_H
}

/// Julian centuries elapsed since J2000.0
pub fn julian_centuries(instant: &DateTime<Utc>) -> f64 {
    (julian_day(instant) - J2000) / JULIAN_CENTURY_DAYS
}

/// Local mean sidereal time in degrees, in [0, 360)
///
/// Pass a longitude of 0 for Greenwich mean sidereal time.
pub fn mean_sidereal_time(instant: &DateTime<Utc>, longitude: f64) -> f64 {
    let delta = julian_day(instant) - J2000;
    (GMST_AT_J2000_DEG + GMST_RATE_DEG_PER_DAY * delta + longitude).rem_euclid(360.0)
}

/// Hours since the start of the UTC day, including fractional seconds
pub fn ut_hours(instant: &DateTime<Utc>) -> f64 {
    instant.hour() as f64
        + instant.minute() as f64 / 60.0
        + (instant.second() as f64 + instant.nanosecond() as f64 * 1e-9) / 3600.0
}

/// Past chrono's ±262,000 years, and small enough for the integer algorithm
const MAX_JULIAN_DAY: f64 = 1e9;

/// Converts a Julian Day back to a UTC instant
///
/// Uses the Gregorian calendar algorithm from the Explanatory Supplement to
/// the Astronomical Almanac, so it is valid well outside 1900-2099.
pub fn gregorian_date(jd: f64) -> Result<DateTime<Utc>> {
    let out_of_range = || SkyframeError::TimeOutOfRange(format!("Julian Day {}", jd));
    if !jd.is_finite() || jd.abs() >= MAX_JULIAN_DAY {
        return Err(out_of_range());
    }

    let shifted = jd + 0.5;
    let day_number = shifted.floor();
    let day_fraction = shifted - day_number;
    let (year, month, day) = calendar_date(day_number as i64);

    let midnight = NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(out_of_range)?;
    let millis = (day_fraction * 86_400_000.0).round() as i64;

    midnight
        .and_utc()
        .checked_add_signed(Duration::milliseconds(millis))
        .ok_or_else(out_of_range)
}

fn calendar_date(jd: i64) -> (i64, i64, i64) {
    // Explanatory Supplement 15.11, Gregorian calendar
    let f = jd + 1401 + (4 * jd + 274_277) / 146_097 * 3 / 4 - 38;
    let e = 4 * f + 3;
    let g = (e % 1461) / 4;
    let h = 5 * g + 2;
    let day = (h % 153) / 5 + 1;
    let month = (h / 153 + 2) % 12 + 1;
    let year = e / 1461 - 4716 + (12 + 2 - month) / 12;
    (year, month, day)
}

/// Wraps an hour value into [0, 24)
pub fn normalize_hours(hours: f64) -> f64 {
    hours.rem_euclid(DAY_H)
}

/// Splits fractional hours into whole (hours, minutes, seconds)
///
/// The input is first wrapped into [0, 24).
pub fn clock_time_from_hours(hours: f64) -> (u32, u32, u32) {
    let hours = normalize_hours(hours);
    let whole_hours = hours.floor();
    let minutes = (hours - whole_hours) * 60.0;
    let whole_minutes = minutes.floor();
    let seconds = ((minutes - whole_minutes) * 60.0).floor();
    (whole_hours as u32, whole_minutes as u32, seconds as u32)
}

/// Converts milliseconds since the Unix epoch to a UTC instant
pub fn datetime_from_millis(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| SkyframeError::TimeOutOfRange(format!("{} ms since epoch", millis)))
}

/// Midnight at the start of the UTC day containing `instant`
pub fn start_of_utc_day(instant: &DateTime<Utc>) -> DateTime<Utc> {
    instant.date_naive().and_time(chrono::NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;
    use rstest::rstest;

    #[test]
    fn test_julian_date() {
        let date = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        assert_relative_eq!(julian_day(&date), J2000, epsilon = 1e-3);
        assert_relative_eq!(julian_centuries(&date), 0.0, epsilon = 1e-9);
    }

    #[rstest]
    // Values from the USNO Julian Date converter
    #[case(2009, 3, 20, 12, 7, 24, 2_454_911.005_139)]
    #[case(1957, 10, 4, 19, 26, 24, 2_436_116.31)]
    #[case(2024, 2, 29, 0, 0, 0, 2_460_369.5)]
    #[case(1900, 3, 1, 0, 0, 0, 2_415_079.5)]
    fn test_known_julian_days(
        #[case] year: i32,
        #[case] month: u32,
        #[case] day: u32,
        #[case] hour: u32,
        #[case] minute: u32,
        #[case] second: u32,
        #[case] expected: f64,
    ) {
        let t = Utc
            .with_ymd_and_hms(year, month, day, hour, minute, second)
            .unwrap();
        assert_relative_eq!(julian_day(&t), expected, epsilon = 1e-5);
    }

    #[test]
    fn test_sub_second_precision() {
        let t = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap() + Duration::milliseconds(500);
        assert_relative_eq!(julian_day(&t) - J2000, 0.5 / 86_400.0, epsilon = 1e-10);
    }

    #[test]
    fn test_mean_sidereal_time() {
        // RA 0 crosses the Greenwich meridian at this instant
        let t = Utc.with_ymd_and_hms(2009, 3, 20, 12, 7, 24).unwrap();
        let gmst = mean_sidereal_time(&t, 0.0);
        let off_zero = gmst.min(360.0 - gmst);
        assert!(off_zero < 0.1, "gmst = {}", gmst);

        assert_relative_eq!(mean_sidereal_time(&t, 90.0), 90.0, epsilon = 0.1);
        let west = mean_sidereal_time(&t, -90.0);
        assert_relative_eq!(west, 270.0, epsilon = 0.1);
    }

    #[test]
    fn test_sidereal_time_range() {
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        for hours in 0..200 {
            let t = start + Duration::hours(hours * 7);
            for lon in [-180.0, -45.5, 0.0, 123.0, 180.0] {
                let lst = mean_sidereal_time(&t, lon);
                assert!((0.0..360.0).contains(&lst));
            }
        }
    }

    #[rstest]
    #[case(2000, 1, 1, 12, 0, 0)]
    #[case(2009, 3, 20, 12, 7, 24)]
    #[case(1999, 12, 31, 23, 59, 59)]
    #[case(2052, 7, 4, 6, 30, 0)]
    fn test_gregorian_date_roundtrip(
        #[case] year: i32,
        #[case] month: u32,
        #[case] day: u32,
        #[case] hour: u32,
        #[case] minute: u32,
        #[case] second: u32,
    ) {
        let t = Utc
            .with_ymd_and_hms(year, month, day, hour, minute, second)
            .unwrap();
        let back = gregorian_date(julian_day(&t)).unwrap();
        assert!((back - t).num_milliseconds().abs() <= 1, "{} != {}", back, t);
    }

    #[rstest]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    #[case(1e12)]
    #[case(1e19)]
    #[case(-1e19)]
    #[case(f64::MAX)]
    fn test_gregorian_date_out_of_range(#[case] jd: f64) {
        assert!(matches!(
            gregorian_date(jd),
            Err(SkyframeError::TimeOutOfRange(_))
        ));
    }

    #[test]
    fn test_normalize_hours() {
        assert_relative_eq!(normalize_hours(25.5), 1.5);
        assert_relative_eq!(normalize_hours(-1.0), 23.0);
        assert_relative_eq!(normalize_hours(0.0), 0.0);
    }

    #[test]
    fn test_clock_time_from_hours() {
        assert_eq!(clock_time_from_hours(13.5), (13, 30, 0));
        assert_eq!(clock_time_from_hours(1.0 + 2.0 / 60.0 + 3.5 / 3600.0), (1, 2, 3));
        assert_eq!(clock_time_from_hours(-0.5), (23, 30, 0));
    }

    #[test]
    fn test_datetime_from_millis() {
        let t = datetime_from_millis(946_728_000_000).unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap());
        assert!(datetime_from_millis(i64::MAX).is_err());
    }

    #[test]
    fn test_start_of_utc_day() {
        let t = Utc.with_ymd_and_hms(2010, 3, 21, 17, 45, 12).unwrap();
        assert_eq!(
            start_of_utc_day(&t),
            Utc.with_ymd_and_hms(2010, 3, 21, 0, 0, 0).unwrap()
        );
    }
}
