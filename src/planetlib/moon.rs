//! Low-precision geocentric position of the Moon
//!
//! A truncated lunar theory (six longitude terms, four latitude terms) from the
//! Astronomical Almanac's low-precision formulae. Good to a few tenths of a
//! degree for several decades either side of J2000.0; parallax is ignored, so
//! the result is geocentric rather than topocentric.

use crate::constants::{DEG2RAD, RAD2DEG};
use crate::coordinates::RaDec;
use crate::time::julian_centuries;
use chrono::{DateTime, Utc};

/// (amplitude, phase, rate) in degrees and degrees per Julian century
type Term = (f64, f64, f64);

const LONGITUDE_TERMS: [Term; 6] = [
    (6.29, 135.0, 477_198.87),
    (-1.27, 259.3, -413_335.36),
    (0.66, 235.7, 890_534.22),
    (0.21, 269.9, 954_397.74),
    (-0.19, 357.5, 35_999.05),
    (-0.11, 186.5, 966_404.03),
];

const LATITUDE_TERMS: [Term; 4] = [
    (5.13, 93.3, 483_202.02),
    (0.28, 228.2, 960_400.89),
    (-0.28, 318.3, 6_003.15),
    (-0.17, 217.6, -407_332.21),
];

// cos and sin of the obliquity as tabulated with the series
const COS_OBLIQUITY: f64 = 0.9175;
const SIN_OBLIQUITY: f64 = 0.3978;

fn periodic_sum(terms: &[Term], t: f64) -> f64 {
    terms
        .iter()
        .map(|(amplitude, phase, rate)| amplitude * ((phase + rate * t) * DEG2RAD).sin())
        .sum()
}

/// Ecliptic longitude and latitude of the Moon in degrees
pub fn lunar_ecliptic(time: &DateTime<Utc>) -> (f64, f64) {
    let t = julian_centuries(time);
    let lambda = 218.32 + 481_267.881 * t + periodic_sum(&LONGITUDE_TERMS, t);
    let beta = periodic_sum(&LATITUDE_TERMS, t);
    (lambda.rem_euclid(360.0), beta)
}

/// Geocentric right ascension and declination of the Moon
pub fn lunar_position(time: &DateTime<Utc>) -> RaDec {
    let (lambda, beta) = lunar_ecliptic(time);
    let (sin_l, cos_l) = (lambda * DEG2RAD).sin_cos();
    let (sin_b, cos_b) = (beta * DEG2RAD).sin_cos();

    let l = cos_b * cos_l;
    let m = COS_OBLIQUITY * cos_b * sin_l - SIN_OBLIQUITY * sin_b;
    let n = SIN_OBLIQUITY * cos_b * sin_l + COS_OBLIQUITY * sin_b;

    RaDec::new(m.atan2(l) * RAD2DEG, n.clamp(-1.0, 1.0).asin() * RAD2DEG)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn assert_near(radec: RaDec, expected: RaDec, tolerance: f64) {
        let dra = (radec.ra - expected.ra).abs();
        let dra = dra.min(360.0 - dra);
        let ddec = (radec.dec - expected.dec).abs();
        assert!(
            dra < tolerance && ddec < tolerance,
            "{} differs from {} by ({:.3}°, {:.3}°)",
            radec,
            expected,
            dra,
            ddec
        );
    }

    #[test]
    fn test_lunar_positions() {
        let cases = [
            ((2020, 10, 12), RaDec::from_hms_dms(9.0, 4.0, 15.0, 20.0, 2.0, 36.0)),
            ((2009, 2, 11), RaDec::from_hms_dms(10.0, 44.0, 47.0, 4.0, 24.0, 29.0)),
            ((2005, 4, 11), RaDec::from_hms_dms(2.0, 52.0, 10.0, 18.0, 2.0, 40.0)),
        ];
        for ((y, m, d), expected) in cases {
            let t = Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap();
            // Topocentric reference values, so allow for parallax
            assert_near(lunar_position(&t), expected, 1.6);
        }
    }

    #[test]
    fn test_latitude_stays_near_ecliptic() {
        let start = Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap();
        for day in 0..60 {
            let t = start + chrono::Duration::days(day);
            let (lambda, beta) = lunar_ecliptic(&t);
            assert!((0.0..360.0).contains(&lambda));
            assert!(beta.abs() < 5.9);
        }
    }

    #[test]
    fn test_moon_moves_about_13_degrees_a_day() {
        let t = Utc.with_ymd_and_hms(2012, 6, 1, 0, 0, 0).unwrap();
        let a = lunar_position(&t);
        let b = lunar_position(&(t + chrono::Duration::days(1)));
        let moved = a.distance_from(&b);
        assert!(moved > 10.0 && moved < 16.0, "moved {}", moved);
    }
}
