use super::rotation::{rotation_matrix, transform};
use crate::constants::{DEG2RAD, OBLIQUITY_J2000_DEG, RAD2DEG};
use crate::coordinates::cartesian::Cartesian3;
use crate::coordinates::latlong::LatLong;
use lazy_static::lazy_static;
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

lazy_static! {
    // Rotation about the equinox direction by the obliquity
    static ref EC_TO_EQ: Matrix3<f64> =
        rotation_matrix(OBLIQUITY_J2000_DEG, &Cartesian3::unit_x());
    static ref EQ_TO_EC: Matrix3<f64> = EC_TO_EQ.transpose();
}

// Marker trait for inertial coordinate systems
pub trait InertialFrame: Sized {
    fn to_cartesian(&self) -> Cartesian3;
    fn from_cartesian(cart: Cartesian3) -> Self;

    /// Angle between two positions in radians
    fn angle_between(&self, other: &Self) -> f64 {
        self.to_cartesian().angular_distance(&other.to_cartesian())
    }
}

/// Equatorial coordinates, both angles in degrees
///
/// `ra` is kept in [0, 360) and `dec` in [-90, 90].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RaDec {
    /// Right ascension in degrees
    pub ra: f64,
    /// Declination in degrees
    pub dec: f64,
}

impl RaDec {
    pub fn new(ra: f64, dec: f64) -> Self {
        RaDec {
            ra: ra.rem_euclid(360.0),
            dec: dec.clamp(-90.0, 90.0),
        }
    }

    /// Builds a position from sexagesimal right ascension (hours, minutes,
    /// seconds) and declination (degrees, arcminutes, arcseconds).
    ///
    /// The declination sign comes from the degrees field, so `-0.0` degrees
    /// yields a southern declination.
    pub fn from_hms_dms(
        ra_hours: f64,
        ra_minutes: f64,
        ra_seconds: f64,
        dec_degrees: f64,
        dec_minutes: f64,
        dec_seconds: f64,
    ) -> Self {
        let ra = 15.0 * (ra_hours + ra_minutes / 60.0 + ra_seconds / 3600.0);
        let sign = if dec_degrees.is_sign_negative() { -1.0 } else { 1.0 };
        let dec = sign * (dec_degrees.abs() + dec_minutes / 60.0 + dec_seconds / 3600.0);
        RaDec::new(ra, dec)
    }

    /// Direction of a geocentric vector.
    ///
    /// `v` must be non-zero. Right ascension is scale invariant; declination
    /// is `asin(z)` and so is only exact for unit vectors.
    pub fn from_geocentric(v: &Cartesian3) -> Self {
        let ra = v.y.atan2(v.x) * RAD2DEG;
        let dec = v.z.clamp(-1.0, 1.0).asin() * RAD2DEG;
        RaDec::new(ra, dec)
    }

    /// Unit vector pointing at this position
    pub fn to_geocentric(&self) -> Cartesian3 {
        Cartesian3::from_spherical(self.ra * DEG2RAD, self.dec * DEG2RAD, 1.0)
    }

    /// Great-circle distance to another position in degrees
    pub fn distance_from(&self, other: &RaDec) -> f64 {
        self.angle_between(other) * RAD2DEG
    }

    /// True if this position never sets as seen from `location`
    pub fn is_circumpolar_for(&self, location: &LatLong) -> bool {
        let lat = location.latitude();
        if lat > 0.0 {
            self.dec > 90.0 - lat
        } else {
            self.dec < -90.0 - lat
        }
    }

    /// True if this position never rises as seen from `location`
    pub fn is_never_visible_for(&self, location: &LatLong) -> bool {
        let lat = location.latitude();
        if lat > 0.0 {
            self.dec < lat - 90.0
        } else {
            self.dec > 90.0 + lat
        }
    }
}

impl std::fmt::Display for RaDec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RA {:.4}° Dec {:+.4}°", self.ra, self.dec)
    }
}

impl InertialFrame for RaDec {
    fn to_cartesian(&self) -> Cartesian3 {
        self.to_geocentric()
    }

    fn from_cartesian(cart: Cartesian3) -> Self {
        match cart.normalize() {
            Some(unit) => RaDec::from_geocentric(&unit),
            None => RaDec::default(),
        }
    }
}

/// Ecliptic coordinates in radians
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ecliptic {
    pub lon: f64, // Ecliptic longitude in radians
    pub lat: f64, // Ecliptic latitude in radians
}

impl InertialFrame for Ecliptic {
    fn to_cartesian(&self) -> Cartesian3 {
        Cartesian3::from_spherical(self.lon, self.lat, 1.0)
    }

    fn from_cartesian(cart: Cartesian3) -> Self {
        let r_xy = (cart.x * cart.x + cart.y * cart.y).sqrt();
        Ecliptic {
            lon: cart.y.atan2(cart.x),
            lat: cart.z.atan2(r_xy),
        }
    }
}

impl From<Ecliptic> for RaDec {
    fn from(ecliptic: Ecliptic) -> Self {
        RaDec::from_cartesian(ecliptic_to_equatorial(&ecliptic.to_cartesian()))
    }
}

impl From<RaDec> for Ecliptic {
    fn from(equatorial: RaDec) -> Self {
        Ecliptic::from_cartesian(transform(&EQ_TO_EC, &equatorial.to_cartesian()))
    }
}

/// Rotates an ecliptic-frame vector into the equatorial frame, preserving length.
pub fn ecliptic_to_equatorial(v: &Cartesian3) -> Cartesian3 {
    transform(&EC_TO_EQ, v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::Rng;
    use rand::SeedableRng;
    use rstest::rstest;

    #[test]
    fn test_radec_geocentric_roundtrip() {
        let mut rng = StdRng::seed_from_u64(424242);
        for _ in 0..1000 {
            let ra = rng.gen_range(0.0..360.0);
            // Poles excluded: ra is undefined there
            let dec = rng.gen_range(-89.9..89.9);

            let rt = RaDec::from_geocentric(&RaDec::new(ra, dec).to_geocentric());

            let dra = (rt.ra - ra).abs();
            assert!(dra.min(360.0 - dra) < 1e-4, "ra {} -> {}", ra, rt.ra);
            assert_relative_eq!(rt.dec, dec, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_radec_poles_keep_declination() {
        for dec in [90.0, -90.0] {
            let rt = RaDec::from_geocentric(&RaDec::new(123.0, dec).to_geocentric());
            assert_relative_eq!(rt.dec, dec, epsilon = 1e-4);
        }
    }

    #[rstest]
    #[case(0.0, 0.0, Cartesian3::new(1.0, 0.0, 0.0))]
    #[case(90.0, 0.0, Cartesian3::new(0.0, 1.0, 0.0))]
    #[case(0.0, 90.0, Cartesian3::new(0.0, 0.0, 1.0))]
    #[case(180.0, 0.0, Cartesian3::new(-1.0, 0.0, 0.0))]
    #[case(270.0, -90.0, Cartesian3::new(0.0, 0.0, -1.0))]
    fn test_radec_to_geocentric(#[case] ra: f64, #[case] dec: f64, #[case] expected: Cartesian3) {
        let v = RaDec::new(ra, dec).to_geocentric();
        assert_relative_eq!(v.x, expected.x, epsilon = 1e-12);
        assert_relative_eq!(v.y, expected.y, epsilon = 1e-12);
        assert_relative_eq!(v.z, expected.z, epsilon = 1e-12);
    }

    #[test]
    fn test_radec_normalizes_ra() {
        assert_relative_eq!(RaDec::new(-30.0, 0.0).ra, 330.0);
        assert_relative_eq!(RaDec::new(725.0, 0.0).ra, 5.0);
        assert_eq!(RaDec::new(10.0, 95.0).dec, 90.0);
    }

    #[test]
    fn test_from_geocentric_clamps_declination() {
        // Slightly longer than unit length must not produce NaN
        let v = Cartesian3::new(0.0, 0.0, 1.000_000_1);
        let radec = RaDec::from_geocentric(&v);
        assert_relative_eq!(radec.dec, 90.0, epsilon = 1e-12);
    }

    #[test]
    fn test_from_hms_dms() {
        // Betelgeuse, 05h55m10.3s +07°24'25"
        let b = RaDec::from_hms_dms(5.0, 55.0, 10.3, 7.0, 24.0, 25.0);
        assert_relative_eq!(b.ra, 88.792_916, epsilon = 1e-5);
        assert_relative_eq!(b.dec, 7.406_944, epsilon = 1e-5);

        let south = RaDec::from_hms_dms(0.0, 0.0, 0.0, -0.0, 30.0, 0.0);
        assert_relative_eq!(south.dec, -0.5);

        let sirius = RaDec::from_hms_dms(6.0, 45.0, 8.9, -16.0, 42.0, 58.0);
        assert_relative_eq!(sirius.dec, -16.716_111, epsilon = 1e-5);
    }

    #[rstest]
    #[case(60.0, 40.0, true, false)]
    #[case(60.0, 29.0, false, false)]
    #[case(60.0, -40.0, false, true)]
    #[case(-60.0, -40.0, true, false)]
    #[case(-60.0, 40.0, false, true)]
    #[case(0.0, 89.0, false, false)]
    fn test_horizon_classification(
        #[case] lat: f64,
        #[case] dec: f64,
        #[case] circumpolar: bool,
        #[case] never_visible: bool,
    ) {
        let location = LatLong::new(lat, 0.0);
        let pos = RaDec::new(0.0, dec);
        assert_eq!(pos.is_circumpolar_for(&location), circumpolar);
        assert_eq!(pos.is_never_visible_for(&location), never_visible);
    }

    #[test]
    fn test_distance_from() {
        let a = RaDec::new(0.0, 0.0);
        assert_relative_eq!(a.distance_from(&RaDec::new(90.0, 0.0)), 90.0, epsilon = 1e-9);
        assert_relative_eq!(a.distance_from(&RaDec::new(180.0, 0.0)), 180.0, epsilon = 1e-9);
        assert_relative_eq!(a.distance_from(&a), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_ecliptic_to_equatorial() {
        // The ecliptic pole sits at RA 270°, Dec 90° - obliquity
        let pole = RaDec::from(Ecliptic {
            lon: 0.0,
            lat: std::f64::consts::FRAC_PI_2,
        });
        assert_relative_eq!(pole.ra, 270.0, epsilon = 1e-9);
        assert_relative_eq!(pole.dec, 90.0 - OBLIQUITY_J2000_DEG, epsilon = 1e-9);

        // Summer solstice point
        let solstice = RaDec::from(Ecliptic {
            lon: std::f64::consts::FRAC_PI_2,
            lat: 0.0,
        });
        assert_relative_eq!(solstice.ra, 90.0, epsilon = 1e-9);
        assert_relative_eq!(solstice.dec, OBLIQUITY_J2000_DEG, epsilon = 1e-9);
    }

    #[test]
    fn test_ecliptic_to_equatorial_rt_rand() {
        let mut rng = StdRng::seed_from_u64(23423);
        for _ in 0..100 {
            let eq1 = RaDec::new(rng.gen_range(0.0..360.0), rng.gen_range(-85.0..85.0));
            let ec: Ecliptic = eq1.into();
            let eq2: RaDec = ec.into();
            assert_relative_eq!(eq1.dec, eq2.dec, epsilon = 1e-9);
            assert_relative_eq!(eq1.distance_from(&eq2), 0.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_ecliptic_rotation_preserves_length() {
        let v = Cartesian3::new(1.2, -0.4, 0.03);
        assert_relative_eq!(ecliptic_to_equatorial(&v).length(), v.length(), epsilon = 1e-12);
    }
}
