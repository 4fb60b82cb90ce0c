//! Local axes in phone coordinates from raw sensor readings
//!
//! Either an accelerometer/magnetometer pair or a fused rotation vector
//! yields magnetic North, East and Up expressed in the phone's own frame.

use crate::coordinates::Cartesian3;
use crate::framelib::rotation::{matrix_from_vectors, MatrixLayout};
use nalgebra::Matrix3;

/// Readings with a squared length below this are treated as missing
pub const MIN_SENSOR_LENGTH2: f64 = 0.01;

// Slack on the unit-norm check for rotation vectors
const ROTATION_VECTOR_NORM_SLACK: f64 = 1e-3;

/// Magnetic North, East and Up in phone coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhoneAxes {
    pub north: Cartesian3,
    pub east: Cartesian3,
    pub up: Cartesian3,
}

impl PhoneAxes {
    /// Up is the normalized acceleration; magnetic North is the field with its
    /// vertical component rejected; East is `North × Up`.
    ///
    /// Returns `None` if either reading is too short or the field is vertical.
    pub fn from_sensors(acceleration: &Cartesian3, magnetic_field: &Cartesian3) -> Option<Self> {
        if !is_usable_reading(acceleration) || !is_usable_reading(magnetic_field) {
            return None;
        }
        let up = acceleration.normalize()?;
        let north = magnetic_field.normalize()?.reject_from(&up).normalize()?;
        let east = north.cross(&up);
        Some(PhoneAxes { north, east, up })
    }

    /// Axes from a rotation vector `(x, y, z, w)` quaternion
    ///
    /// The rows of the resulting rotation matrix are East, North and Up.
    pub fn from_rotation_vector(q: &[f64; 4]) -> Self {
        let [q1, q2, q3, q0] = *q;
        let sq_q1 = 2.0 * q1 * q1;
        let sq_q2 = 2.0 * q2 * q2;
        let sq_q3 = 2.0 * q3 * q3;
        let q1_q2 = 2.0 * q1 * q2;
        let q3_q0 = 2.0 * q3 * q0;
        let q1_q3 = 2.0 * q1 * q3;
        let q2_q0 = 2.0 * q2 * q0;
        let q2_q3 = 2.0 * q2 * q3;
        let q1_q0 = 2.0 * q1 * q0;

        PhoneAxes {
            east: Cartesian3::new(1.0 - sq_q2 - sq_q3, q1_q2 - q3_q0, q1_q3 + q2_q0),
            north: Cartesian3::new(q1_q2 + q3_q0, 1.0 - sq_q1 - sq_q3, q2_q3 - q1_q0),
            up: Cartesian3::new(q1_q3 - q2_q0, q2_q3 + q1_q0, 1.0 - sq_q1 - sq_q2),
        }
    }

    /// Maps phone coordinates onto the local (North, Up, East) basis
    ///
    /// The axes are orthonormal, so the inverse is just the row layout.
    pub fn inverse_matrix(&self) -> Matrix3<f64> {
        matrix_from_vectors(&self.north, &self.up, &self.east, MatrixLayout::Rows)
    }
}

/// True if a raw reading is long enough to carry a direction
pub fn is_usable_reading(v: &Cartesian3) -> bool {
    v.is_finite() && v.length2() >= MIN_SENSOR_LENGTH2
}

/// Validates a raw rotation vector and fills in its scalar part
///
/// Accepts 3 or more components; anything past the fourth is ignored. The
/// vector part must be finite with norm at most one.
pub fn rotation_quaternion(values: &[f32]) -> Option<[f64; 4]> {
    if values.len() < 3 || values.iter().take(4).any(|v| !v.is_finite()) {
        return None;
    }
    let (x, y, z) = (values[0] as f64, values[1] as f64, values[2] as f64);
    let norm2 = x * x + y * y + z * z;
    if norm2 > 1.0 + ROTATION_VECTOR_NORM_SLACK {
        return None;
    }
    let w = match values.get(3) {
        Some(w) => *w as f64,
        None => (1.0 - norm2).max(0.0).sqrt(),
    };
    Some([x, y, z, w])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn assert_vec_eq(a: &Cartesian3, b: &Cartesian3) {
        assert!((*a - *b).length() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn test_flat_phone_pointing_north() {
        let gravity = Cartesian3::new(0.0, 0.0, 9.8);
        let axes = PhoneAxes::from_sensors(&gravity, &Cartesian3::new(0.0, 20.0, -40.0)).unwrap();
        assert_vec_eq(&axes.up, &Cartesian3::unit_z());
        assert_vec_eq(&axes.north, &Cartesian3::unit_y());
        assert_vec_eq(&axes.east, &Cartesian3::unit_x());
    }

    #[test]
    fn test_rejects_degenerate_readings() {
        let good = Cartesian3::new(0.0, 0.0, 9.8);
        assert!(PhoneAxes::from_sensors(&Cartesian3::new(0.05, 0.0, 0.0), &good).is_none());
        assert!(PhoneAxes::from_sensors(&good, &Cartesian3::zero()).is_none());
        // Field parallel to gravity has no horizontal component
        assert!(PhoneAxes::from_sensors(&good, &Cartesian3::new(0.0, 0.0, -30.0)).is_none());
        assert!(!is_usable_reading(&Cartesian3::new(f64::NAN, 1.0, 1.0)));
    }

    #[test]
    fn test_identity_rotation_vector() {
        let axes = PhoneAxes::from_rotation_vector(&[0.0, 0.0, 0.0, 1.0]);
        assert_vec_eq(&axes.east, &Cartesian3::unit_x());
        assert_vec_eq(&axes.north, &Cartesian3::unit_y());
        assert_vec_eq(&axes.up, &Cartesian3::unit_z());
    }

    #[test]
    fn test_rotation_vector_axes_are_orthonormal() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let v = Cartesian3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            )
            .normalize()
            .unwrap();
            let half_angle: f64 = rng.gen_range(0.0..std::f64::consts::PI);
            let s = half_angle.sin();
            let q = [v.x * s, v.y * s, v.z * s, half_angle.cos()];
            let axes = PhoneAxes::from_rotation_vector(&q);

            let m = axes.inverse_matrix();
            let identity = m * m.transpose();
            assert!((identity - Matrix3::identity()).norm() < 1e-9);
            // Right-handed: East = North × Up
            assert_vec_eq(&axes.north.cross(&axes.up), &axes.east);
        }
    }

    #[test]
    fn test_rotation_quaternion_validation() {
        assert_eq!(rotation_quaternion(&[0.0, 0.0, 0.0]), Some([0.0, 0.0, 0.0, 1.0]));
        // Extra components are dropped
        let q = rotation_quaternion(&[0.6, 0.0, 0.0, 0.8, 0.5, -1.0]).unwrap();
        assert_relative_eq!(q[3], 0.8, epsilon = 1e-6);

        let q = rotation_quaternion(&[0.6, 0.0, 0.0]).unwrap();
        assert_relative_eq!(q[3], 0.8, epsilon = 1e-6);

        assert!(rotation_quaternion(&[0.1, 0.2]).is_none());
        assert!(rotation_quaternion(&[1.0, 1.0, 0.0]).is_none());
        assert!(rotation_quaternion(&[0.1, f32::NAN, 0.0, 1.0]).is_none());
    }
}
