//! # Cartesian Vector Module
//!
//! This module provides the 3D vector type used for every frame change in the
//! crate: celestial unit vectors, heliocentric positions, and raw phone sensor
//! readings all pass through [`Cartesian3`].
//!
//! ## Axes
//!
//! Celestial directions are equatorial: x toward the March equinox, y toward
//! RA 90° on the equator, z toward the north celestial pole.
//!
//! Heliocentric positions use the same handedness with the ecliptic as the
//! XY plane. Phone-frame vectors use the device axes (X right, Y toward the top
//! of the screen, Z out of the screen).
//!
//! ## Value Semantics
//!
//! `Cartesian3` is `Copy`. Every accessor elsewhere in the crate hands out its
//! own copy, so a caller holding a vector never observes a later update to the
//! state it was read from. The in-place operations ([`Cartesian3::normalize_in_place`])
//! exist only for callers that own the value outright.
//!
//! ## Examples
//!
//! ```rust
//! use skyframe::coordinates::cartesian::Cartesian3;
//!
//! let vernal_equinox = Cartesian3::unit_x();
//! let north_pole = Cartesian3::unit_z();
//!
//! // Perpendicular directions
//! assert_eq!(vernal_equinox.dot(&north_pole), 0.0);
//! assert_eq!(vernal_equinox.cross(&Cartesian3::unit_y()), north_pole);
//! ```

use crate::constants::RAD2DEG;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// A position or direction in three dimensions
///
/// Used for sky directions, heliocentric positions and raw sensor readings
/// alike. Unit length holds for *direction* vectors only and is not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Cartesian3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Cartesian3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Cartesian3 { x, y, z }
    }

    /// The zero vector
    pub const fn zero() -> Self {
        Cartesian3::new(0.0, 0.0, 0.0)
    }

    /// Unit vector along X
    pub const fn unit_x() -> Self {
        Cartesian3::new(1.0, 0.0, 0.0)
    }

    /// Unit vector along Y
    pub const fn unit_y() -> Self {
        Cartesian3::new(0.0, 1.0, 0.0)
    }

    /// Unit vector along Z
    pub const fn unit_z() -> Self {
        Cartesian3::new(0.0, 0.0, 1.0)
    }

    /// Widens a single-precision sensor triple
    pub fn from_f32(values: [f32; 3]) -> Self {
        Cartesian3::new(values[0] as f64, values[1] as f64, values[2] as f64)
    }

    /// Vector of length `distance` toward longitude `ra` and latitude `dec`,
    /// both in radians
    pub fn from_spherical(ra: f64, dec: f64, distance: f64) -> Self {
        let (sin_dec, cos_dec) = dec.sin_cos();
        let (sin_ra, cos_ra) = ra.sin_cos();
        Cartesian3::new(
            distance * cos_dec * cos_ra,
            distance * cos_dec * sin_ra,
            distance * sin_dec,
        )
    }

    /// Euclidean length
    ///
    /// ```rust
    /// use skyframe::coordinates::cartesian::Cartesian3;
    ///
    /// assert_eq!(Cartesian3::new(3.0, 4.0, 0.0).length(), 5.0);
    /// ```
    pub fn length(&self) -> f64 {
        self.length2().sqrt()
    }

    /// Squared length, cheaper than [`Cartesian3::length`] for threshold checks
    pub fn length2(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Returns a unit vector in the same direction
    ///
    /// Returns `None` if the length is zero or not finite.
    ///
    /// ```rust
    /// use skyframe::coordinates::cartesian::Cartesian3;
    ///
    /// let unit = Cartesian3::new(3.0, 4.0, 0.0).normalize().unwrap();
    /// assert_eq!(unit, Cartesian3::new(0.6, 0.8, 0.0));
    /// assert!(Cartesian3::zero().normalize().is_none());
    /// ```
    pub fn normalize(&self) -> Option<Cartesian3> {
        let len = self.length();
        if len == 0.0 || !len.is_finite() {
            None
        } else {
            Some(*self / len)
        }
    }

    /// Normalizes this vector in place
    ///
    /// Returns `false` and leaves the vector untouched if it has zero length.
    pub fn normalize_in_place(&mut self) -> bool {
        match self.normalize() {
            Some(unit) => {
                *self = unit;
                true
            }
            None => false,
        }
    }

    /// Vector pointing the opposite way
    pub fn negate(&self) -> Cartesian3 {
        -*self
    }

    pub fn dot(&self, other: &Cartesian3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Right-handed cross product
    pub fn cross(&self, other: &Cartesian3) -> Cartesian3 {
        Cartesian3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Cosine of the angle between two vectors
    ///
    /// The result is clamped to [-1, 1] so it can be fed straight to `acos`.
    /// Returns 1.0 when either vector has zero length.
    pub fn cosine_similarity(&self, other: &Cartesian3) -> f64 {
        let len_product = self.length() * other.length();
        if len_product == 0.0 {
            return 1.0;
        }
        (self.dot(other) / len_product).clamp(-1.0, 1.0)
    }

    /// Angle to another vector in radians, in [0, π]
    ///
    /// ```rust
    /// use skyframe::coordinates::cartesian::Cartesian3;
    /// use std::f64::consts::PI;
    ///
    /// let angle = Cartesian3::unit_x().angular_distance(&Cartesian3::unit_y());
    /// assert!((angle - PI / 2.0).abs() < 1e-15);
    /// ```
    pub fn angular_distance(&self, other: &Cartesian3) -> f64 {
        let cos_angle = self.cosine_similarity(other);
        if cos_angle >= 1.0 {
            0.0
        } else if cos_angle <= -1.0 {
            PI
        } else {
            cos_angle.acos()
        }
    }

    /// Angle to another vector in degrees, in [0, 180]
    pub fn distance_from(&self, other: &Cartesian3) -> f64 {
        self.angular_distance(other) * RAD2DEG
    }

    /// Component of this vector perpendicular to `axis`
    ///
    /// `axis` must be a unit vector.
    pub fn reject_from(&self, axis: &Cartesian3) -> Cartesian3 {
        *self - *axis * self.dot(axis)
    }

    /// Returns true if every component is finite
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// As an nalgebra column vector, for matrix products
    pub fn to_vector3(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn from_vector3(v: Vector3<f64>) -> Self {
        Cartesian3::new(v.x, v.y, v.z)
    }
}

impl From<Vector3<f64>> for Cartesian3 {
    fn from(vec: Vector3<f64>) -> Self {
        Cartesian3::from_vector3(vec)
    }
}

impl From<Cartesian3> for Vector3<f64> {
    fn from(coord: Cartesian3) -> Self {
        coord.to_vector3()
    }
}

impl std::fmt::Display for Cartesian3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6}, {:.6})", self.x, self.y, self.z)
    }
}

// Componentwise vector arithmetic and scaling by a scalar
macro_rules! vector_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl std::ops::$trait for Cartesian3 {
            type Output = Cartesian3;

            fn $method(self, rhs: Cartesian3) -> Cartesian3 {
                Cartesian3::new(self.x $op rhs.x, self.y $op rhs.y, self.z $op rhs.z)
            }
        }
    };
}

macro_rules! scalar_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl std::ops::$trait<f64> for Cartesian3 {
            type Output = Cartesian3;

            fn $method(self, k: f64) -> Cartesian3 {
                Cartesian3::new(self.x $op k, self.y $op k, self.z $op k)
            }
        }
    };
}

vector_op!(Add, add, +);
vector_op!(Sub, sub, -);
scalar_op!(Mul, mul, *);
scalar_op!(Div, div, /);

impl std::ops::Neg for Cartesian3 {
    type Output = Cartesian3;

    fn neg(self) -> Cartesian3 {
        Cartesian3::new(-self.x, -self.y, -self.z)
    }
}
