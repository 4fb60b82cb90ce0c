//! Reference frames: inertial sky coordinates and the rotations between frames

pub mod inertial;
pub mod rotation;

pub use inertial::{Ecliptic, InertialFrame, RaDec};
pub use rotation::{matrix_from_vectors, rotation_matrix, transform, MatrixLayout};
