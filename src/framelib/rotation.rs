//! Rotation and frame-change matrices
//!
//! Frame changes are plain nalgebra `Matrix3<f64>` values. A frame matrix is
//! built from three orthonormal axis vectors either as columns (frame to
//! parent) or as rows (parent to frame). For an orthonormal frame the row form
//! is the inverse of the column form, so no general matrix inversion is needed.

use crate::constants::DEG2RAD;
use crate::coordinates::cartesian::Cartesian3;
use nalgebra::{Matrix3, RowVector3};

/// How three vectors are laid into a matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixLayout {
    /// Each vector becomes a column
    Columns,
    /// Each vector becomes a row
    Rows,
}

/// Rotation by `degrees` about `axis`, counterclockwise when looking down
/// the axis toward the origin (Rodrigues' formula).
///
/// `axis` must already be a unit vector. It is not normalized here, and a
/// non-unit axis yields a matrix that is not orthogonal.
///
/// ```rust
/// use skyframe::coordinates::cartesian::Cartesian3;
/// use skyframe::framelib::rotation::{rotation_matrix, transform};
///
/// let m = rotation_matrix(90.0, &Cartesian3::unit_z());
/// let v = transform(&m, &Cartesian3::unit_x());
/// assert!((v.y - 1.0).abs() < 1e-12);
/// ```
pub fn rotation_matrix(degrees: f64, axis: &Cartesian3) -> Matrix3<f64> {
    let (s, c) = (degrees * DEG2RAD).sin_cos();
    let t = 1.0 - c;
    let (x, y, z) = (axis.x, axis.y, axis.z);

    Matrix3::new(
        x * x * t + c,
        x * y * t - z * s,
        x * z * t + y * s,
        y * x * t + z * s,
        y * y * t + c,
        y * z * t - x * s,
        z * x * t - y * s,
        z * y * t + x * s,
        z * z * t + c,
    )
}

/// Builds a matrix from three vectors laid out as columns or rows.
pub fn matrix_from_vectors(
    v1: &Cartesian3,
    v2: &Cartesian3,
    v3: &Cartesian3,
    layout: MatrixLayout,
) -> Matrix3<f64> {
    match layout {
        MatrixLayout::Columns => {
            Matrix3::from_columns(&[v1.to_vector3(), v2.to_vector3(), v3.to_vector3()])
        }
        MatrixLayout::Rows => Matrix3::from_rows(&[row(v1), row(v2), row(v3)]),
    }
}

fn row(v: &Cartesian3) -> RowVector3<f64> {
    RowVector3::new(v.x, v.y, v.z)
}

/// Applies `matrix` to `v`.
pub fn transform(matrix: &Matrix3<f64>, v: &Cartesian3) -> Cartesian3 {
    Cartesian3::from_vector3(matrix * v.to_vector3())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_unit_axis(rng: &mut StdRng) -> Cartesian3 {
        loop {
            let v = Cartesian3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            if let Some(unit) = v.normalize() {
                return unit;
            }
        }
    }

    #[test]
    fn test_rotation_is_orthogonal() {
        let mut rng = StdRng::seed_from_u64(8675309);
        for _ in 0..200 {
            let axis = random_unit_axis(&mut rng);
            let degrees = rng.gen_range(-720.0..720.0);
            let m = rotation_matrix(degrees, &axis);

            let product = m * m.transpose();
            assert_relative_eq!(product, Matrix3::identity(), epsilon = 1e-5);

            let undo = m * rotation_matrix(-degrees, &axis);
            assert_relative_eq!(undo, Matrix3::identity(), epsilon = 1e-5);
        }
    }

    #[test]
    fn test_rotation_sense() {
        let z = Cartesian3::unit_z();
        let m = rotation_matrix(90.0, &z);
        let v = transform(&m, &Cartesian3::unit_x());
        assert_relative_eq!(v.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(v.y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(v.z, 0.0, epsilon = 1e-12);

        // The axis itself is fixed
        let fixed = transform(&m, &z);
        assert_relative_eq!(fixed.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_non_unit_axis_is_not_normalized() {
        let m = rotation_matrix(90.0, &Cartesian3::new(0.0, 0.0, 2.0));
        let product = m * m.transpose();
        assert!((product - Matrix3::identity()).norm() > 1e-3);
    }

    #[test]
    fn test_rows_are_inverse_of_columns_for_orthonormal_frame() {
        let a = Cartesian3::new(0.0, 0.6, 0.8);
        let b = Cartesian3::unit_x();
        let c = a.cross(&b);

        let columns = matrix_from_vectors(&a, &b, &c, MatrixLayout::Columns);
        let rows = matrix_from_vectors(&a, &b, &c, MatrixLayout::Rows);
        assert_eq!(columns.transpose(), rows);
        assert_relative_eq!(columns * rows, Matrix3::identity(), epsilon = 1e-12);

        // Column layout maps basis vectors onto the given axes
        assert_eq!(transform(&columns, &Cartesian3::unit_x()), a);
        assert_eq!(transform(&columns, &Cartesian3::unit_y()), b);
    }
}
