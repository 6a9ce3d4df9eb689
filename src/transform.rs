use nalgebra::{Matrix3, Matrix4, Vector3, Vector4};

use std::ops;

/// Rotation angles below this value are treated as no rotation.
const ANGLE_EPSILON: f64 = 1e-12;

/// Rigid transformation stored as a homogeneous 4x4 matrix.
///
/// The matrix is kept as-is instead of an isometry: ground truth poses are read
/// from archives and may not be perfectly orthonormal, and the metrics must see
/// them unchanged.
#[derive(Clone, Debug, PartialEq)]
pub struct Transform(Matrix4<f64>);

impl Default for Transform {
    fn default() -> Self {
        Self::eye()
    }
}

impl Transform {
    pub fn eye() -> Self {
        Self(Matrix4::identity())
    }

    /// Creates a transform from an axis-angle rotation and a translation.
    ///
    /// The rotation uses Rodrigues' formula. Zero rotation vectors yield the
    /// identity rotation.
    ///
    /// # Arguments
    ///
    /// * `axis_angle` - Rotation axis scaled by the angle in radians.
    /// * `translation` - Translation placed in the last column.
    pub fn from_axis_angle(axis_angle: &Vector3<f64>, translation: &Vector3<f64>) -> Self {
        Self::from_parts(&rotation_from_axis_angle(axis_angle), translation)
    }

    pub fn from_parts(rotation: &Matrix3<f64>, translation: &Vector3<f64>) -> Self {
        let mut matrix = Matrix4::identity();
        matrix.fixed_slice_mut::<3, 3>(0, 0).copy_from(rotation);
        matrix.fixed_slice_mut::<3, 1>(0, 3).copy_from(translation);
        Self(matrix)
    }

    pub fn from_matrix4(matrix: &Matrix4<f64>) -> Self {
        Self(*matrix)
    }

    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.0
    }

    /// The 3x3 rotation block.
    pub fn rotation(&self) -> Matrix3<f64> {
        self.0.fixed_slice::<3, 3>(0, 0).into_owned()
    }

    /// The translation column.
    pub fn translation(&self) -> Vector3<f64> {
        self.0.fixed_slice::<3, 1>(0, 3).into_owned()
    }

    /// General 4x4 inverse. Returns `None` if the matrix is singular.
    pub fn try_inverse(&self) -> Option<Self> {
        self.0.try_inverse().map(Self)
    }

    /// Rotation angle in radians.
    pub fn angle(&self) -> f64 {
        rotation_angle(&self.rotation())
    }

    /// Whether the rotation block is orthonormal within `epsilon`.
    pub fn is_rigid(&self, epsilon: f64) -> bool {
        let rotation = self.rotation();
        approx::relative_eq!(
            rotation.transpose() * rotation,
            Matrix3::identity(),
            epsilon = epsilon
        )
    }
}

/// Exponential map from an axis-angle vector to a rotation matrix.
pub fn rotation_from_axis_angle(axis_angle: &Vector3<f64>) -> Matrix3<f64> {
    let angle = axis_angle.norm();
    if angle < ANGLE_EPSILON {
        return Matrix3::identity();
    }

    let axis = axis_angle / angle;
    let (sin, cos) = angle.sin_cos();
    #[rustfmt::skip]
    let skew = Matrix3::new(
        0.0, -axis.z, axis.y,
        axis.z, 0.0, -axis.x,
        -axis.y, axis.x, 0.0,
    );

    Matrix3::identity() + skew * sin + skew * skew * (1.0 - cos)
}

/// Angle of a rotation matrix in radians, computed from its skew part and trace.
///
/// Both `atan2` arguments are twice the sine and cosine of the angle, which
/// leaves the result unchanged.
pub fn rotation_angle(rotation: &Matrix3<f64>) -> f64 {
    let sin2 = Vector3::new(
        rotation[(0, 1)] - rotation[(1, 0)],
        rotation[(1, 2)] - rotation[(2, 1)],
        rotation[(0, 2)] - rotation[(2, 0)],
    )
    .norm();
    let cos2 = rotation.trace() - 1.0;
    sin2.atan2(cos2)
}

impl ops::Mul<&Vector3<f64>> for &Transform {
    type Output = Vector3<f64>;

    fn mul(self, rhs: &Vector3<f64>) -> Self::Output {
        (self.0 * Vector4::new(rhs.x, rhs.y, rhs.z, 1.0)).xyz()
    }
}

impl ops::Mul<&Transform> for &Transform {
    type Output = Transform;

    fn mul(self, rhs: &Transform) -> Self::Output {
        Transform(self.0 * rhs.0)
    }
}

impl From<Transform> for Matrix4<f64> {
    fn from(transform: Transform) -> Self {
        transform.0
    }
}

impl From<Matrix4<f64>> for Transform {
    fn from(matrix: Matrix4<f64>) -> Self {
        Transform(matrix)
    }
}

/// Raw output of the pose network for one frame pair.
#[derive(Clone, Debug, PartialEq)]
pub struct PoseParams {
    pub axis_angle: Vector3<f64>,
    pub translation: Vector3<f64>,
}

impl PoseParams {
    pub fn new(axis_angle: Vector3<f64>, translation: Vector3<f64>) -> Self {
        Self {
            axis_angle,
            translation,
        }
    }

    /// Reads `[ax, ay, az, tx, ty, tz]`.
    pub fn from_row(row: &[f64; 6]) -> Self {
        Self {
            axis_angle: Vector3::new(row[0], row[1], row[2]),
            translation: Vector3::new(row[3], row[4], row[5]),
        }
    }

    pub fn to_transform(&self) -> Transform {
        Transform::from_axis_angle(&self.axis_angle, &self.translation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::Rotation3;
    use rstest::rstest;

    #[test]
    fn test_zero_rotation_is_identity() {
        let transform =
            Transform::from_axis_angle(&Vector3::zeros(), &Vector3::new(1.0, -2.0, 0.5));

        assert_eq!(transform.rotation(), Matrix3::identity());
        assert_eq!(transform.translation(), Vector3::new(1.0, -2.0, 0.5));
        assert_eq!(transform.matrix().row(3).transpose(), Vector4::w());
    }

    #[rstest]
    #[case(Vector3::new(0.0, 0.0, std::f64::consts::FRAC_PI_2))]
    #[case(Vector3::new(0.3, -0.2, 0.1))]
    #[case(Vector3::new(-1.2, 2.0, 0.7))]
    fn test_rodrigues_matches_reference(#[case] axis_angle: Vector3<f64>) {
        let rotation = rotation_from_axis_angle(&axis_angle);
        let reference = Rotation3::new(axis_angle);

        assert_abs_diff_eq!(rotation, *reference.matrix(), epsilon = 1e-12);
        assert!(Transform::from_parts(&rotation, &Vector3::zeros()).is_rigid(1e-10));
    }

    #[test]
    fn test_angle() {
        let transform = Transform::from_axis_angle(&Vector3::new(0.0, 0.4, 0.0), &Vector3::zeros());
        assert_abs_diff_eq!(transform.angle(), 0.4, epsilon = 1e-12);
        assert_abs_diff_eq!(Transform::eye().angle(), 0.0);
    }

    #[test]
    fn test_mul_op() {
        let transform = Transform::from_axis_angle(
            &(Vector3::y() * std::f64::consts::PI),
            &Vector3::new(0.0, 0.0, 3.0),
        );

        let point = &transform * &Vector3::new(1.0, 2.0, 3.0);
        assert_abs_diff_eq!(point, Vector3::new(-1.0, 2.0, 0.0), epsilon = 1e-12);

        let composed = &transform * &transform.try_inverse().unwrap();
        assert_abs_diff_eq!(*composed.matrix(), Matrix4::identity(), epsilon = 1e-12);
    }

    #[test]
    fn test_pose_params() {
        let params = PoseParams::from_row(&[0.0, 0.0, 0.1, 1.0, 2.0, 3.0]);
        let transform = params.to_transform();

        assert_abs_diff_eq!(transform.angle(), 0.1, epsilon = 1e-12);
        assert_eq!(transform.translation(), Vector3::new(1.0, 2.0, 3.0));
    }
}
