use itertools::izip;
use nalgebra::{Matrix3, Vector3};

use crate::{error::EvalError, transform::rotation_angle};

fn check_lengths(what: &str, lhs: usize, rhs: usize) -> Result<(), EvalError> {
    if lhs == 0 {
        return Err(EvalError::invalid_parameter(format!("Empty {what} input.")));
    }
    if lhs != rhs {
        return Err(EvalError::shape_mismatch(format!(
            "{what} inputs have different lengths: {lhs} and {rhs}."
        )));
    }
    Ok(())
}

fn all_finite(xyz: &[Vector3<f64>]) -> bool {
    xyz.iter().all(|p| p.iter().all(|v| v.is_finite()))
}

/// Absolute trajectory error after first-point and scale alignment.
///
/// The predicted positions are translated so that their first point matches the
/// ground truth, then scaled by the least-squares factor. No rotational
/// alignment is done: both inputs must be expressed from the same local origin.
///
/// The value is `sqrt(sum(residual^2)) / N`. Note the division by `N`, not
/// `sqrt(N)`; scores are only comparable with others computed the same way.
///
/// # Arguments
///
/// * `gt_xyz` - Ground truth positions.
/// * `pred_xyz` - Predicted positions, same length.
///
/// # Returns
///
/// * The error, `EvalError::DegenerateScale` if the aligned prediction has no
///   extent while the ground truth does, or `EvalError::NonFinite` on NaN or
///   infinite positions.
pub fn compute_ate(gt_xyz: &[Vector3<f64>], pred_xyz: &[Vector3<f64>]) -> Result<f64, EvalError> {
    check_lengths("ATE", gt_xyz.len(), pred_xyz.len())?;

    if !all_finite(gt_xyz) {
        return Err(EvalError::NonFinite("ground truth".to_string()));
    }
    if !all_finite(pred_xyz) {
        return Err(EvalError::NonFinite("predicted".to_string()));
    }

    let offset = gt_xyz[0] - pred_xyz[0];
    let aligned: Vec<Vector3<f64>> = pred_xyz.iter().map(|pred| pred + offset).collect();

    let numerator: f64 = izip!(gt_xyz, &aligned).map(|(gt, pred)| gt.dot(pred)).sum();
    let denominator: f64 = aligned.iter().map(|pred| pred.norm_squared()).sum();

    if denominator == 0.0 {
        // Both sequences sitting at the origin agree for any scale.
        if gt_xyz.iter().all(|gt| *gt == Vector3::zeros()) {
            return Ok(0.0);
        }
        return Err(EvalError::DegenerateScale { denominator });
    }
    let scale = numerator / denominator;

    let squared_error: f64 = izip!(gt_xyz, &aligned)
        .map(|(gt, pred)| (pred * scale - gt).norm_squared())
        .sum();

    Ok(squared_error.sqrt() / gt_xyz.len() as f64)
}

/// Mean rotation angle, in radians, of `a[i] * inverse(b[i])`.
///
/// The inverse is a general matrix inverse, not a transpose, so rotations that
/// drifted away from orthonormality are still measured faithfully. Swapping the
/// arguments gives the same value for proper rotations.
pub fn compute_re(rotations_a: &[Matrix3<f64>], rotations_b: &[Matrix3<f64>]) -> Result<f64, EvalError> {
    check_lengths("RE", rotations_a.len(), rotations_b.len())?;

    let mut total = 0.0;
    for (index, (a, b)) in rotations_a.iter().zip(rotations_b).enumerate() {
        let b_inv = b.try_inverse().ok_or(EvalError::SingularRotation(index))?;
        total += rotation_angle(&(a * b_inv));
    }

    Ok(total / rotations_a.len() as f64)
}

/// Errors of a single evaluation window.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WindowMetrics {
    /// Absolute trajectory error.
    pub ate: f64,
    /// Mean relative rotation error in radians.
    pub re: f64,
}

impl std::fmt::Display for WindowMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ATE: {:.4}, RE: {:.2}°", self.ate, self.re.to_degrees())
    }
}
