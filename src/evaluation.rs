use std::ops::Range;

use log::{debug, warn};
use rayon::prelude::*;

use crate::{
    config::{EvalParams, GroundTruthFormat, WindowPolicy},
    error::EvalError,
    metrics::{compute_ate, compute_re, WindowMetrics},
    pose_sequence::PoseSequence,
    trajectory::Trajectory,
    transform::Transform,
};

/// Tolerance used to warn about ground truth rotations that are not orthonormal.
const RIGIDITY_TOLERANCE: f64 = 1e-3;

/// Scores of one sequence.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SequenceEvaluation {
    /// Per-window errors, in window order.
    pub windows: Vec<WindowMetrics>,
    /// Mean ATE over all windows, the sequence score.
    pub mean_ate: f64,
    /// Mean RE over all windows, in radians.
    pub mean_re: f64,
}

impl SequenceEvaluation {
    fn from_windows(windows: Vec<WindowMetrics>) -> Self {
        let count = windows.len() as f64;
        let mean_ate = windows.iter().map(|window| window.ate).sum::<f64>() / count;
        let mean_re = windows.iter().map(|window| window.re).sum::<f64>() / count;
        Self {
            windows,
            mean_ate,
            mean_re,
        }
    }

    pub fn ates(&self) -> Vec<f64> {
        self.windows.iter().map(|window| window.ate).collect()
    }

    pub fn res(&self) -> Vec<f64> {
        self.windows.iter().map(|window| window.re).collect()
    }

    /// Report line of the sequence, as printed by `evaluate_pose`.
    ///
    /// `label` is the position of the sequence in the requested list.
    pub fn report(&self, label: usize) -> String {
        format!(
            "\n Absolute Trajectory Error of Seq. {}: {:0.4}",
            label, self.mean_ate
        )
    }
}

impl std::fmt::Display for SequenceEvaluation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ATE: {:.4}, RE: {:.4} rad over {} windows",
            self.mean_ate,
            self.mean_re,
            self.windows.len()
        )
    }
}

/// Index ranges over the relative transforms of a sequence, one per window.
///
/// # Arguments
///
/// * `num_steps` - Number of relative transforms in the sequence.
/// * `params` - Window length and policy.
///
/// # Returns
///
/// * The ranges, or `EvalError::SequenceTooShort` if not even one full window fits.
pub fn window_ranges(num_steps: usize, params: &EvalParams) -> Result<Vec<Range<usize>>, EvalError> {
    params.validate()?;
    let window = params.window_steps();
    if num_steps < window {
        return Err(EvalError::SequenceTooShort {
            frames: num_steps + 1,
            track_length: params.track_length,
        });
    }

    let ranges = match params.window_policy {
        WindowPolicy::Full => (0..=num_steps - window)
            .map(|start| start..start + window)
            .collect(),
        WindowPolicy::Truncated => (0..num_steps)
            .map(|start| start..(start + window).min(num_steps))
            .collect(),
    };
    Ok(ranges)
}

/// Converts ground truth poses into per-step transforms aligned with a
/// predicted sequence of `num_steps` transforms.
pub fn ground_truth_steps(
    ground_truth: &[Transform],
    num_steps: usize,
    format: GroundTruthFormat,
) -> Result<Vec<Transform>, EvalError> {
    let required = match format {
        GroundTruthFormat::Absolute => num_steps + 1,
        GroundTruthFormat::Relative => num_steps,
    };
    if ground_truth.len() < required {
        return Err(EvalError::shape_mismatch(format!(
            "{} ground truth poses for {num_steps} predicted steps, expected {required} ({format:?})",
            ground_truth.len()
        )));
    }
    if ground_truth.len() > required {
        warn!(
            "Ignoring {} trailing ground truth poses",
            ground_truth.len() - required
        );
    }

    let used = &ground_truth[..required];
    if used.iter().any(|pose| !pose.is_rigid(RIGIDITY_TOLERANCE)) {
        warn!("Ground truth contains rotations that are not orthonormal");
    }

    match format {
        GroundTruthFormat::Absolute => used.iter().cloned().collect::<Trajectory>().to_relative(),
        GroundTruthFormat::Relative => Ok(used.to_vec()),
    }
}

/// Scores a single window.
///
/// Both step lists are accumulated from a fresh origin, so nothing carries over
/// from previous windows.
pub fn evaluate_window(
    pred_steps: &[Transform],
    gt_steps: &[Transform],
) -> Result<WindowMetrics, EvalError> {
    let pred = Trajectory::from_relative(pred_steps);
    let gt = Trajectory::from_relative(gt_steps);

    Ok(WindowMetrics {
        ate: compute_ate(&gt.positions(), &pred.positions())?,
        re: compute_re(&pred.rotations(), &gt.rotations())?,
    })
}

/// Windowed ATE and RE of a predicted sequence against its ground truth.
///
/// # Arguments
///
/// * `predicted` - Predicted relative transforms.
/// * `ground_truth` - Ground truth poses, read according to `params.ground_truth`.
/// * `params` - Evaluation parameters.
pub fn evaluate_sequence(
    predicted: &PoseSequence,
    ground_truth: &[Transform],
    params: &EvalParams,
) -> Result<SequenceEvaluation, EvalError> {
    let ranges = window_ranges(predicted.len(), params)?;
    let gt_steps = ground_truth_steps(ground_truth, predicted.len(), params.ground_truth)?;

    let windows = ranges
        .into_iter()
        .map(|range| {
            let metrics =
                evaluate_window(&predicted.steps()[range.clone()], &gt_steps[range.clone()])?;
            debug!("Window {range:?}: {metrics}");
            Ok(metrics)
        })
        .collect::<Result<Vec<_>, EvalError>>()?;

    Ok(SequenceEvaluation::from_windows(windows))
}

/// Prediction and ground truth of one sequence.
#[derive(Clone, Debug)]
pub struct SequenceInput {
    /// Sequence identifier, used for reporting.
    pub id: usize,
    pub predicted: PoseSequence,
    pub ground_truth: Vec<Transform>,
}

/// Evaluates independent sequences in parallel.
///
/// Results keep the order of `inputs`. A failing sequence does not affect the
/// others.
pub fn evaluate_batch(
    inputs: &[SequenceInput],
    params: &EvalParams,
) -> Vec<Result<SequenceEvaluation, EvalError>> {
    inputs
        .par_iter()
        .map(|input| {
            evaluate_sequence(&input.predicted, &input.ground_truth, params).map_err(|err| {
                warn!("Sequence {} failed: {err}", input.id);
                err
            })
        })
        .collect()
}
