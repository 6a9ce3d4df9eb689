use nalgebra::Vector3;
use rstest::*;

use crate::{evaluation::SequenceInput, trajectory::Trajectory, transform::Transform};

/// Smoothly varying camera motion, step `i` of a synthetic sequence.
pub fn step(i: usize) -> Transform {
    let i = i as f64;
    Transform::from_axis_angle(
        &Vector3::new(0.01 * i, -0.02, 0.015 * (i * 0.7).sin()),
        &Vector3::new(0.1 + 0.01 * i, -0.05, 0.3 - 0.02 * i),
    )
}

/// `step(i)` perturbed in both rotation and translation.
pub fn noisy_step(i: usize) -> Transform {
    let noise = Transform::from_axis_angle(
        &Vector3::new(0.002, 0.0, -0.001 * i as f64),
        &Vector3::new(0.01, 0.005 * i as f64, 0.0),
    );
    &step(i) * &noise
}

/// Absolute poses of the first `num_steps` steps, origin included.
pub fn absolute_ground_truth(num_steps: usize) -> Vec<Transform> {
    let steps: Vec<Transform> = (0..num_steps).map(step).collect();
    Trajectory::from_relative(&steps).camera_to_world
}

/// Noisy prediction of `num_steps` steps with its absolute ground truth.
pub fn sequence_input(id: usize, num_steps: usize) -> SequenceInput {
    SequenceInput {
        id,
        predicted: (0..num_steps).map(noisy_step).collect(),
        ground_truth: absolute_ground_truth(num_steps),
    }
}

#[fixture]
pub fn sample_sequence() -> SequenceInput {
    sequence_input(1, 10)
}
