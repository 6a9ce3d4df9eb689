use std::ops::Index;

use itertools::Itertools;
use nalgebra::{Matrix3, Vector3};

use crate::{error::EvalError, trajectory_builder::TrajectoryBuilder, transform::Transform};

/// Trajectory of absolute camera poses.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trajectory {
    /// Camera poses, transforms points from camera to world.
    pub camera_to_world: Vec<Transform>,
}

impl Trajectory {
    /// Accumulates relative transforms into absolute poses starting at the identity.
    ///
    /// The result has `steps.len() + 1` poses, the first being the origin. Each
    /// call starts from a fresh builder, so windows never share state.
    ///
    /// # Arguments
    ///
    /// * `steps` - Relative transforms, `pose[k] = pose[k - 1] * steps[k - 1]`.
    pub fn from_relative(steps: &[Transform]) -> Self {
        let mut builder = TrajectoryBuilder::default();
        builder.extend(steps);
        builder.build()
    }

    /// Adds a new pose to the trajectory.
    pub fn push(&mut self, camera_to_world: Transform) {
        self.camera_to_world.push(camera_to_world);
    }

    /// Returns the number of poses in the trajectory.
    pub fn len(&self) -> usize {
        self.camera_to_world.len()
    }

    /// Returns true if the trajectory is empty.
    pub fn is_empty(&self) -> bool {
        self.camera_to_world.is_empty()
    }

    /// Gets the last pose.
    /// If the trajectory is empty, it returns `None`.
    pub fn last(&self) -> Option<&Transform> {
        self.camera_to_world.last()
    }

    /// Returns the iterator over poses.
    pub fn iter(&self) -> impl Iterator<Item = &Transform> + '_ {
        self.camera_to_world.iter()
    }

    /// Absolute camera positions, the translation column of every pose.
    pub fn positions(&self) -> Vec<Vector3<f64>> {
        self.iter().map(Transform::translation).collect()
    }

    /// Absolute camera orientations, the rotation block of every pose.
    pub fn rotations(&self) -> Vec<Matrix3<f64>> {
        self.iter().map(Transform::rotation).collect()
    }

    /// Relative transforms between consecutive poses, `inv(pose[k]) * pose[k + 1]`.
    ///
    /// Feeding the result into [`Trajectory::from_relative`] gives back this
    /// trajectory re-anchored at the identity.
    pub fn to_relative(&self) -> Result<Vec<Transform>, EvalError> {
        self.iter()
            .enumerate()
            .tuple_windows()
            .map(|((index, previous), (_, next))| {
                previous
                    .try_inverse()
                    .map(|inverse| &inverse * next)
                    .ok_or_else(|| {
                        EvalError::invalid_parameter(format!("Pose {index} is not invertible"))
                    })
            })
            .collect()
    }
}

impl FromIterator<Transform> for Trajectory {
    /// Creates a new trajectory from absolute poses.
    /// Use with the `collect::<Trajectory>` method.
    fn from_iter<T: IntoIterator<Item = Transform>>(iter: T) -> Self {
        Self {
            camera_to_world: iter.into_iter().collect(),
        }
    }
}

impl Index<usize> for Trajectory {
    type Output = Transform;
    /// Returns the pose at the given index.
    fn index(&self, index: usize) -> &Self::Output {
        &self.camera_to_world[index]
    }
}
