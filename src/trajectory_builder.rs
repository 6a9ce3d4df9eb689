use crate::{trajectory::Trajectory, transform::Transform};

/// Accumulates relative transforms and builds a trajectory.
#[derive(Clone, Debug)]
pub struct TrajectoryBuilder {
    trajectory: Trajectory,
}

impl Default for TrajectoryBuilder {
    /// Creates a new `TrajectoryBuilder`.
    /// It'll contain a single pose at the origin.
    fn default() -> Self {
        Self::with_origin(Transform::eye())
    }
}

impl TrajectoryBuilder {
    /// Creates a builder whose first pose is `origin`.
    pub fn with_origin(origin: Transform) -> Self {
        let mut trajectory = Trajectory::default();
        trajectory.push(origin);
        Self { trajectory }
    }

    /// Right-multiplies the current pose by `step` and appends the result.
    pub fn accumulate(&mut self, step: &Transform) {
        let next = &self.current_camera_to_world() * step;
        self.trajectory.push(next);
    }

    /// Creates the trajectory at its current state.
    pub fn build(self) -> Trajectory {
        self.trajectory
    }

    /// Returns the current camera pose in the world frame.
    pub fn current_camera_to_world(&self) -> Transform {
        self.trajectory.last().cloned().unwrap_or_else(Transform::eye)
    }
}

impl Extend<Transform> for TrajectoryBuilder {
    fn extend<T: IntoIterator<Item = Transform>>(&mut self, iter: T) {
        for step in iter {
            self.accumulate(&step);
        }
    }
}

impl<'a> Extend<&'a Transform> for TrajectoryBuilder {
    fn extend<T: IntoIterator<Item = &'a Transform>>(&mut self, iter: T) {
        for step in iter {
            self.accumulate(step);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn test_accumulate_order() {
        let rotate = Transform::from_axis_angle(
            &Vector3::new(0.0, 0.0, std::f64::consts::FRAC_PI_2),
            &Vector3::zeros(),
        );
        let forward = Transform::from_axis_angle(&Vector3::zeros(), &Vector3::new(1.0, 0.0, 0.0));

        let mut builder = TrajectoryBuilder::default();
        builder.accumulate(&rotate);
        builder.accumulate(&forward);
        let trajectory = builder.build();

        assert_eq!(trajectory.len(), 3);
        // The second step moves along the x axis of the rotated camera.
        let position = trajectory[2].translation();
        assert!((position - Vector3::new(0.0, 1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_with_origin() {
        let origin = Transform::from_axis_angle(&Vector3::zeros(), &Vector3::new(0.0, 0.0, 5.0));
        let step = Transform::from_axis_angle(&Vector3::zeros(), &Vector3::new(0.0, 1.0, 0.0));

        let mut builder = TrajectoryBuilder::with_origin(origin.clone());
        builder.extend([step.clone(), step]);

        assert_eq!(builder.current_camera_to_world().translation(), Vector3::new(0.0, 2.0, 5.0));
        assert_eq!(builder.build()[0], origin);
    }
}
