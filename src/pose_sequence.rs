use std::{ops::Index, path::Path};

use crate::{error::EvalError, io::npz, trajectory::Trajectory, transform::Transform};

/// Relative transforms between consecutive frames of one sequence.
///
/// Entry `i` maps frame `i + 1` into frame `i`, so accumulating them from the
/// identity yields camera-to-world poses anchored at the first frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PoseSequence {
    steps: Vec<Transform>,
}

impl PoseSequence {
    pub fn new(steps: Vec<Transform>) -> Self {
        Self { steps }
    }

    /// Number of frame pairs.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of frames covered, one more than the number of pairs.
    pub fn num_frames(&self) -> usize {
        self.steps.len() + 1
    }

    pub fn steps(&self) -> &[Transform] {
        &self.steps
    }

    /// Absolute trajectory of the whole sequence.
    pub fn trajectory(&self) -> Trajectory {
        Trajectory::from_relative(&self.steps)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, EvalError> {
        Ok(Self::new(npz::read_poses(path)?))
    }

    /// Writes the sequence as a `[N, 4, 4]` archive, replacing any previous one.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), EvalError> {
        npz::write_poses(path, &self.steps)
    }
}

impl From<Vec<Transform>> for PoseSequence {
    fn from(steps: Vec<Transform>) -> Self {
        Self::new(steps)
    }
}

impl FromIterator<Transform> for PoseSequence {
    fn from_iter<T: IntoIterator<Item = Transform>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Index<usize> for PoseSequence {
    type Output = Transform;

    fn index(&self, index: usize) -> &Self::Output {
        &self.steps[index]
    }
}
