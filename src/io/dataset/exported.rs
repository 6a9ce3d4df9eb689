use std::path::{Path, PathBuf};

use super::FramePairDataset;
use crate::{error::EvalError, io::npz, transform::PoseParams};

/// Pose network outputs exported by the inference frontend, one per frame pair.
///
/// The network runs on its own accelerated backend and stores, for every
/// sequence, the decoder's axis-angle and translation per frame pair in
/// `<weights>/pose_outputs/sequence{n}.npz` as a `[N, 6]` array.
pub struct ExportedPoseOutputs {
    outputs: Vec<PoseParams>,
}

impl ExportedPoseOutputs {
    pub fn path<P: AsRef<Path>>(weights_folder: P, sequence: usize) -> PathBuf {
        weights_folder
            .as_ref()
            .join("pose_outputs")
            .join(format!("sequence{sequence}.npz"))
    }

    pub fn load<P: AsRef<Path>>(weights_folder: P, sequence: usize) -> Result<Self, EvalError> {
        Ok(Self {
            outputs: npz::read_pose_params(Self::path(weights_folder, sequence))?,
        })
    }

    /// Checks that there is one output per manifest entry.
    pub fn check_manifest(&self, frames: &[String]) -> Result<(), EvalError> {
        if self.outputs.len() != frames.len() {
            return Err(EvalError::shape_mismatch(format!(
                "{} pose outputs for {} manifest entries",
                self.outputs.len(),
                frames.len()
            )));
        }
        Ok(())
    }
}

impl From<Vec<PoseParams>> for ExportedPoseOutputs {
    fn from(outputs: Vec<PoseParams>) -> Self {
        Self { outputs }
    }
}

impl FramePairDataset for ExportedPoseOutputs {
    type Item = PoseParams;

    fn len(&self) -> usize {
        self.outputs.len()
    }

    fn get(&self, index: usize) -> Result<PoseParams, EvalError> {
        self.outputs.get(index).cloned().ok_or_else(|| {
            EvalError::invalid_parameter(format!(
                "Pair {index} out of range for {} outputs",
                self.outputs.len()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load() {
        let dir = tempfile::tempdir().unwrap();
        let outputs = vec![
            PoseParams::from_row(&[0.0, 0.0, 0.1, 0.0, 0.0, 1.0]),
            PoseParams::from_row(&[0.0, 0.2, 0.0, 1.0, 0.0, 0.0]),
        ];
        npz::write_pose_params(ExportedPoseOutputs::path(dir.path(), 2), &outputs).unwrap();

        let dataset = ExportedPoseOutputs::load(dir.path(), 2).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.get(1).unwrap(), outputs[1]);
        assert!(dataset.get(2).is_err());

        let frames = vec!["a".to_string(), "b".to_string()];
        assert!(dataset.check_manifest(&frames).is_ok());
        assert!(matches!(
            dataset.check_manifest(&frames[..1]),
            Err(EvalError::ShapeMismatch(_))
        ));
    }
}
