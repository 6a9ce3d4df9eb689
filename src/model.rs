use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::{
    error::EvalError,
    io::dataset::FramePairDataset,
    pose_sequence::PoseSequence,
    transform::{PoseParams, Transform},
};

/// Pose network: predicts the relative motion of a frame pair.
///
/// Implementations may block while the network runs on a device.
pub trait PoseModel {
    type Input;

    fn predict(&self, frames: &Self::Input) -> Result<PoseParams, EvalError>;
}

/// Model for inputs that already are decoded network outputs.
#[derive(Clone, Copy, Debug, Default)]
pub struct DecodedPoseModel;

impl PoseModel for DecodedPoseModel {
    type Input = PoseParams;

    fn predict(&self, frames: &PoseParams) -> Result<PoseParams, EvalError> {
        Ok(frames.clone())
    }
}

/// Runs `model` over the frame pairs of `dataset`.
///
/// `indices` must yield `0..dataset.len()` in order; it is taken as an iterator
/// so callers can wrap it in a progress bar. Pairs are predicted one after the
/// other since their order defines the accumulated geometry.
pub fn predict_sequence<D, M, I>(dataset: &D, model: &M, indices: I) -> Result<PoseSequence, EvalError>
where
    D: FramePairDataset,
    M: PoseModel<Input = D::Item>,
    I: IntoIterator<Item = usize>,
{
    let mut steps: Vec<Transform> = Vec::with_capacity(dataset.len());
    for (expected, index) in indices.into_iter().enumerate() {
        if index != expected {
            return Err(EvalError::invalid_parameter(format!(
                "Frame pairs must be predicted in order: got {index}, expected {expected}"
            )));
        }
        let frames = dataset.get(index)?;
        steps.push(model.predict(&frames)?.to_transform());
    }

    if steps.len() != dataset.len() {
        return Err(EvalError::invalid_parameter(format!(
            "Predicted {} of {} frame pairs",
            steps.len(),
            dataset.len()
        )));
    }

    debug!("Predicted {} frame pairs", steps.len());
    Ok(PoseSequence::new(steps))
}

/// Weight artifacts of the pose network, one field per sub-network.
#[derive(Clone, Debug)]
pub struct PoseNetworkWeights {
    /// Frame encoder.
    pub pose_encoder: PathBuf,
    /// Pose decoder.
    pub pose_decoder: PathBuf,
    /// Intrinsics decoder, not used for pose evaluation.
    pub intrinsics_head: Option<PathBuf>,
}

impl PoseNetworkWeights {
    pub const POSE_ENCODER: &'static str = "pose_encoder.pth";
    pub const POSE_DECODER: &'static str = "pose.pth";
    pub const INTRINSICS_HEAD: &'static str = "intrinsics_head.pth";

    /// Locates the weight files inside `folder`.
    ///
    /// Fails if the folder or the encoder/decoder weights are missing.
    pub fn locate<P: AsRef<Path>>(folder: P) -> Result<Self, EvalError> {
        let folder = folder.as_ref();
        if !folder.is_dir() {
            return Err(EvalError::MissingWeights(folder.to_path_buf()));
        }

        let required = |name: &str| {
            let path = folder.join(name);
            if path.is_file() {
                Ok(path)
            } else {
                Err(EvalError::MissingWeights(path))
            }
        };

        let intrinsics_head = Some(folder.join(Self::INTRINSICS_HEAD)).filter(|path| path.is_file());
        if intrinsics_head.is_none() {
            warn!("No {} in {}", Self::INTRINSICS_HEAD, folder.display());
        }

        Ok(Self {
            pose_encoder: required(Self::POSE_ENCODER)?,
            pose_decoder: required(Self::POSE_DECODER)?,
            intrinsics_head,
        })
    }
}
