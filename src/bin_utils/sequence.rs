use std::path::PathBuf;

use kdam::tqdm;
use log::info;

use crate::{
    error::EvalError,
    evaluation::SequenceInput,
    io::dataset::{EndovisSplit, ExportedPoseOutputs, FramePairDataset, SubsetDataset},
    model::{predict_sequence, DecodedPoseModel},
    pose_sequence::PoseSequence,
};

/// Where the predicted poses of a sequence come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PredictionSource {
    /// Decoder outputs exported next to the weights. The accumulated
    /// prediction archive is (re)written.
    ExportedOutputs,
    /// Prediction archive written by an earlier run.
    SavedPredictions,
}

/// Gathers predictions and ground truth of the split's sequences.
pub struct SequenceLoader {
    pub split: EndovisSplit,
    pub weights_folder: PathBuf,
    pub model_type: String,
    pub source: PredictionSource,
    /// Only use the first frame pairs of every sequence.
    pub max_pairs: Option<usize>,
    pub show_progress: bool,
}

impl SequenceLoader {
    /// Predicted poses of `sequence`.
    pub fn predict(&self, sequence: usize) -> Result<PoseSequence, EvalError> {
        let pred_path = self.split.pred_poses_path(&self.model_type, sequence);
        let max_pairs = self.max_pairs.unwrap_or(usize::MAX);

        match self.source {
            PredictionSource::SavedPredictions => {
                let saved = PoseSequence::load(&pred_path)?;
                info!("Loaded {} poses from {}", saved.len(), pred_path.display());
                Ok(saved.steps().iter().take(max_pairs).cloned().collect())
            }
            PredictionSource::ExportedOutputs => {
                let frames = self.split.read_manifest(sequence)?;
                let outputs = ExportedPoseOutputs::load(&self.weights_folder, sequence)?;
                outputs.check_manifest(&frames)?;

                let dataset = SubsetDataset::head(outputs, max_pairs);
                let num_pairs = dataset.len();
                let indices: Box<dyn Iterator<Item = usize>> = if self.show_progress {
                    Box::new(tqdm!(0..num_pairs, total = num_pairs, desc = "Predicting poses"))
                } else {
                    Box::new(0..num_pairs)
                };
                let predicted = predict_sequence(&dataset, &DecodedPoseModel, indices)?;

                predicted.save(&pred_path)?;
                info!("Saved {} poses to {}", predicted.len(), pred_path.display());
                Ok(predicted)
            }
        }
    }

    /// Predictions and ground truth of `sequence`.
    pub fn load(&self, sequence: usize) -> Result<SequenceInput, EvalError> {
        let predicted = self.predict(sequence)?;
        let ground_truth = self.split.load_ground_truth(sequence)?;
        Ok(SequenceInput {
            id: sequence,
            predicted,
            ground_truth,
        })
    }
}
