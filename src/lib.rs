pub mod bin_utils;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod io;
pub mod metrics;
pub mod model;
pub mod pose_sequence;
pub mod trajectory;
pub mod trajectory_builder;
pub mod transform;

#[cfg(test)]
mod unit_test;

pub use config::{EvalParams, GroundTruthFormat, WindowPolicy};
pub use error::EvalError;
pub use evaluation::{evaluate_batch, evaluate_sequence, SequenceEvaluation, SequenceInput};
pub use metrics::{compute_ate, compute_re, WindowMetrics};
pub use pose_sequence::PoseSequence;
