use std::path::Path;

use serde_derive::{Deserialize, Serialize};

use crate::error::EvalError;

/// How ground truth archives are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroundTruthFormat {
    /// One absolute camera-to-world pose per frame. Converted into per-step
    /// transforms before windowing.
    #[default]
    Absolute,
    /// Entries are already per-step transforms and are accumulated directly.
    Relative,
}

/// Which windows are scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowPolicy {
    /// Only windows with `track_length - 1` steps.
    #[default]
    Full,
    /// Also scores the shortened windows at the end of the sequence.
    Truncated,
}

/// Parameters of the windowed evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalParams {
    /// Number of frames per window.
    pub track_length: usize,
    pub ground_truth: GroundTruthFormat,
    pub window_policy: WindowPolicy,
}

impl Default for EvalParams {
    fn default() -> Self {
        Self {
            track_length: 5,
            ground_truth: GroundTruthFormat::default(),
            window_policy: WindowPolicy::default(),
        }
    }
}

impl EvalParams {
    pub fn track_length(&'_ mut self, value: usize) -> &'_ mut EvalParams {
        self.track_length = value;
        self
    }

    pub fn ground_truth(&'_ mut self, value: GroundTruthFormat) -> &'_ mut EvalParams {
        self.ground_truth = value;
        self
    }

    pub fn window_policy(&'_ mut self, value: WindowPolicy) -> &'_ mut EvalParams {
        self.window_policy = value;
        self
    }

    /// Number of relative transforms in a full window.
    pub fn window_steps(&self) -> usize {
        self.track_length.saturating_sub(1)
    }

    pub fn validate(&self) -> Result<(), EvalError> {
        if self.track_length < 2 {
            return Err(EvalError::invalid_parameter(format!(
                "track_length must be at least 2, got {}",
                self.track_length
            )));
        }
        Ok(())
    }

    /// Loads parameters from a JSON file. Missing fields take their default value.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, EvalError> {
        let buffer = std::io::BufReader::new(std::fs::File::open(path.as_ref())?);
        let params: Self =
            serde_json::from_reader(buffer).map_err(|err| EvalError::Parser(err.to_string()))?;
        params.validate()?;
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let params = EvalParams::default();
        assert_eq!(params.track_length, 5);
        assert_eq!(params.window_steps(), 4);
        assert_eq!(params.ground_truth, GroundTruthFormat::Absolute);
        assert_eq!(params.window_policy, WindowPolicy::Full);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_setters() {
        let mut params = EvalParams::default();
        params
            .track_length(1)
            .ground_truth(GroundTruthFormat::Relative)
            .window_policy(WindowPolicy::Truncated);

        assert_eq!(params.ground_truth, GroundTruthFormat::Relative);
        assert!(matches!(params.validate(), Err(EvalError::InvalidParameter(_))));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"track_length": 7, "ground_truth": "relative"}}"#).unwrap();

        let params = EvalParams::from_json_file(file.path()).unwrap();
        assert_eq!(params.track_length, 7);
        assert_eq!(params.ground_truth, GroundTruthFormat::Relative);
        assert_eq!(params.window_policy, WindowPolicy::Full);
    }

    #[test]
    fn test_from_json_file_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"window_policy": "sometimes"}}"#).unwrap();

        assert!(matches!(
            EvalParams::from_json_file(file.path()),
            Err(EvalError::Parser(_))
        ));
    }
}
