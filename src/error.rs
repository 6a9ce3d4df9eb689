use std::path::PathBuf;

use ndarray_npy::{ReadNpzError, WriteNpzError};
use thiserror::Error;

/// Main error type for the library.
#[derive(Debug, Error)]
pub enum EvalError {
    /// Used when the user pass a logical invalid parameter to a function.
    #[error("Parameter error: {0}")]
    InvalidParameter(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parser error: {0}")]
    Parser(String),

    #[error("Cannot open {}: {source}", .path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Archive read error on {}: {source}", .path.display())]
    ArchiveRead {
        path: PathBuf,
        #[source]
        source: ReadNpzError,
    },

    #[error("Archive write error on {}: {source}", .path.display())]
    ArchiveWrite {
        path: PathBuf,
        #[source]
        source: WriteNpzError,
    },

    /// Weights folder or one of its mandatory files is missing.
    #[error("Cannot find {}", .0.display())]
    MissingWeights(PathBuf),

    /// The sequence has fewer frames than one evaluation window needs.
    #[error("Sequence has {frames} frames, but a window needs {track_length}")]
    SequenceTooShort { frames: usize, track_length: usize },

    /// The predicted trajectory has no motion, so the alignment scale is undefined.
    #[error("Degenerate scale: predicted trajectory has zero extent ({denominator:e})")]
    DegenerateScale { denominator: f64 },

    /// Positions contain NaN or infinite values.
    #[error("Non-finite {0} positions")]
    NonFinite(String),

    /// A rotation matrix could not be inverted.
    #[error("Singular rotation matrix at index {0}")]
    SingularRotation(usize),

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),
}

impl EvalError {
    /// Create a error with the kind `InvalidParameter`.
    /// # Arguments
    /// * `msg` - The error message.
    pub fn invalid_parameter<T: ToString>(msg: T) -> Self {
        EvalError::InvalidParameter(msg.to_string())
    }

    /// Create a error with the kind `FileOpen`.
    pub fn file_open<P: AsRef<std::path::Path>>(path: P) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        move |source| EvalError::FileOpen { path, source }
    }

    /// Create a error with the kind `ShapeMismatch`.
    pub fn shape_mismatch<T: ToString>(msg: T) -> Self {
        EvalError::ShapeMismatch(msg.to_string())
    }
}
