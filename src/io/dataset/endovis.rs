use std::{
    io::BufRead,
    path::{Path, PathBuf},
};

use crate::{error::EvalError, io::npz, transform::Transform};

/// Reads a frame manifest, one frame identifier per line.
///
/// Blank lines and lines starting with `#` are skipped.
pub fn read_frame_manifest<P: AsRef<Path>>(filepath: P) -> Result<Vec<String>, EvalError> {
    let filepath = filepath.as_ref();
    let file = std::fs::File::open(filepath).map_err(EvalError::file_open(filepath))?;
    let reader = std::io::BufReader::new(file);
    let mut frames = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        frames.push(line.to_string());
    }

    Ok(frames)
}

/// File layout of the EndoVis (SCARED) evaluation split.
///
/// ```text
/// <root>/test_files_sequence{n}.txt
/// <root>/trajectories/gt/gt_poses_sequence{n}.npz
/// <root>/trajectories/<model_type>/pred_poses_sequence{n}.npz
/// ```
#[derive(Clone, Debug)]
pub struct EndovisSplit {
    root: PathBuf,
}

impl EndovisSplit {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest_path(&self, sequence: usize) -> PathBuf {
        self.root.join(format!("test_files_sequence{sequence}.txt"))
    }

    pub fn gt_poses_path(&self, sequence: usize) -> PathBuf {
        self.root
            .join("trajectories")
            .join("gt")
            .join(format!("gt_poses_sequence{sequence}.npz"))
    }

    pub fn pred_poses_path(&self, model_type: &str, sequence: usize) -> PathBuf {
        self.root
            .join("trajectories")
            .join(model_type)
            .join(format!("pred_poses_sequence{sequence}.npz"))
    }

    pub fn read_manifest(&self, sequence: usize) -> Result<Vec<String>, EvalError> {
        read_frame_manifest(self.manifest_path(sequence))
    }

    /// Loads the ground truth poses of a sequence.
    pub fn load_ground_truth(&self, sequence: usize) -> Result<Vec<Transform>, EvalError> {
        let poses = npz::read_poses(self.gt_poses_path(sequence))?;
        if poses.is_empty() {
            return Err(EvalError::shape_mismatch(format!(
                "Ground truth of sequence {sequence} is empty"
            )));
        }
        Ok(poses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_paths() {
        let split = EndovisSplit::new("splits/endovis");

        assert_eq!(
            split.manifest_path(2),
            PathBuf::from("splits/endovis/test_files_sequence2.txt")
        );
        assert_eq!(
            split.gt_poses_path(1),
            PathBuf::from("splits/endovis/trajectories/gt/gt_poses_sequence1.npz")
        );
        assert_eq!(
            split.pred_poses_path("endodac", 4),
            PathBuf::from("splits/endovis/trajectories/endodac/pred_poses_sequence4.npz")
        );
    }

    #[test]
    fn test_read_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let split = EndovisSplit::new(dir.path());
        {
            let mut file = std::fs::File::create(split.manifest_path(1)).unwrap();
            writeln!(file, "dataset8/keyframe0 0 l").unwrap();
            writeln!(file).unwrap();
            writeln!(file, "# comment").unwrap();
            writeln!(file, "dataset8/keyframe0 1 l  ").unwrap();
        }

        assert_eq!(
            split.read_manifest(1).unwrap(),
            vec!["dataset8/keyframe0 0 l", "dataset8/keyframe0 1 l"]
        );
        assert!(matches!(
            split.read_manifest(2),
            Err(EvalError::FileOpen { path, .. }) if path == split.manifest_path(2)
        ));
    }

    #[test]
    fn test_load_empty_ground_truth() {
        let dir = tempfile::tempdir().unwrap();
        let split = EndovisSplit::new(dir.path());
        npz::write_poses(split.gt_poses_path(3), &[]).unwrap();

        assert!(matches!(
            split.load_ground_truth(3),
            Err(EvalError::ShapeMismatch(_))
        ));
    }
}
