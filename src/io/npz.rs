//! Compressed `.npz` archives of pose arrays.
//!
//! Archives hold a single array under the key `"data"`, the layout written by
//! `numpy.savez_compressed(path, data=...)`. Poses are stored as `[N, 4, 4]`
//! and raw network outputs as `[N, 6]`. Both `f64` and `f32` archives are read.

use std::{fs::File, path::Path};

use nalgebra::Matrix4;
use ndarray::{Array2, Array3, ArrayD, Axis};
use ndarray_npy::{NpzReader, NpzWriter, ReadNpzError};

use crate::{
    error::EvalError,
    transform::{PoseParams, Transform},
};

/// Key of the array inside every archive.
pub const DATA_KEY: &str = "data";

fn read_error(path: &Path) -> impl FnOnce(ReadNpzError) -> EvalError + '_ {
    move |source| EvalError::ArchiveRead {
        path: path.to_path_buf(),
        source,
    }
}

/// Reads the `"data"` array of an archive as `f64`, converting `f32` archives.
pub fn read_data_array<P: AsRef<Path>>(path: P) -> Result<ArrayD<f64>, EvalError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(EvalError::file_open(path))?;
    let mut npz = NpzReader::new(file).map_err(read_error(path))?;

    let name = npz
        .names()
        .map_err(read_error(path))?
        .into_iter()
        .find(|name| name == DATA_KEY || name.strip_suffix(".npy") == Some(DATA_KEY))
        .ok_or_else(|| {
            EvalError::Parser(format!("{} has no '{DATA_KEY}' array", path.display()))
        })?;

    let as_f64: Result<ArrayD<f64>, _> = npz.by_name(&name);
    match as_f64 {
        Ok(array) => Ok(array),
        Err(f64_err) => {
            let as_f32: Result<ArrayD<f32>, _> = npz.by_name(&name);
            as_f32
                .map(|array| array.mapv(f64::from))
                .map_err(|_| read_error(path)(f64_err))
        }
    }
}

/// Reads a `[N, 4, 4]` pose archive.
pub fn read_poses<P: AsRef<Path>>(path: P) -> Result<Vec<Transform>, EvalError> {
    let path = path.as_ref();
    let array = read_data_array(path)?;
    let shape = array.shape();
    if shape.len() != 3 || shape[1] != 4 || shape[2] != 4 {
        return Err(EvalError::shape_mismatch(format!(
            "{} has shape {:?}, expected [N, 4, 4]",
            path.display(),
            shape
        )));
    }

    Ok(array
        .axis_iter(Axis(0))
        .map(|pose| Transform::from_matrix4(&Matrix4::from_fn(|r, c| pose[[r, c]])))
        .collect())
}

/// Reads a `[N, 6]` archive of network outputs, axis-angle first.
pub fn read_pose_params<P: AsRef<Path>>(path: P) -> Result<Vec<PoseParams>, EvalError> {
    let path = path.as_ref();
    let array = read_data_array(path)?;
    let shape = array.shape();
    if shape.len() != 2 || shape[1] != 6 {
        return Err(EvalError::shape_mismatch(format!(
            "{} has shape {:?}, expected [N, 6]",
            path.display(),
            shape
        )));
    }

    Ok(array
        .axis_iter(Axis(0))
        .map(|row| PoseParams::from_row(&[row[0], row[1], row[2], row[3], row[4], row[5]]))
        .collect())
}

/// Writes poses as a compressed `[N, 4, 4]` archive.
///
/// Parent directories are created and an existing archive is replaced.
pub fn write_poses<P: AsRef<Path>>(path: P, poses: &[Transform]) -> Result<(), EvalError> {
    let mut array = Array3::<f64>::zeros((poses.len(), 4, 4));
    for (mut dst, pose) in array.axis_iter_mut(Axis(0)).zip(poses) {
        let matrix = pose.matrix();
        dst.indexed_iter_mut()
            .for_each(|((r, c), value)| *value = matrix[(r, c)]);
    }
    write_array(path.as_ref(), &array)
}

/// Writes network outputs as a compressed `[N, 6]` archive.
pub fn write_pose_params<P: AsRef<Path>>(path: P, params: &[PoseParams]) -> Result<(), EvalError> {
    let mut array = Array2::<f64>::zeros((params.len(), 6));
    for (mut row, param) in array.axis_iter_mut(Axis(0)).zip(params) {
        for i in 0..3 {
            row[i] = param.axis_angle[i];
            row[i + 3] = param.translation[i];
        }
    }
    write_array(path.as_ref(), &array)
}

fn write_array<S, D>(path: &Path, array: &ndarray::ArrayBase<S, D>) -> Result<(), EvalError>
where
    S: ndarray::Data<Elem = f64>,
    D: ndarray::Dimension,
{
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let write_error = |source| EvalError::ArchiveWrite {
        path: path.to_path_buf(),
        source,
    };
    let mut npz = NpzWriter::new_compressed(File::create(path)?);
    npz.add_array(DATA_KEY, array).map_err(write_error)?;
    npz.finish().map_err(write_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn sample_poses() -> Vec<Transform> {
        vec![
            Transform::eye(),
            Transform::from_axis_angle(&Vector3::new(0.1, -0.2, 0.3), &Vector3::new(1.0, 2.0, 3.0)),
        ]
    }

    #[test]
    fn test_write_read_poses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trajectories/model/pred_poses_sequence1.npz");

        write_poses(&path, &sample_poses()).unwrap();
        assert_eq!(read_poses(&path).unwrap(), sample_poses());
    }

    #[test]
    fn test_write_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("poses.npz");

        write_poses(&path, &sample_poses()).unwrap();
        write_poses(&path, &[Transform::eye()]).unwrap();
        assert_eq!(read_poses(&path).unwrap(), vec![Transform::eye()]);
    }

    #[test]
    fn test_read_f32_params() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outputs.npz");
        let array = ndarray::array![[0.0f32, 0.0, 0.5, 1.0, 2.0, 3.0]];
        {
            let mut npz = NpzWriter::new_compressed(File::create(&path).unwrap());
            npz.add_array(DATA_KEY, &array).unwrap();
            npz.finish().unwrap();
        }

        let params = read_pose_params(&path).unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].axis_angle, Vector3::new(0.0, 0.0, 0.5));
        assert_eq!(params[0].translation, Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_shape_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outputs.npz");
        write_pose_params(&path, &[PoseParams::from_row(&[0.0; 6])]).unwrap();

        assert!(matches!(read_poses(&path), Err(EvalError::ShapeMismatch(_))));
    }

    #[test]
    fn test_missing_archive() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_poses(dir.path().join("missing.npz")),
            Err(EvalError::FileOpen { path, .. }) if path.ends_with("missing.npz")
        ));
    }
}
