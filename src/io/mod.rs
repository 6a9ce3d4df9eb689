pub mod dataset;
pub mod npz;
pub use npz::{read_pose_params, read_poses, write_pose_params, write_poses};
