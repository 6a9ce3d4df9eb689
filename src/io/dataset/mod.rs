mod core;
pub use self::core::{FramePairDataset, SubsetDataset};

mod endovis;
pub use endovis::{read_frame_manifest, EndovisSplit};

mod exported;
pub use exported::ExportedPoseOutputs;
