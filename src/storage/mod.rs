pub mod extent;
pub mod persistence;

pub use extent::{Entity, Extent, Extents, Keyed};
pub use persistence::{ExtentSnapshot, SnapshotManager, SnapshotMetadata};
