//! Whole-graph snapshot persistence for the extent registry

use crate::core::{Result, StoreError};
use crate::storage::Extents;
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

// ============================================================================
// Extent Snapshot
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ExtentSnapshot {
    pub extents: Extents,
    pub metadata: SnapshotMetadata,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub created_at: DateTime<Utc>,
    pub entity_count: usize,
}

// ============================================================================
// Snapshot Manager
// ============================================================================

pub struct SnapshotManager {
    snapshot_path: PathBuf,
    sync_on_save: bool,
}

impl SnapshotManager {
    pub fn new<P: AsRef<Path>>(snapshot_path: P) -> Self {
        Self {
            snapshot_path: snapshot_path.as_ref().to_path_buf(),
            sync_on_save: true,
        }
    }

    pub fn sync_on_save(mut self, sync: bool) -> Self {
        self.sync_on_save = sync;
        self
    }

    pub fn path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Writes the snapshot next to the target and renames it into place, so a
    /// failed save never touches the previously saved file.
    pub fn save(&self, extents: &Extents) -> Result<()> {
        let dir = match self.snapshot_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)
            .map_err(|e| StoreError::persistence("Failed to create snapshot directory", e))?;

        let snapshot = SnapshotRef {
            extents,
            metadata: SnapshotMetadata {
                created_at: Utc::now(),
                entity_count: extents.total(),
            },
        };
        let serialized = rmp_serde::to_vec(&snapshot)
            .map_err(|e| StoreError::persistence("Failed to serialize snapshot", e))?;

        let temp_file = NamedTempFile::new_in(&dir)
            .map_err(|e| StoreError::persistence("Failed to create temp file", e))?;
        {
            let mut writer = BufWriter::new(temp_file.as_file());
            writer
                .write_all(&serialized)
                .map_err(|e| StoreError::persistence("Failed to write snapshot", e))?;
            writer
                .flush()
                .map_err(|e| StoreError::persistence("Failed to flush snapshot", e))?;
        }
        if self.sync_on_save {
            temp_file
                .as_file()
                .sync_all()
                .map_err(|e| StoreError::persistence("Failed to sync snapshot", e))?;
        }
        temp_file
            .persist(&self.snapshot_path)
            .map_err(|e| StoreError::persistence("Failed to rename snapshot", e.error))?;

        info!(
            "Saved {} entities to {}",
            extents.total(),
            self.snapshot_path.display()
        );
        Ok(())
    }

    pub fn load(&self) -> Result<Option<ExtentSnapshot>> {
        if !self.snapshot_path.exists() {
            debug!("No snapshot at {}", self.snapshot_path.display());
            return Ok(None);
        }
        let mut file = File::open(&self.snapshot_path)
            .map_err(|e| StoreError::persistence("Failed to open snapshot", e))?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)
            .map_err(|e| StoreError::persistence("Failed to read snapshot", e))?;
        let snapshot: ExtentSnapshot = rmp_serde::from_slice(&data)
            .map_err(|e| StoreError::persistence("Failed to deserialize snapshot", e))?;
        info!(
            "Loaded {} entities from {} (saved {})",
            snapshot.metadata.entity_count,
            self.snapshot_path.display(),
            snapshot.metadata.created_at
        );
        Ok(Some(snapshot))
    }

    pub fn exists(&self) -> bool {
        self.snapshot_path.exists()
    }

    pub fn delete(&self) -> Result<()> {
        if self.snapshot_path.exists() {
            fs::remove_file(&self.snapshot_path)
                .map_err(|e| StoreError::persistence("Failed to delete snapshot", e))?;
        }
        Ok(())
    }
}

/// Borrowing twin of [`ExtentSnapshot`]; encodes identically so saving does
/// not need to clone the registry.
#[derive(Serialize)]
struct SnapshotRef<'a> {
    extents: &'a Extents,
    metadata: SnapshotMetadata,
}
