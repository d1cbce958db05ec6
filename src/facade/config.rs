use std::path::{Path, PathBuf};

/// Default snapshot file name, relative to the working directory.
pub const DEFAULT_SNAPSHOT_FILE: &str = "extent";

/// Store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// File the whole registry is saved to and loaded from
    pub snapshot_path: PathBuf,

    /// fsync the snapshot before renaming it into place
    pub sync_on_save: bool,

    /// Load the snapshot (if present) when the store is opened
    pub load_on_open: bool,
}

impl StoreConfig {
    /// Create a configuration persisting to `snapshot_path`
    pub fn new<P: AsRef<Path>>(snapshot_path: P) -> Self {
        Self {
            snapshot_path: snapshot_path.as_ref().to_path_buf(),
            sync_on_save: true,
            load_on_open: true,
        }
    }

    /// Set the snapshot path
    pub fn snapshot_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.snapshot_path = path.as_ref().to_path_buf();
        self
    }

    /// Set whether saves are synced to disk
    pub fn sync_on_save(mut self, sync: bool) -> Self {
        self.sync_on_save = sync;
        self
    }

    /// Set whether opening the store loads an existing snapshot
    pub fn load_on_open(mut self, load: bool) -> Self {
        self.load_on_open = load;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SNAPSHOT_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.snapshot_path, PathBuf::from("extent"));
        assert!(config.sync_on_save);
        assert!(config.load_on_open);
    }

    #[test]
    fn test_config_builder() {
        let config = StoreConfig::new("/tmp/a")
            .snapshot_path("/tmp/b")
            .sync_on_save(false)
            .load_on_open(false);

        assert_eq!(config.snapshot_path, PathBuf::from("/tmp/b"));
        assert!(!config.sync_on_save);
        assert!(!config.load_on_open);
    }
}
