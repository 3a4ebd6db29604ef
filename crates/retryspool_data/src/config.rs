//! Filesystem backend configuration.

use std::path::{Path, PathBuf};

/// Default permission bits for created directories (`rwxr-xr-x`).
pub const DEFAULT_DIR_MODE: u32 = 0o755;

/// Configuration for opening a [`crate::FilesystemBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilesystemConfig {
    /// Root directory of the store.
    pub base_path: PathBuf,

    /// Permission bits for created directories (Unix only, before umask).
    pub dir_mode: u32,

    /// Whether to `fsync` each blob before reporting it written.
    pub sync_on_write: bool,
}

impl FilesystemConfig {
    /// Creates a configuration rooted at `base_path` with default settings.
    #[must_use]
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            dir_mode: DEFAULT_DIR_MODE,
            sync_on_write: false,
        }
    }

    /// Sets the permission bits for created directories.
    #[must_use]
    pub const fn dir_mode(mut self, mode: u32) -> Self {
        self.dir_mode = mode;
        self
    }

    /// Sets whether blobs are synced to disk before a write is reported.
    #[must_use]
    pub const fn sync_on_write(mut self, value: bool) -> Self {
        self.sync_on_write = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = FilesystemConfig::new("/var/spool/data");
        assert_eq!(config.base_path, PathBuf::from("/var/spool/data"));
        assert_eq!(config.dir_mode, 0o755);
        assert!(!config.sync_on_write);
    }

    #[test]
    fn builder_pattern() {
        let config = FilesystemConfig::new("spool")
            .dir_mode(0o700)
            .sync_on_write(true);

        assert_eq!(config.dir_mode, 0o700);
        assert!(config.sync_on_write);
    }
}
