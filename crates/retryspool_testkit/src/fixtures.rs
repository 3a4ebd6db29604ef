//! Test fixtures and backend helpers.
//!
//! Provides a filesystem backend rooted in a temporary directory that is
//! removed when the fixture is dropped.

use retryspool_data::{Background, DataBackend, FilesystemBackend, FilesystemConfig};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A filesystem backend over a temporary directory.
pub struct TestBackend {
    /// The backend instance.
    pub backend: FilesystemBackend,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: TempDir,
}

impl TestBackend {
    /// Creates a backend whose base path is `<tempdir>/spool`.
    pub fn new() -> Self {
        Self::with_config(|config| config)
    }

    /// Creates a backend after letting the caller adjust the configuration.
    pub fn with_config(configure: impl FnOnce(FilesystemConfig) -> FilesystemConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = configure(FilesystemConfig::new(temp_dir.path().join("spool")));
        let backend = FilesystemBackend::with_config(config).expect("Failed to open backend");

        Self {
            backend,
            _temp_dir: temp_dir,
        }
    }

    /// Returns the backend's base directory.
    pub fn path(&self) -> &Path {
        self.backend.base_path()
    }

    /// Returns true if a data file exists for `id`.
    pub fn blob_exists(&self, id: &str) -> bool {
        self.backend
            .data_path(id)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }

    /// Reads the full blob for `id`, panicking on any error.
    pub fn read_blob(&self, id: &str) -> Vec<u8> {
        let mut data = Vec::new();
        self.backend
            .data_reader(&Background, id)
            .expect("Failed to open blob")
            .read_to_end(&mut data)
            .expect("Failed to read blob");
        data
    }

    /// Lists every file and directory under the base path, relative to it
    /// and sorted.
    pub fn tree(&self) -> Vec<PathBuf> {
        let mut entries = Vec::new();
        collect_tree(self.path(), self.path(), &mut entries);
        entries.sort();
        entries
    }
}

impl Default for TestBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestBackend {
    type Target = FilesystemBackend;

    fn deref(&self) -> &Self::Target {
        &self.backend
    }
}

fn collect_tree(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) {
    let entries = fs::read_dir(dir).expect("Failed to list directory");
    for entry in entries {
        let path = entry.expect("Failed to read directory entry").path();
        let relative = path
            .strip_prefix(root)
            .expect("Entry outside root")
            .to_path_buf();
        out.push(relative);
        if path.is_dir() {
            collect_tree(root, &path, out);
        }
    }
}

/// Runs `f` with a fresh temporary backend.
pub fn with_temp_backend<F, R>(f: F) -> R
where
    F: FnOnce(&TestBackend) -> R,
{
    let fixture = TestBackend::new();
    f(&fixture)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_starts_empty() {
        let fixture = TestBackend::new();
        assert!(fixture.path().is_dir());
        assert!(fixture.tree().is_empty());
    }

    #[test]
    fn tree_lists_shards_and_files() {
        with_temp_backend(|fixture| {
            fixture
                .store_data(&Background, "ab1", &mut &b"x"[..])
                .unwrap();
            fixture.store_data(&Background, "q", &mut &b"y"[..]).unwrap();

            assert_eq!(
                fixture.tree(),
                vec![
                    PathBuf::from("ab"),
                    PathBuf::from("ab/ab1.data"),
                    PathBuf::from("misc"),
                    PathBuf::from("misc/q.data"),
                ]
            );
            assert!(fixture.blob_exists("ab1"));
            assert_eq!(fixture.read_blob("q"), b"y");
        });
    }
}
