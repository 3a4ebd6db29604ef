//! Factories that build data backends for the retry pipeline.

use crate::backend::DataBackend;
use crate::config::FilesystemConfig;
use crate::error::DataResult;
use crate::file::FilesystemBackend;
use crate::memory::InMemoryBackend;
use std::path::Path;

/// Builds configured [`DataBackend`]s on demand.
pub trait DataStorageFactory: Send + Sync {
    /// Creates a new backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be initialized.
    fn create(&self) -> DataResult<Box<dyn DataBackend>>;

    /// Returns the registry name of this factory.
    fn name(&self) -> &'static str;
}

/// Factory for [`FilesystemBackend`].
#[derive(Debug, Clone)]
pub struct FilesystemFactory {
    config: FilesystemConfig,
}

impl FilesystemFactory {
    /// Creates a factory for backends rooted at `base_path`.
    #[must_use]
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self::from_config(FilesystemConfig::new(base_path))
    }

    /// Creates a factory from a full configuration.
    #[must_use]
    pub fn from_config(config: FilesystemConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration used for new backends.
    #[must_use]
    pub fn config(&self) -> &FilesystemConfig {
        &self.config
    }
}

impl DataStorageFactory for FilesystemFactory {
    fn create(&self) -> DataResult<Box<dyn DataBackend>> {
        Ok(Box::new(FilesystemBackend::with_config(self.config.clone())?))
    }

    fn name(&self) -> &'static str {
        "filesystem-data"
    }
}

/// Factory for [`InMemoryBackend`]. Every call yields an empty store.
#[derive(Debug, Clone, Copy, Default)]
pub struct InMemoryFactory;

impl DataStorageFactory for InMemoryFactory {
    fn create(&self) -> DataResult<Box<dyn DataBackend>> {
        Ok(Box::new(InMemoryBackend::new()))
    }

    fn name(&self) -> &'static str {
        "memory-data"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Background;
    use std::io::Read;
    use tempfile::tempdir;

    #[test]
    fn filesystem_factory_creates_backend() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("data");
        let factory = FilesystemFactory::new(&base);

        assert_eq!(factory.name(), "filesystem-data");
        let backend = factory.create().unwrap();
        assert!(base.is_dir());

        backend
            .store_data(&Background, "factory", &mut &b"built"[..])
            .unwrap();

        let second = factory.create().unwrap();
        let mut data = Vec::new();
        second
            .data_reader(&Background, "factory")
            .unwrap()
            .read_to_end(&mut data)
            .unwrap();
        assert_eq!(&data, b"built");
    }

    #[test]
    fn filesystem_factory_propagates_open_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();

        let factory = FilesystemFactory::from_config(FilesystemConfig::new(&blocker));
        assert!(factory.create().is_err());
    }

    #[test]
    fn memory_factory_yields_fresh_stores() {
        let factory = InMemoryFactory;
        assert_eq!(factory.name(), "memory-data");

        let first = factory.create().unwrap();
        first
            .store_data(&Background, "only-here", &mut &b"x"[..])
            .unwrap();

        let second = factory.create().unwrap();
        let result = second.data_reader(&Background, "only-here");
        assert!(result.err().unwrap().is_not_found());
    }
}
