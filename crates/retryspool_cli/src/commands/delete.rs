//! Delete command implementation.

use retryspool_data::{Background, DataBackend, FilesystemBackend, FilesystemConfig};
use tracing::info;

/// Runs the delete command.
///
/// Deleting an id with no stored blob succeeds.
pub fn run(config: FilesystemConfig, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let backend = FilesystemBackend::with_config(config)?;

    info!("Deleting {} from {:?}", id, backend.base_path());
    backend.delete_data(&Background, id)?;
    println!("Deleted {}", id);

    backend.close()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn delete_removes_blob_and_shard() {
        let dir = tempdir().unwrap();
        let backend = FilesystemBackend::open(dir.path()).unwrap();
        backend
            .store_data(&Background, "gone", &mut &b"x"[..])
            .unwrap();

        run(FilesystemConfig::new(dir.path()), "gone").unwrap();
        assert!(!dir.path().join("go").exists());
    }

    #[test]
    fn delete_missing_succeeds() {
        let dir = tempdir().unwrap();
        assert!(run(FilesystemConfig::new(dir.path()), "never-there").is_ok());
    }
}
