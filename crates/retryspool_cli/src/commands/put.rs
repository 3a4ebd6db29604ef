//! Put command implementation.

use retryspool_data::{Background, DataBackend, DataResult, FilesystemBackend, FilesystemConfig};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::info;

/// Runs the put command.
pub fn run(
    config: FilesystemConfig,
    id: &str,
    file: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let backend = FilesystemBackend::with_config(config)?;

    let written = match file {
        Some(path) => {
            info!("Storing {:?} as {}", path, id);
            store(&backend, id, &mut File::open(path)?)?
        }
        None => store(&backend, id, &mut io::stdin().lock())?,
    };

    println!("{} bytes written to {}", written, id);
    backend.close()?;
    Ok(())
}

fn store(backend: &dyn DataBackend, id: &str, source: &mut dyn Read) -> DataResult<u64> {
    backend.store_data(&Background, id, source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn put_from_file() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("payload.eml");
        std::fs::write(&input, b"Subject: hi\r\n\r\nbody").unwrap();
        let base = dir.path().join("spool");

        run(FilesystemConfig::new(&base), "queued-1", Some(&input)).unwrap();

        let stored = std::fs::read(base.join("qu").join("queued-1.data")).unwrap();
        assert_eq!(stored, b"Subject: hi\r\n\r\nbody");
    }

    #[test]
    fn put_rejects_bad_id() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("payload");
        std::fs::write(&input, b"x").unwrap();

        let result = run(FilesystemConfig::new(dir.path()), "../escape", Some(&input));
        assert!(result.is_err());
    }
}
