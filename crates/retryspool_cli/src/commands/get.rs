//! Get command implementation.

use retryspool_data::{Background, DataBackend, FilesystemBackend, FilesystemConfig};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use tracing::info;

/// Runs the get command.
pub fn run(
    config: FilesystemConfig,
    id: &str,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let backend = FilesystemBackend::with_config(config)?;

    let copied = match output {
        Some(path) => {
            info!("Writing {} to {:?}", id, path);
            copy_blob(&backend, id, || Ok(Box::new(File::create(path)?) as Box<dyn Write>))?
        }
        None => copy_blob(&backend, id, || {
            Ok(Box::new(io::stdout().lock()) as Box<dyn Write>)
        })?,
    };

    info!("{} bytes read from {}", copied, id);
    backend.close()?;
    Ok(())
}

/// Copies the blob for `id` into the sink produced by `open_sink`.
///
/// The sink is only opened once the blob is known to exist, so a missing
/// blob never leaves an empty output file behind.
fn copy_blob<'a>(
    backend: &dyn DataBackend,
    id: &str,
    open_sink: impl FnOnce() -> io::Result<Box<dyn Write + 'a>>,
) -> Result<u64, Box<dyn std::error::Error>> {
    let mut reader = backend.data_reader(&Background, id)?;
    let mut sink = open_sink()?;
    let copied = io::copy(&mut reader, &mut sink)?;
    sink.flush()?;
    Ok(copied)
}
