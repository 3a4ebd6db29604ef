//! Path command implementation.

use retryspool_data::{data_path, validate_message_id, FilesystemConfig};

/// Runs the path command.
///
/// Derives the path without opening the store, so nothing is created.
pub fn run(config: FilesystemConfig, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    validate_message_id(id)?;
    let path = data_path(&config.base_path, id);

    let state = if path.is_file() { "stored" } else { "missing" };
    println!("{}\t{}", path.display(), state);
    Ok(())
}
