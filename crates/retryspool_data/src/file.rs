//! Filesystem backend for persistent message data.

use crate::backend::{BlobWriter, DataBackend};
use crate::config::FilesystemConfig;
use crate::context::{self, Context};
use crate::error::{DataError, DataResult, IoOp};
use crate::id;
use parking_lot::RwLock;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// A filesystem-backed data store.
///
/// Each blob lives in its own file under a two-level sharded tree rooted at
/// the base path. Data survives process restarts and is readable by any
/// later backend opened on the same base path.
///
/// # Thread Safety
///
/// One `RwLock` guards the closed flag. Stores, writer acquisition, deletes
/// and `close` take it exclusively; reads take it shared. A read racing a
/// store of the same id may observe a partially written file.
///
/// The backend assumes it is the only writer in its base directory.
///
/// # Example
///
/// ```no_run
/// use retryspool_data::{Background, DataBackend, FilesystemBackend};
///
/// let backend = FilesystemBackend::open("/var/spool/retry/data").unwrap();
/// backend.store_data(&Background, "msg-42", &mut &b"payload"[..]).unwrap();
/// backend.delete_data(&Background, "msg-42").unwrap();
/// ```
#[derive(Debug)]
pub struct FilesystemBackend {
    base_path: PathBuf,
    dir_mode: u32,
    sync_on_write: bool,
    closed: RwLock<bool>,
}

impl FilesystemBackend {
    /// Opens a backend rooted at `base_path` with default settings.
    ///
    /// Creates the directory and any missing ancestors.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created, for example
    /// when permission is denied or a regular file is in the way.
    pub fn open(base_path: impl AsRef<Path>) -> DataResult<Self> {
        Self::with_config(FilesystemConfig::new(base_path))
    }

    /// Opens a backend from a full configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base directory cannot be created.
    pub fn with_config(config: FilesystemConfig) -> DataResult<Self> {
        create_dirs(&config.base_path, config.dir_mode)
            .map_err(|source| DataError::io(IoOp::CreateBaseDir, &config.base_path, source))?;

        debug!(base_path = %config.base_path.display(), "opened filesystem data backend");

        Ok(Self {
            base_path: config.base_path,
            dir_mode: config.dir_mode,
            sync_on_write: config.sync_on_write,
            closed: RwLock::new(false),
        })
    }

    /// Returns the base directory.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Returns the data file path for `id` without touching the disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is invalid.
    pub fn data_path(&self, id: &str) -> DataResult<PathBuf> {
        id::validate_message_id(id)?;
        Ok(id::data_path(&self.base_path, id))
    }

    /// Returns true once [`DataBackend::close`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        *self.closed.read()
    }

    fn prepare(&self, ctx: &dyn Context, id: &str) -> DataResult<PathBuf> {
        let path = self.data_path(id)?;
        context::check(ctx)?;
        Ok(path)
    }

    fn create_data_file(&self, path: &Path) -> DataResult<File> {
        self.create_data_file_with(path, |p| File::create(p))
    }

    /// Creates the shard directory, then opens the file with `create`.
    fn create_data_file_with(
        &self,
        path: &Path,
        mut create: impl FnMut(&Path) -> io::Result<File>,
    ) -> DataResult<File> {
        let dir = path.parent().unwrap_or(&self.base_path);
        let mut retried = false;

        loop {
            create_dirs(dir, self.dir_mode)
                .map_err(|source| DataError::io(IoOp::CreateDir, dir, source))?;

            match create(path) {
                Ok(file) => return Ok(file),
                // The shard directory was reclaimed between mkdir and create.
                Err(err) if err.kind() == io::ErrorKind::NotFound && !retried => {
                    debug!(path = %path.display(), "data directory vanished, retrying");
                    retried = true;
                }
                Err(source) => return Err(DataError::io(IoOp::CreateFile, path, source)),
            }
        }
    }

    /// Removes empty directories from `start` upward, stopping at the base.
    ///
    /// Best effort: any failure ends the walk without being reported.
    fn cleanup_empty_dirs(&self, start: &Path) {
        let mut dir = start;

        while dir != self.base_path && dir.starts_with(&self.base_path) {
            match fs::read_dir(dir) {
                Ok(mut entries) => {
                    if entries.next().is_some() {
                        return;
                    }
                }
                Err(err) => {
                    trace!(dir = %dir.display(), error = %err, "skipping cleanup");
                    return;
                }
            }

            if let Err(err) = fs::remove_dir(dir) {
                trace!(dir = %dir.display(), error = %err, "could not remove empty directory");
                return;
            }
            trace!(dir = %dir.display(), "removed empty directory");

            match dir.parent() {
                Some(parent) => dir = parent,
                None => return,
            }
        }
    }
}

impl DataBackend for FilesystemBackend {
    fn store_data(&self, ctx: &dyn Context, id: &str, data: &mut dyn Read) -> DataResult<u64> {
        let path = self.prepare(ctx, id)?;

        let closed = self.closed.write();
        if *closed {
            return Err(DataError::Closed);
        }

        let mut file = self.create_data_file(&path)?;
        let size = io::copy(data, &mut file).map_err(|e| DataError::io(IoOp::Write, &path, e))?;
        if self.sync_on_write {
            file.sync_all()
                .map_err(|e| DataError::io(IoOp::Sync, &path, e))?;
        }

        debug!(id, size, "stored message data");
        Ok(size)
    }

    fn data_reader(&self, ctx: &dyn Context, id: &str) -> DataResult<Box<dyn Read + Send>> {
        let path = self.prepare(ctx, id)?;

        let closed = self.closed.read();
        if *closed {
            return Err(DataError::Closed);
        }

        match File::open(&path) {
            Ok(file) => Ok(Box::new(file)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(DataError::NotFound { id: id.to_string() })
            }
            Err(err) => Err(DataError::io(IoOp::OpenFile, &path, err)),
        }
    }

    fn data_writer(&self, ctx: &dyn Context, id: &str) -> DataResult<Box<dyn BlobWriter>> {
        let path = self.prepare(ctx, id)?;

        let closed = self.closed.write();
        if *closed {
            return Err(DataError::Closed);
        }

        let file = self.create_data_file(&path)?;
        debug!(id, "opened data writer");

        Ok(Box::new(FileBlobWriter {
            file,
            path,
            sync_on_close: self.sync_on_write,
        }))
    }

    fn delete_data(&self, ctx: &dyn Context, id: &str) -> DataResult<()> {
        let path = self.prepare(ctx, id)?;

        let closed = self.closed.write();
        if *closed {
            return Err(DataError::Closed);
        }

        match fs::remove_file(&path) {
            Ok(()) => debug!(id, "deleted message data"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(DataError::io(IoOp::RemoveFile, &path, err)),
        }

        if let Some(dir) = path.parent() {
            self.cleanup_empty_dirs(dir);
        }
        Ok(())
    }

    fn close(&self) -> DataResult<()> {
        *self.closed.write() = true;
        Ok(())
    }
}

/// Writer handed out by [`FilesystemBackend::data_writer`].
#[derive(Debug)]
struct FileBlobWriter {
    file: File,
    path: PathBuf,
    sync_on_close: bool,
}

impl Write for FileBlobWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl BlobWriter for FileBlobWriter {
    fn close(mut self: Box<Self>) -> DataResult<()> {
        self.file
            .flush()
            .map_err(|e| DataError::io(IoOp::Write, &self.path, e))?;
        if self.sync_on_close {
            self.file
                .sync_all()
                .map_err(|e| DataError::io(IoOp::Sync, &self.path, e))?;
        }
        Ok(())
    }
}

#[cfg(unix)]
fn create_dirs(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(mode).create(path)
}

#[cfg(not(unix))]
fn create_dirs(path: &Path, _mode: u32) -> io::Result<()> {
    fs::create_dir_all(path)
}
