//! In-memory data backend for testing.

use crate::backend::{BlobWriter, DataBackend};
use crate::context::{self, Context};
use crate::error::{DataError, DataResult};
use crate::id;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io::{self, Cursor, Read, Write};
use std::sync::Arc;

#[derive(Debug, Default)]
struct State {
    closed: bool,
    next_generation: u64,
    blobs: HashMap<String, Blob>,
}

impl State {
    /// Replaces the blob for `id` and returns its generation.
    fn put(&mut self, id: &str, data: Arc<[u8]>) -> u64 {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.blobs.insert(id.to_string(), Blob { data, generation });
        generation
    }
}

/// A stored blob. Every store, writer acquisition or delete of an id
/// retires its current generation.
#[derive(Debug)]
struct Blob {
    data: Arc<[u8]>,
    generation: u64,
}

/// An in-memory data backend.
///
/// Applies the same id validation, cancellation, closed and not-found rules
/// as [`crate::FilesystemBackend`], which makes it suitable for:
/// - Unit tests of the retry pipeline
/// - Ephemeral spools that don't need persistence
///
/// # Thread Safety
///
/// This backend is thread-safe and can be shared across threads. Writers
/// commit their bytes when closed or dropped.
///
/// # Example
///
/// ```rust
/// use retryspool_data::{Background, DataBackend, InMemoryBackend};
/// use std::io::Write;
///
/// let backend = InMemoryBackend::new();
/// let mut writer = backend.data_writer(&Background, "msg-7").unwrap();
/// writer.write_all(b"test data").unwrap();
/// writer.close().unwrap();
/// assert_eq!(backend.total_size(), 9);
/// ```
#[derive(Debug, Default, Clone)]
pub struct InMemoryBackend {
    state: Arc<RwLock<State>>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().blobs.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total bytes stored across all blobs.
    #[must_use]
    pub fn total_size(&self) -> usize {
        self.state.read().blobs.values().map(|b| b.data.len()).sum()
    }

    /// Returns true if a blob is stored for `id`.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.state.read().blobs.contains_key(id)
    }

    fn prepare(ctx: &dyn Context, id: &str) -> DataResult<()> {
        id::validate_message_id(id)?;
        context::check(ctx)
    }
}

impl DataBackend for InMemoryBackend {
    fn store_data(&self, ctx: &dyn Context, id: &str, data: &mut dyn Read) -> DataResult<u64> {
        Self::prepare(ctx, id)?;

        let mut state = self.state.write();
        if state.closed {
            return Err(DataError::Closed);
        }

        let mut buffer = Vec::new();
        data.read_to_end(&mut buffer).map_err(|source| DataError::Source {
            id: id.to_string(),
            source,
        })?;
        let size = buffer.len() as u64;
        state.put(id, buffer.into());

        Ok(size)
    }

    fn data_reader(&self, ctx: &dyn Context, id: &str) -> DataResult<Box<dyn Read + Send>> {
        Self::prepare(ctx, id)?;

        let state = self.state.read();
        if state.closed {
            return Err(DataError::Closed);
        }

        state
            .blobs
            .get(id)
            .map(|blob| Box::new(Cursor::new(Arc::clone(&blob.data))) as Box<dyn Read + Send>)
            .ok_or_else(|| DataError::NotFound { id: id.to_string() })
    }

    fn data_writer(&self, ctx: &dyn Context, id: &str) -> DataResult<Box<dyn BlobWriter>> {
        Self::prepare(ctx, id)?;

        let mut state = self.state.write();
        if state.closed {
            return Err(DataError::Closed);
        }

        let generation = state.put(id, Arc::from(Vec::<u8>::new()));

        Ok(Box::new(MemoryBlobWriter {
            state: Arc::clone(&self.state),
            id: id.to_string(),
            generation,
            buffer: Vec::new(),
            committed: false,
        }))
    }

    fn delete_data(&self, ctx: &dyn Context, id: &str) -> DataResult<()> {
        Self::prepare(ctx, id)?;

        let mut state = self.state.write();
        if state.closed {
            return Err(DataError::Closed);
        }

        state.blobs.remove(id);
        Ok(())
    }

    fn close(&self) -> DataResult<()> {
        self.state.write().closed = true;
        Ok(())
    }
}

/// Buffers writes and publishes them as one blob.
///
/// The commit is dropped if the blob it was opened on has since been
/// deleted or replaced, like writes into an unlinked file.
#[derive(Debug)]
struct MemoryBlobWriter {
    state: Arc<RwLock<State>>,
    id: String,
    generation: u64,
    buffer: Vec<u8>,
    committed: bool,
}

impl MemoryBlobWriter {
    fn commit(&mut self) {
        if self.committed {
            return;
        }
        self.committed = true;

        let mut state = self.state.write();
        if let Some(blob) = state.blobs.get_mut(&self.id) {
            if blob.generation == self.generation {
                blob.data = Arc::from(std::mem::take(&mut self.buffer));
            }
        }
    }
}

impl Write for MemoryBlobWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl BlobWriter for MemoryBlobWriter {
    fn close(mut self: Box<Self>) -> DataResult<()> {
        self.commit();
        Ok(())
    }
}

impl Drop for MemoryBlobWriter {
    fn drop(&mut self) {
        self.commit();
    }
}
