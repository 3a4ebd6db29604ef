//! Data backend trait definition.

use crate::context::Context;
use crate::error::DataResult;
use std::io::{Read, Write};

/// Message data storage used by the retry pipeline.
///
/// Backends are **opaque blob stores**. Each message id maps to exactly one
/// blob; the pipeline parks payloads here between delivery attempts and
/// owns all retry policy.
///
/// # Invariants
///
/// - Ids are validated before any I/O; a rejected id leaves storage untouched
/// - A context that is already done fails the call before any I/O
/// - `store_data` replaces prior content entirely and reports the byte count
/// - `delete_data` succeeds when nothing is stored for the id
/// - After `close`, every operation fails with [`crate::DataError::Closed`]
///
/// # Implementors
///
/// - [`crate::FilesystemBackend`] - For persistent storage
/// - [`crate::InMemoryBackend`] - For testing
pub trait DataBackend: Send + Sync {
    /// Copies `data` into the blob for `id`, replacing any prior content.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The id is invalid
    /// - The backend is closed or the context is done
    /// - Creating the blob or copying the stream fails
    fn store_data(&self, ctx: &dyn Context, id: &str, data: &mut dyn Read) -> DataResult<u64>;

    /// Opens the blob for `id` for reading from the start.
    ///
    /// Dropping the reader releases it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DataError::NotFound`] if nothing is stored for `id`,
    /// and the usual validation, closed, cancellation and I/O errors otherwise.
    fn data_reader(&self, ctx: &dyn Context, id: &str) -> DataResult<Box<dyn Read + Send>>;

    /// Creates or truncates the blob for `id` and hands back a writer.
    ///
    /// The caller writes incrementally and calls [`BlobWriter::close`] to
    /// finalize.
    ///
    /// # Errors
    ///
    /// Same as the create path of [`DataBackend::store_data`].
    fn data_writer(&self, ctx: &dyn Context, id: &str) -> DataResult<Box<dyn BlobWriter>>;

    /// Removes the blob for `id`.
    ///
    /// Succeeds if nothing was stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is invalid, the backend is closed, the
    /// context is done, or removal fails for a reason other than not-found.
    fn delete_data(&self, ctx: &dyn Context, id: &str) -> DataResult<()>;

    /// Closes the backend. Safe to call more than once.
    ///
    /// # Errors
    ///
    /// Implementations may report a failure to release resources.
    fn close(&self) -> DataResult<()>;
}

/// A writable handle returned by [`DataBackend::data_writer`].
pub trait BlobWriter: Write + Send {
    /// Flushes buffered bytes and finalizes the blob.
    ///
    /// Dropping the writer without calling `close` still releases it, but
    /// any error from finalizing is lost.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing or syncing fails.
    fn close(self: Box<Self>) -> DataResult<()>;
}
