//! Error types for data storage operations.

use crate::context::CancelReason;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for data storage operations.
pub type DataResult<T> = Result<T, DataError>;

/// Errors that can occur during data storage operations.
#[derive(Debug, Error)]
pub enum DataError {
    /// The message id was rejected before any I/O happened.
    #[error("invalid message id: {0}")]
    InvalidId(#[from] InvalidIdError),

    /// The backend has been closed.
    #[error("backend is closed")]
    Closed,

    /// The caller's context was done before the operation started.
    #[error("operation cancelled: {0}")]
    Cancelled(CancelReason),

    /// No data is stored for the message id.
    #[error("message data not found: {id}")]
    NotFound {
        /// The message id that was looked up.
        id: String,
    },

    /// Reading the caller's input stream failed.
    #[error("failed to read input for {id}: {source}")]
    Source {
        /// The message id being stored.
        id: String,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// An I/O error occurred.
    #[error("failed to {op} {}: {source}", .path.display())]
    Io {
        /// The step that failed.
        op: IoOp,
        /// The path the step operated on.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
}

impl DataError {
    pub(crate) fn io(op: IoOp, path: &Path, source: io::Error) -> Self {
        Self::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Returns true if no data exists for the requested id.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if the backend was closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Returns true if the caller's context was done.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

/// Reasons a message id is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidIdError {
    /// The id is the empty string.
    #[error("message id cannot be empty")]
    Empty,

    /// The id contains `..`.
    #[error("message id cannot contain '..'")]
    Traversal,

    /// The id contains `/` or `\`.
    #[error("message id cannot contain path separators")]
    Separator,

    /// The id is longer than [`crate::MAX_ID_LEN`] bytes.
    #[error("message id too long: {len} bytes (max {})", crate::MAX_ID_LEN)]
    TooLong {
        /// Length of the rejected id in bytes.
        len: usize,
    },
}

/// The filesystem step an [`DataError::Io`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOp {
    /// Creating the backend's base directory.
    CreateBaseDir,
    /// Creating a shard directory.
    CreateDir,
    /// Creating or truncating a data file.
    CreateFile,
    /// Opening a data file for reading.
    OpenFile,
    /// Copying bytes into a data file.
    Write,
    /// Syncing a data file to disk.
    Sync,
    /// Removing a data file.
    RemoveFile,
}

impl fmt::Display for IoOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self {
            Self::CreateBaseDir => "create base directory",
            Self::CreateDir => "create data directory",
            Self::CreateFile => "create data file",
            Self::OpenFile => "open data file",
            Self::Write => "write data",
            Self::Sync => "sync data file",
            Self::RemoveFile => "delete data file",
        };
        f.write_str(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_names_step_and_path() {
        let err = DataError::io(
            IoOp::CreateFile,
            Path::new("/spool/ab/abc.data"),
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(
            err.to_string(),
            "failed to create data file /spool/ab/abc.data: denied"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn source_error_names_id_only() {
        let err = DataError::Source {
            id: "msg-1".into(),
            source: io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"),
        };
        assert_eq!(err.to_string(), "failed to read input for msg-1: pipe closed");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn kind_helpers() {
        assert!(DataError::Closed.is_closed());
        assert!(DataError::NotFound { id: "x".into() }.is_not_found());
        assert!(DataError::Cancelled(CancelReason::Cancelled).is_cancelled());
        assert!(!DataError::Closed.is_not_found());
    }

    #[test]
    fn too_long_message() {
        let err = DataError::from(InvalidIdError::TooLong { len: 300 });
        assert_eq!(
            err.to_string(),
            "invalid message id: message id too long: 300 bytes (max 255)"
        );
    }
}
