//! # Retryspool Data
//!
//! Message data storage for the retryspool pipeline.
//!
//! The pipeline parks message payloads here between delivery attempts.
//! Backends are **opaque blob stores** keyed by message id - they do not
//! interpret the bytes they hold and keep no index of what they store.
//!
//! ## Design Principles
//!
//! - One blob per message id; a later store replaces the earlier one
//! - Ids are validated before any path is derived or any I/O happens
//! - Deleting a missing blob succeeds, so callers can clean up blindly
//! - Backends are `Send + Sync` and shared across caller threads
//!
//! ## Available Backends
//!
//! - [`FilesystemBackend`] - Persistent storage in a sharded directory tree
//! - [`InMemoryBackend`] - For testing the pipeline without a disk
//!
//! ## On-disk Layout
//!
//! ```text
//! <base_path>/
//! ├─ ab/abcdef.data    # ids of two or more bytes, sharded by prefix
//! └─ misc/x.data       # ids shorter than two bytes
//! ```
//!
//! ## Example
//!
//! ```rust
//! use retryspool_data::{Background, DataBackend, InMemoryBackend};
//! use std::io::Read;
//!
//! let backend = InMemoryBackend::new();
//! let written = backend
//!     .store_data(&Background, "msg-1", &mut &b"hello world"[..])
//!     .unwrap();
//! assert_eq!(written, 11);
//!
//! let mut data = Vec::new();
//! backend
//!     .data_reader(&Background, "msg-1")
//!     .unwrap()
//!     .read_to_end(&mut data)
//!     .unwrap();
//! assert_eq!(&data, b"hello world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod config;
mod context;
mod error;
mod factory;
mod file;
mod id;
mod memory;

pub use backend::{BlobWriter, DataBackend};
pub use config::{FilesystemConfig, DEFAULT_DIR_MODE};
pub use context::{Background, CancelReason, CancelToken, Context, Deadline};
pub use error::{DataError, DataResult, InvalidIdError, IoOp};
pub use factory::{DataStorageFactory, FilesystemFactory, InMemoryFactory};
pub use file::FilesystemBackend;
pub use id::{data_path, validate_message_id, DATA_EXTENSION, MAX_ID_LEN, MISC_SHARD};
pub use memory::InMemoryBackend;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
