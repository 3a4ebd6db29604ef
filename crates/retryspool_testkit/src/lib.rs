//! # Retryspool Testkit
//!
//! Test utilities for retryspool data backends.
//!
//! This crate provides:
//! - Temporary-directory fixtures for the filesystem backend
//! - Property-based test generators using proptest
//! - Concurrent stress helpers
//!
//! ## Usage
//!
//! ```rust
//! use retryspool_data::{Background, DataBackend};
//! use retryspool_testkit::prelude::*;
//!
//! let fixture = TestBackend::new();
//! fixture.store_data(&Background, "msg-1", &mut &b"hi"[..]).unwrap();
//! assert!(fixture.blob_exists("msg-1"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
}

pub use fixtures::*;
pub use generators::*;
pub use stress::*;
