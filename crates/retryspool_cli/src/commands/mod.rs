//! CLI command implementations.

pub mod delete;
pub mod get;
pub mod path;
pub mod put;
