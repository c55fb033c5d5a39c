//! Common utilities and types shared across the ossdisk crates.
//!
//! This module provides the error type and the value types that travel
//! between the storage abstraction, the remote client and the CLI.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    Acl, ObjectKind, ObjectMetadata, ObjectRecord, Secret, Visibility, WriteOptions,
};
