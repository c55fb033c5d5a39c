//! File-storage abstraction and its object-storage backend.
//!
//! [`FilesystemAdapter`] is the generic interface application code writes
//! against. [`OssAdapter`] implements it on top of any [`ObjectClient`];
//! `aws_sdk_s3::Client` (for OSS and other S3-compatible services) and
//! [`MemoryClient`] are the bundled clients.
//!
//! Disks are resolved by driver name through a [`DriverRegistry`] and kept
//! for the life of the process in a [`DiskManager`].

pub mod adapter;
pub mod client;
pub mod manager;
pub mod memory;
pub mod oss;
pub mod registry;
pub mod s3;

pub use adapter::{ByteStream, FilesystemAdapter, ReadResponse, ReadStreamResponse};
pub use client::{ObjectClient, ObjectListing, ObjectSummary, PutOptions};
pub use manager::{DiskConfig, DiskManager, FilesystemsConfig};
pub use memory::{ClientOp, MemoryClient};
pub use oss::{create_oss_adapter, OssAdapter, OssConfig};
pub use registry::{create_default_registry, DriverFactory, DriverRegistry};
