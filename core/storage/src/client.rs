//! Remote object-storage client interface.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use ossdisk_common::{Acl, ObjectMetadata, Result};

use crate::adapter::ByteStream;

/// Options attached to an upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutOptions {
    /// `Content-Type` stored with the object.
    pub content_type: Option<String>,
    /// Base64 MD5 of the body, checked by the service on receipt.
    pub content_md5: Option<String>,
    /// Canned ACL applied on upload.
    pub acl: Option<Acl>,
}

/// One object returned by a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    pub key: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

/// Result of listing a prefix with a delimiter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectListing {
    /// Objects directly under the prefix.
    pub objects: Vec<ObjectSummary>,
    /// Common prefixes one delimiter level below the prefix.
    pub prefixes: Vec<String>,
}

/// Remote object-storage client.
///
/// Every call names its bucket. All failures surface as
/// [`ossdisk_common::Error::Remote`].
#[async_trait]
pub trait ObjectClient: Send + Sync {
    /// Upload `body` under `key`.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        options: PutOptions,
    ) -> Result<()>;

    /// Download the full body of `key`.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;

    /// Download `key` as a stream of chunks.
    async fn get_object_stream(&self, bucket: &str, key: &str) -> Result<ByteStream>;

    /// Server-side copy within one bucket.
    async fn copy_object(&self, bucket: &str, from: &str, to: &str) -> Result<()>;

    /// Delete a single object. Deleting a missing key is not an error.
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()>;

    /// Delete many objects in as few requests as the service allows.
    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<()>;

    /// List everything under `prefix`, grouping deeper keys by `delimiter`.
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: &str,
    ) -> Result<ObjectListing>;

    /// Fetch head metadata of `key`.
    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata>;

    /// Read the canned ACL of `key`.
    async fn get_object_acl(&self, bucket: &str, key: &str) -> Result<Acl>;

    /// Apply a canned ACL to `key`.
    async fn put_object_acl(&self, bucket: &str, key: &str, acl: Acl) -> Result<()>;

    /// Check whether `key` exists. A missing object is `Ok(false)`.
    async fn object_exists(&self, bucket: &str, key: &str) -> Result<bool>;
}
