//! In-memory object-storage client for testing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use serde::Deserialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use ossdisk_common::{Acl, Error, ObjectMetadata, Result};

use crate::adapter::{ByteStream, FilesystemAdapter};
use crate::client::{ObjectClient, ObjectListing, ObjectSummary, PutOptions};
use crate::oss::OssAdapter;

/// Operations of [`ObjectClient`], used to inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientOp {
    Put,
    Get,
    Copy,
    Delete,
    DeleteMany,
    List,
    Head,
    GetAcl,
    PutAcl,
    Exists,
}

/// In-memory object.
#[derive(Debug, Clone)]
struct StoredObject {
    data: Vec<u8>,
    content_type: String,
    last_modified: DateTime<Utc>,
    etag: String,
    acl: Acl,
}

/// In-memory object-storage client.
///
/// Buckets are created on first write. Useful for testing and development;
/// all data is lost on drop. Clones share the same storage.
#[derive(Clone, Default)]
pub struct MemoryClient {
    buckets: Arc<RwLock<BTreeMap<String, BTreeMap<String, StoredObject>>>>,
    failing: Arc<RwLock<HashSet<ClientOp>>>,
    failing_prefixes: Arc<RwLock<HashSet<String>>>,
}

impl MemoryClient {
    /// Create a new empty memory client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call of `op` fail with a remote error.
    pub async fn fail(&self, op: ClientOp) {
        self.failing.write().await.insert(op);
    }

    /// Undo [`MemoryClient::fail`] for `op`.
    pub async fn recover(&self, op: ClientOp) {
        self.failing.write().await.remove(&op);
    }

    /// Make listings of `prefix`, and of any prefix below it, fail with a
    /// remote error. Other listings are unaffected.
    pub async fn fail_list_under(&self, prefix: impl Into<String>) {
        self.failing_prefixes.write().await.insert(prefix.into());
    }

    /// Number of objects stored in `bucket`.
    pub async fn object_count(&self, bucket: &str) -> usize {
        self.buckets
            .read()
            .await
            .get(bucket)
            .map(|objects| objects.len())
            .unwrap_or(0)
    }

    async fn check(&self, op: ClientOp, key: &str) -> Result<()> {
        if self.failing.read().await.contains(&op) {
            return Err(Error::Remote(format!(
                "injected failure for {:?} on {}",
                op, key
            )));
        }
        Ok(())
    }

    async fn stored(&self, bucket: &str, key: &str) -> Result<StoredObject> {
        self.buckets
            .read()
            .await
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .cloned()
            .ok_or_else(|| Error::Remote(format!("NoSuchKey: {}/{}", bucket, key)))
    }
}

#[async_trait]
impl ObjectClient for MemoryClient {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        options: PutOptions,
    ) -> Result<()> {
        self.check(ClientOp::Put, key).await?;

        let object = StoredObject {
            data: body,
            content_type: options
                .content_type
                .unwrap_or_else(|| "application/octet-stream".to_string()),
            last_modified: Utc::now(),
            etag: Uuid::new_v4().simple().to_string(),
            acl: options.acl.unwrap_or(Acl::Default),
        };

        self.buckets
            .write()
            .await
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), object);

        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        self.check(ClientOp::Get, key).await?;
        Ok(self.stored(bucket, key).await?.data)
    }

    async fn get_object_stream(&self, bucket: &str, key: &str) -> Result<ByteStream> {
        let data = self.get_object(bucket, key).await?;
        let stream = stream::once(async move { Ok(data) });
        Ok(Box::pin(stream))
    }

    async fn copy_object(&self, bucket: &str, from: &str, to: &str) -> Result<()> {
        self.check(ClientOp::Copy, from).await?;

        let mut object = self.stored(bucket, from).await?;
        object.last_modified = Utc::now();

        self.buckets
            .write()
            .await
            .entry(bucket.to_string())
            .or_default()
            .insert(to.to_string(), object);

        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.check(ClientOp::Delete, key).await?;

        if let Some(objects) = self.buckets.write().await.get_mut(bucket) {
            objects.remove(key);
        }
        Ok(())
    }

    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<()> {
        self.check(ClientOp::DeleteMany, bucket).await?;

        if keys.is_empty() {
            return Err(Error::Remote("MalformedXML: no keys to delete".to_string()));
        }

        if let Some(objects) = self.buckets.write().await.get_mut(bucket) {
            for key in keys {
                objects.remove(key);
            }
        }
        Ok(())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: &str,
    ) -> Result<ObjectListing> {
        self.check(ClientOp::List, prefix).await?;
        if self
            .failing_prefixes
            .read()
            .await
            .iter()
            .any(|failing| prefix.starts_with(failing.as_str()))
        {
            return Err(Error::Remote(format!(
                "injected listing failure under {}",
                prefix
            )));
        }

        let buckets = self.buckets.read().await;
        let mut listing = ObjectListing::default();

        let objects = match buckets.get(bucket) {
            Some(objects) => objects,
            None => return Ok(listing),
        };

        for (key, object) in objects.range(prefix.to_string()..) {
            let rest = match key.strip_prefix(prefix) {
                Some(rest) => rest,
                None => break,
            };

            let split = if delimiter.is_empty() {
                None
            } else {
                rest.find(delimiter)
            };

            match split {
                Some(idx) => {
                    let common = format!("{}{}", prefix, &rest[..idx + delimiter.len()]);
                    if listing.prefixes.last() != Some(&common) {
                        listing.prefixes.push(common);
                    }
                }
                None => listing.objects.push(ObjectSummary {
                    key: key.clone(),
                    size: object.data.len() as u64,
                    last_modified: object.last_modified,
                }),
            }
        }

        Ok(listing)
    }

    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata> {
        self.check(ClientOp::Head, key).await?;

        let object = self.stored(bucket, key).await?;
        Ok(ObjectMetadata {
            content_length: object.data.len() as u64,
            content_type: object.content_type,
            last_modified: object.last_modified,
            etag: Some(object.etag),
        })
    }

    async fn get_object_acl(&self, bucket: &str, key: &str) -> Result<Acl> {
        self.check(ClientOp::GetAcl, key).await?;
        Ok(self.stored(bucket, key).await?.acl)
    }

    async fn put_object_acl(&self, bucket: &str, key: &str, acl: Acl) -> Result<()> {
        self.check(ClientOp::PutAcl, key).await?;

        let mut buckets = self.buckets.write().await;
        let object = buckets
            .get_mut(bucket)
            .and_then(|objects| objects.get_mut(key))
            .ok_or_else(|| Error::Remote(format!("NoSuchKey: {}/{}", bucket, key)))?;
        object.acl = acl;
        Ok(())
    }

    async fn object_exists(&self, bucket: &str, key: &str) -> Result<bool> {
        self.check(ClientOp::Exists, key).await?;

        Ok(self
            .buckets
            .read()
            .await
            .get(bucket)
            .map(|objects| objects.contains_key(key))
            .unwrap_or(false))
    }
}

/// Settings for the `memory` driver.
#[derive(Debug, Clone, Deserialize)]
struct MemoryConfig {
    #[serde(default = "default_bucket")]
    bucket: String,
    #[serde(default)]
    host: Option<String>,
}

fn default_bucket() -> String {
    "memory".to_string()
}

/// Create an adapter over a fresh in-memory bucket.
///
/// `null` is accepted as an empty configuration. Without a `host`, URLs
/// are rooted at `http://localhost/<bucket>`.
pub fn create_memory_adapter(config: serde_json::Value) -> Result<Arc<dyn FilesystemAdapter>> {
    let config = if config.is_null() {
        serde_json::json!({})
    } else {
        config
    };
    let memory_config: MemoryConfig = serde_json::from_value(config)
        .map_err(|e| Error::InvalidInput(format!("Invalid memory config: {}", e)))?;

    let host = memory_config
        .host
        .unwrap_or_else(|| format!("http://localhost/{}", memory_config.bucket));

    Ok(Arc::new(OssAdapter::new(
        MemoryClient::new(),
        memory_config.bucket,
        host,
    )))
}
