//! Object-storage adapter.
//!
//! Implements [`FilesystemAdapter`] on top of any [`ObjectClient`] by
//! translating each operation into one call, or a short fixed sequence of
//! calls, against a single bucket.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;
use chrono::Utc;
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use ossdisk_common::{
    Error, ObjectKind, ObjectMetadata, ObjectRecord, Result, Secret, Visibility, WriteOptions,
};

use crate::adapter::{ByteStream, FilesystemAdapter, ReadResponse, ReadStreamResponse};
use crate::client::{ObjectClient, ObjectSummary, PutOptions};

/// Separator used to emulate directories in the flat key space.
const DELIMITER: &str = "/";

/// Connection settings for the `oss` driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OssConfig {
    /// Access key id.
    pub access_id: String,
    /// Access key secret.
    pub access_key: Secret,
    /// Service endpoint, with or without scheme.
    pub endpoint: String,
    /// Bucket all operations run against.
    pub bucket: String,
    /// Base URL used by `get_url`.
    pub host: String,
    /// Signing region.
    #[serde(default = "default_region")]
    pub region: String,
    /// Address the bucket in the path instead of the host name.
    #[serde(default)]
    pub path_style: bool,
}

fn default_region() -> String {
    "oss-cn-hangzhou".to_string()
}

/// Object-storage adapter.
///
/// Holds no mutable state; one instance can be shared across tasks.
pub struct OssAdapter<C: ObjectClient> {
    client: C,
    bucket: String,
    host: String,
}

impl<C: ObjectClient> OssAdapter<C> {
    /// Create an adapter bound to one bucket.
    pub fn new(client: C, bucket: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            host: host.into(),
        }
    }

    /// Get the underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }

    fn put_options(path: &str, contents: &[u8], options: &WriteOptions) -> PutOptions {
        let content_type = options
            .mimetype
            .clone()
            .unwrap_or_else(|| guess_mimetype(path));

        PutOptions {
            content_type: Some(content_type),
            content_md5: Some(B64.encode(md5::compute(contents).0)),
            acl: options.visibility.map(Visibility::to_acl),
        }
    }

    fn to_record(summary: ObjectSummary) -> ObjectRecord {
        ObjectRecord {
            kind: ObjectKind::from_key(&summary.key),
            path: summary.key,
            size: summary.size,
            timestamp: summary.last_modified.timestamp(),
        }
    }

    /// List one level under `directory`, descending into common prefixes
    /// when `recursive`. A failed listing contributes nothing, at any depth.
    fn list_level<'a>(
        &'a self,
        directory: &'a str,
        recursive: bool,
    ) -> BoxFuture<'a, Vec<ObjectRecord>> {
        async move {
            let listing = match self
                .client
                .list_objects(&self.bucket, directory, DELIMITER)
                .await
            {
                Ok(listing) => listing,
                Err(e) => {
                    warn!(directory, error = %e, "listing failed, returning no entries");
                    return Vec::new();
                }
            };

            let mut records: Vec<ObjectRecord> =
                listing.objects.into_iter().map(Self::to_record).collect();

            if !recursive {
                return records;
            }

            for prefix in &listing.prefixes {
                records.extend(self.list_level(prefix, true).await);
            }

            records
        }
        .boxed()
    }

    async fn drain(mut stream: ByteStream) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        while let Some(chunk) = stream.next().await {
            data.extend_from_slice(&chunk?);
        }
        Ok(data)
    }
}

/// Guess a content type from the extension of `path`.
pub fn guess_mimetype(path: &str) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

#[async_trait]
impl<C: ObjectClient> FilesystemAdapter for OssAdapter<C> {
    fn name(&self) -> &str {
        "oss"
    }

    async fn write(
        &self,
        path: &str,
        contents: Vec<u8>,
        options: &WriteOptions,
    ) -> Result<ObjectRecord> {
        debug!(bucket = %self.bucket, path, size = contents.len(), "put object");

        let put = Self::put_options(path, &contents, options);
        let size = contents.len() as u64;
        self.client
            .put_object(&self.bucket, path, contents, put)
            .await?;

        Ok(ObjectRecord {
            kind: ObjectKind::File,
            path: path.to_string(),
            size,
            timestamp: Utc::now().timestamp(),
        })
    }

    async fn write_stream(
        &self,
        path: &str,
        stream: ByteStream,
        options: &WriteOptions,
    ) -> Result<ObjectRecord> {
        let contents = Self::drain(stream).await?;
        self.write(path, contents, options).await
    }

    async fn update(
        &self,
        path: &str,
        contents: Vec<u8>,
        options: &WriteOptions,
    ) -> Result<ObjectRecord> {
        self.write(path, contents, options).await
    }

    async fn update_stream(
        &self,
        path: &str,
        stream: ByteStream,
        options: &WriteOptions,
    ) -> Result<ObjectRecord> {
        self.write_stream(path, stream, options).await
    }

    async fn read(&self, path: &str) -> Result<ReadResponse> {
        debug!(bucket = %self.bucket, path, "get object");

        let contents = self.client.get_object(&self.bucket, path).await?;
        Ok(ReadResponse {
            kind: ObjectKind::File,
            path: path.to_string(),
            contents,
        })
    }

    async fn read_stream(&self, path: &str) -> Result<ReadStreamResponse> {
        debug!(bucket = %self.bucket, path, "get object stream");

        let stream = self.client.get_object_stream(&self.bucket, path).await?;
        Ok(ReadStreamResponse {
            kind: ObjectKind::File,
            path: path.to_string(),
            stream,
        })
    }

    async fn rename(&self, path: &str, new_path: &str) -> Result<bool> {
        if !self.copy(path, new_path).await {
            return Ok(false);
        }

        // No rollback: a failed delete leaves the copy behind.
        self.delete(path).await
    }

    async fn copy(&self, path: &str, new_path: &str) -> bool {
        debug!(bucket = %self.bucket, from = path, to = new_path, "copy object");

        match self.client.copy_object(&self.bucket, path, new_path).await {
            Ok(()) => true,
            Err(e) => {
                warn!(from = path, to = new_path, error = %e, "copy failed");
                false
            }
        }
    }

    async fn delete(&self, path: &str) -> Result<bool> {
        debug!(bucket = %self.bucket, path, "delete object");

        self.client.delete_object(&self.bucket, path).await?;
        Ok(!self.has(path).await?)
    }

    async fn delete_dir(&self, dirname: &str) -> bool {
        let paths: Vec<String> = self
            .list_contents(dirname, true)
            .await
            .into_iter()
            .map(|record| record.path)
            .collect();

        debug!(bucket = %self.bucket, dirname, count = paths.len(), "delete objects");

        if paths.is_empty() {
            return true;
        }

        if let Err(e) = self.client.delete_objects(&self.bucket, &paths).await {
            warn!(dirname, error = %e, "batch delete failed");
        }

        true
    }

    async fn create_dir(&self, dirname: &str, options: &WriteOptions) -> Result<ObjectRecord> {
        let key = format!("{}{}", dirname.trim_end_matches(DELIMITER), DELIMITER);
        debug!(bucket = %self.bucket, key = %key, "create directory marker");

        let put = PutOptions {
            acl: options.visibility.map(Visibility::to_acl),
            ..Default::default()
        };
        self.client
            .put_object(&self.bucket, &key, Vec::new(), put)
            .await?;

        Ok(ObjectRecord {
            kind: ObjectKind::Dir,
            path: dirname.to_string(),
            size: 0,
            timestamp: Utc::now().timestamp(),
        })
    }

    async fn set_visibility(&self, path: &str, visibility: Visibility) -> bool {
        debug!(bucket = %self.bucket, path, %visibility, "put object acl");

        match self
            .client
            .put_object_acl(&self.bucket, path, visibility.to_acl())
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(path, error = %e, "setting visibility failed");
                false
            }
        }
    }

    async fn has(&self, path: &str) -> Result<bool> {
        self.client.object_exists(&self.bucket, path).await
    }

    async fn list_contents(&self, directory: &str, recursive: bool) -> Vec<ObjectRecord> {
        debug!(bucket = %self.bucket, directory, recursive, "list objects");
        self.list_level(directory, recursive).await
    }

    async fn get_metadata(&self, path: &str) -> Result<ObjectMetadata> {
        debug!(bucket = %self.bucket, path, "head object");
        self.client.head_object(&self.bucket, path).await
    }

    async fn get_size(&self, path: &str) -> Result<u64> {
        Ok(self.get_metadata(path).await?.content_length)
    }

    async fn get_mimetype(&self, path: &str) -> Result<String> {
        Ok(self.get_metadata(path).await?.content_type)
    }

    async fn get_timestamp(&self, path: &str) -> Result<i64> {
        Ok(self.get_metadata(path).await?.last_modified.timestamp())
    }

    async fn get_visibility(&self, path: &str) -> Visibility {
        match self.client.get_object_acl(&self.bucket, path).await {
            Ok(acl) => Visibility::from_acl(acl),
            Err(e) => {
                warn!(path, error = %e, "reading visibility failed, assuming private");
                Visibility::Private
            }
        }
    }

    fn get_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            return path.to_string();
        }

        format!(
            "{}/{}",
            self.host.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Create an `oss` adapter from driver configuration.
pub fn create_oss_adapter(config: serde_json::Value) -> Result<Arc<dyn FilesystemAdapter>> {
    let oss_config: OssConfig = serde_json::from_value(config)
        .map_err(|e| Error::InvalidInput(format!("Invalid OSS config: {}", e)))?;

    let client = crate::s3::build_client(&oss_config);

    Ok(Arc::new(OssAdapter::new(
        client,
        oss_config.bucket.clone(),
        oss_config.host.clone(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{ClientOp, MemoryClient};
    use futures::stream;
    use ossdisk_common::Acl;
    use proptest::prelude::*;

    const BUCKET: &str = "media";
    const HOST: &str = "https://media.oss-cn-hangzhou.aliyuncs.com/";

    fn adapter() -> OssAdapter<MemoryClient> {
        OssAdapter::new(MemoryClient::new(), BUCKET, HOST)
    }

    async fn write(adapter: &OssAdapter<MemoryClient>, path: &str, data: &[u8]) {
        adapter
            .write(path, data.to_vec(), &WriteOptions::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_write_then_has() {
        let adapter = adapter();
        assert!(!adapter.has("a.txt").await.unwrap());

        let record = adapter
            .write("a.txt", b"hello".to_vec(), &WriteOptions::default())
            .await
            .unwrap();
        assert_eq!(record.kind, ObjectKind::File);
        assert_eq!(record.size, 5);

        assert!(adapter.has("a.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_write_guesses_mimetype() {
        let adapter = adapter();
        write(&adapter, "img/logo.png", b"png").await;
        write(&adapter, "notes.txt", b"text").await;
        write(&adapter, "blob", b"raw").await;

        assert_eq!(adapter.get_mimetype("img/logo.png").await.unwrap(), "image/png");
        assert_eq!(adapter.get_mimetype("notes.txt").await.unwrap(), "text/plain");
        assert_eq!(
            adapter.get_mimetype("blob").await.unwrap(),
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn test_write_options() {
        let adapter = adapter();
        let options = WriteOptions::default()
            .with_mimetype("application/json")
            .with_visibility(Visibility::Public);
        adapter
            .write("data.bin", b"{}".to_vec(), &options)
            .await
            .unwrap();

        assert_eq!(
            adapter.get_mimetype("data.bin").await.unwrap(),
            "application/json"
        );
        assert_eq!(adapter.get_visibility("data.bin").await, Visibility::Public);
    }

    #[tokio::test]
    async fn test_write_propagates_error() {
        let adapter = adapter();
        adapter.client().fail(ClientOp::Put).await;

        let result = adapter
            .write("a.txt", b"x".to_vec(), &WriteOptions::default())
            .await;
        assert!(matches!(result, Err(Error::Remote(_))));
    }

    #[tokio::test]
    async fn test_write_stream_and_update() {
        let adapter = adapter();
        let chunks: ByteStream = Box::pin(stream::iter(vec![
            Ok::<_, Error>(b"hel".to_vec()),
            Ok(b"lo".to_vec()),
        ]));
        let record = adapter
            .write_stream("s.txt", chunks, &WriteOptions::default())
            .await
            .unwrap();
        assert_eq!(record.size, 5);
        assert_eq!(adapter.read("s.txt").await.unwrap().contents, b"hello");

        adapter
            .update("s.txt", b"bye".to_vec(), &WriteOptions::default())
            .await
            .unwrap();
        assert_eq!(adapter.read("s.txt").await.unwrap().contents, b"bye");

        let chunks: ByteStream =
            Box::pin(stream::iter(vec![Ok::<_, Error>(b"again".to_vec())]));
        adapter
            .update_stream("s.txt", chunks, &WriteOptions::default())
            .await
            .unwrap();
        assert_eq!(adapter.get_size("s.txt").await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_read_and_read_stream() {
        let adapter = adapter();
        write(&adapter, "doc.md", b"# title").await;

        let response = adapter.read("doc.md").await.unwrap();
        assert_eq!(response.kind, ObjectKind::File);
        assert_eq!(response.path, "doc.md");
        assert_eq!(response.contents, b"# title");

        let response = adapter.read_stream("doc.md").await.unwrap();
        assert_eq!(response.path, "doc.md");
        let data = OssAdapter::<MemoryClient>::drain(response.stream).await.unwrap();
        assert_eq!(data, b"# title");

        assert!(adapter.read("missing.md").await.is_err());
        assert!(adapter.read_stream("missing.md").await.is_err());
    }

    #[tokio::test]
    async fn test_copy_preserves_contents() {
        let adapter = adapter();
        write(&adapter, "a.txt", b"payload").await;
        let before = adapter.read("a.txt").await.unwrap().contents;

        assert!(adapter.copy("a.txt", "b.txt").await);
        assert_eq!(adapter.read("b.txt").await.unwrap().contents, before);
        assert!(adapter.has("a.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_copy_soft_failure() {
        let adapter = adapter();
        assert!(!adapter.copy("missing.txt", "b.txt").await);

        write(&adapter, "a.txt", b"x").await;
        adapter.client().fail(ClientOp::Copy).await;
        assert!(!adapter.copy("a.txt", "b.txt").await);
        assert!(!adapter.has("b.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_rename() {
        let adapter = adapter();
        write(&adapter, "old.txt", b"data").await;

        assert!(adapter.rename("old.txt", "new.txt").await.unwrap());
        assert!(!adapter.has("old.txt").await.unwrap());
        assert!(adapter.has("new.txt").await.unwrap());
        assert_eq!(adapter.read("new.txt").await.unwrap().contents, b"data");
    }

    #[tokio::test]
    async fn test_rename_copy_failure_leaves_source() {
        let adapter = adapter();
        write(&adapter, "old.txt", b"data").await;
        adapter.client().fail(ClientOp::Copy).await;

        assert!(!adapter.rename("old.txt", "new.txt").await.unwrap());
        assert!(adapter.has("old.txt").await.unwrap());
        assert!(!adapter.has("new.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_rename_delete_failure_leaves_duplicate() {
        let adapter = adapter();
        write(&adapter, "old.txt", b"data").await;
        adapter.client().fail(ClientOp::Delete).await;

        assert!(adapter.rename("old.txt", "new.txt").await.is_err());
        assert!(adapter.has("old.txt").await.unwrap());
        assert!(adapter.has("new.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_confirms_absence() {
        let adapter = adapter();
        write(&adapter, "a.txt", b"x").await;

        let deleted = adapter.delete("a.txt").await.unwrap();
        let present = adapter.has("a.txt").await.unwrap();
        assert!(deleted);
        assert_eq!(deleted, !present);
    }

    #[tokio::test]
    async fn test_delete_propagates_error() {
        let adapter = adapter();
        write(&adapter, "a.txt", b"x").await;
        adapter.client().fail(ClientOp::Delete).await;

        assert!(adapter.delete("a.txt").await.is_err());
        assert!(adapter.has("a.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_dir() {
        let adapter = adapter();
        let record = adapter
            .create_dir("photos", &WriteOptions::default())
            .await
            .unwrap();
        assert_eq!(record.kind, ObjectKind::Dir);
        assert_eq!(record.path, "photos");
        assert_eq!(record.size, 0);

        assert!(adapter.has("photos/").await.unwrap());
        assert_eq!(adapter.get_size("photos/").await.unwrap(), 0);

        // An existing trailing separator is not doubled.
        adapter
            .create_dir("albums/", &WriteOptions::default())
            .await
            .unwrap();
        assert!(adapter.has("albums/").await.unwrap());
        assert!(!adapter.has("albums//").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_contents_flat() {
        let adapter = adapter();
        adapter
            .create_dir("docs", &WriteOptions::default())
            .await
            .unwrap();
        write(&adapter, "docs/a.txt", b"a").await;
        write(&adapter, "docs/sub/b.txt", b"bb").await;

        let records = adapter.list_contents("docs/", false).await;
        let paths: Vec<_> = records.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["docs/", "docs/a.txt"]);
        assert_eq!(records[0].kind, ObjectKind::Dir);
        assert_eq!(records[1].kind, ObjectKind::File);
        assert_eq!(records[1].size, 1);
        assert!(records[1].timestamp > 0);
    }

    #[tokio::test]
    async fn test_list_contents_recursive_flattens() {
        let adapter = adapter();
        write(&adapter, "root/a.txt", b"").await;
        write(&adapter, "root/b.txt", b"").await;
        write(&adapter, "root/x/c.txt", b"").await;
        write(&adapter, "root/x/y/d.txt", b"").await;
        write(&adapter, "root/z/e.txt", b"").await;
        write(&adapter, "elsewhere.txt", b"").await;

        let records = adapter.list_contents("root/", true).await;
        let paths: Vec<_> = records.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "root/a.txt",
                "root/b.txt",
                "root/x/c.txt",
                "root/x/y/d.txt",
                "root/z/e.txt",
            ]
        );

        // Equal to the sum of the objects found level by level.
        let top = adapter.list_contents("root/", false).await.len();
        let x = adapter.list_contents("root/x/", false).await.len();
        let y = adapter.list_contents("root/x/y/", false).await.len();
        let z = adapter.list_contents("root/z/", false).await.len();
        assert_eq!(records.len(), top + x + y + z);
    }

    #[tokio::test]
    async fn test_list_contents_error_is_empty() {
        let adapter = adapter();
        write(&adapter, "a.txt", b"").await;
        adapter.client().fail(ClientOp::List).await;

        assert!(adapter.list_contents("", false).await.is_empty());
        assert!(adapter.list_contents("", true).await.is_empty());
    }

    #[tokio::test]
    async fn test_list_contents_nested_error_drops_subtree() {
        let adapter = adapter();
        write(&adapter, "root/a.txt", b"").await;
        write(&adapter, "root/x/c.txt", b"").await;
        write(&adapter, "root/x/y/d.txt", b"").await;
        write(&adapter, "root/z/e.txt", b"").await;
        adapter.client().fail_list_under("root/x/").await;

        let records = adapter.list_contents("root/", true).await;
        let paths: Vec<_> = records.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["root/a.txt", "root/z/e.txt"]);
    }

    #[tokio::test]
    async fn test_delete_dir_is_prefix_based() {
        let adapter = adapter();
        write(&adapter, "tmp/a", b"").await;
        write(&adapter, "tmpx/keep", b"").await;
        write(&adapter, "other/keep", b"").await;

        assert!(adapter.delete_dir("tmp").await);
        assert!(!adapter.has("tmp/a").await.unwrap());
        assert!(!adapter.has("tmpx/keep").await.unwrap());
        assert!(adapter.has("other/keep").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_dir() {
        let adapter = adapter();
        adapter
            .create_dir("tmp", &WriteOptions::default())
            .await
            .unwrap();
        write(&adapter, "tmp/a", b"").await;
        write(&adapter, "tmp/b/c", b"").await;
        write(&adapter, "keep.txt", b"").await;

        assert!(adapter.delete_dir("tmp/").await);
        assert!(adapter.list_contents("tmp/", true).await.is_empty());
        assert!(adapter.has("keep.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_dir_always_true() {
        let adapter = adapter();
        assert!(adapter.delete_dir("nothing-here/").await);

        write(&adapter, "tmp/a", b"").await;
        adapter.client().fail(ClientOp::DeleteMany).await;
        assert!(adapter.delete_dir("tmp/").await);
        // Nothing verified the result.
        assert!(adapter.has("tmp/a").await.unwrap());
    }

    #[tokio::test]
    async fn test_metadata_getters() {
        let adapter = adapter();
        write(&adapter, "report.pdf", b"12345678").await;

        let meta = adapter.get_metadata("report.pdf").await.unwrap();
        assert_eq!(meta.content_length, 8);
        assert_eq!(meta.content_type, "application/pdf");

        assert_eq!(adapter.get_size("report.pdf").await.unwrap(), 8);
        assert_eq!(
            adapter.get_timestamp("report.pdf").await.unwrap(),
            meta.last_modified.timestamp()
        );

        assert!(adapter.get_size("missing").await.is_err());
        assert!(adapter.get_mimetype("missing").await.is_err());
        assert!(adapter.get_timestamp("missing").await.is_err());
    }

    #[tokio::test]
    async fn test_visibility_round_trip() {
        let adapter = adapter();
        write(&adapter, "pic.jpg", b"").await;

        assert!(adapter.set_visibility("pic.jpg", Visibility::Public).await);
        assert_eq!(adapter.get_visibility("pic.jpg").await, Visibility::Public);
        assert_eq!(
            adapter
                .client()
                .get_object_acl(BUCKET, "pic.jpg")
                .await
                .unwrap(),
            Acl::PublicRead
        );

        assert!(adapter.set_visibility("pic.jpg", Visibility::Private).await);
        assert_eq!(adapter.get_visibility("pic.jpg").await, Visibility::Private);
    }

    #[tokio::test]
    async fn test_default_acl_reads_as_public() {
        let adapter = adapter();
        write(&adapter, "pic.jpg", b"").await;
        assert_eq!(adapter.get_visibility("pic.jpg").await, Visibility::Public);
    }

    #[tokio::test]
    async fn test_visibility_failures() {
        let adapter = adapter();
        assert!(!adapter.set_visibility("missing", Visibility::Public).await);

        write(&adapter, "pic.jpg", b"").await;
        adapter.set_visibility("pic.jpg", Visibility::Public).await;
        adapter.client().fail(ClientOp::GetAcl).await;
        assert_eq!(adapter.get_visibility("pic.jpg").await, Visibility::Private);
    }

    #[test]
    fn test_get_url() {
        let adapter = adapter();
        assert_eq!(
            adapter.get_url("/img/a.png"),
            "https://media.oss-cn-hangzhou.aliyuncs.com/img/a.png"
        );
        assert_eq!(
            adapter.get_url("img/a.png"),
            "https://media.oss-cn-hangzhou.aliyuncs.com/img/a.png"
        );
        assert_eq!(
            adapter.get_url("http://cdn.example.com/a.png"),
            "http://cdn.example.com/a.png"
        );
    }

    #[test]
    fn test_guess_mimetype() {
        assert_eq!(guess_mimetype("a/b/c.html"), "text/html");
        assert_eq!(guess_mimetype("report.PDF"), "application/pdf");
        assert_eq!(guess_mimetype("noext"), "application/octet-stream");
    }

    #[test]
    fn test_oss_config_defaults() {
        let config: OssConfig = serde_json::from_value(serde_json::json!({
            "access_id": "id",
            "access_key": "key",
            "endpoint": "oss-cn-shanghai.aliyuncs.com",
            "bucket": "media",
            "host": "https://media.example.com"
        }))
        .unwrap();

        assert_eq!(config.region, "oss-cn-hangzhou");
        assert!(!config.path_style);
        assert_eq!(config.access_key.expose(), "key");
    }

    #[tokio::test]
    async fn test_create_oss_adapter() {
        let adapter = create_oss_adapter(serde_json::json!({
            "access_id": "id",
            "access_key": "key",
            "endpoint": "https://oss-cn-shanghai.aliyuncs.com",
            "bucket": "media",
            "host": "https://media.example.com"
        }))
        .unwrap();

        assert_eq!(adapter.name(), "oss");
        assert_eq!(adapter.get_url("a.txt"), "https://media.example.com/a.txt");
    }

    #[tokio::test]
    async fn test_create_oss_adapter_invalid_config() {
        let result = create_oss_adapter(serde_json::json!({ "bucket": "media" }));
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    proptest! {
        #[test]
        fn prop_get_url_idempotent(path in "[a-gi-zA-Z0-9_./-][a-zA-Z0-9_./-]{0,39}") {
            let adapter = adapter();
            let once = adapter.get_url(&path);
            prop_assert_eq!(adapter.get_url(&once), once.clone());
            prop_assert!(once.starts_with("https://media.oss-cn-hangzhou.aliyuncs.com/"));
        }
    }
}
