//! Filesystem adapter trait definition.

use async_trait::async_trait;
use futures::Stream;
use std::fmt;
use std::pin::Pin;

use ossdisk_common::{
    ObjectKind, ObjectMetadata, ObjectRecord, Result, Visibility, WriteOptions,
};

/// Byte stream type for upload/download operations.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>>> + Send>>;

/// Full contents of a file read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadResponse {
    pub kind: ObjectKind,
    pub path: String,
    pub contents: Vec<u8>,
}

/// Streaming handle for a file read.
pub struct ReadStreamResponse {
    pub kind: ObjectKind,
    pub path: String,
    pub stream: ByteStream,
}

impl fmt::Debug for ReadStreamResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadStreamResponse")
            .field("kind", &self.kind)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Generic file-storage abstraction.
///
/// Paths are plain object keys. Each operation has a fixed failure policy
/// that callers rely on, visible in its return type:
///
/// - `Result<_>`: the backend error is returned unchanged.
/// - `bool`, `Vec<_>` or `Visibility`: backend errors are discarded and the
///   documented default is returned instead.
#[async_trait]
pub trait FilesystemAdapter: Send + Sync {
    /// Get the driver name (e.g., "oss", "memory").
    fn name(&self) -> &str;

    /// Write a new file.
    ///
    /// # Postconditions
    /// - Object exists at `path` with the given contents
    /// - Content type is `options.mimetype` or guessed from the extension
    async fn write(
        &self,
        path: &str,
        contents: Vec<u8>,
        options: &WriteOptions,
    ) -> Result<ObjectRecord>;

    /// Write a new file from a stream.
    ///
    /// The stream is drained into memory before the upload starts.
    async fn write_stream(
        &self,
        path: &str,
        stream: ByteStream,
        options: &WriteOptions,
    ) -> Result<ObjectRecord>;

    /// Overwrite an existing file.
    async fn update(
        &self,
        path: &str,
        contents: Vec<u8>,
        options: &WriteOptions,
    ) -> Result<ObjectRecord>;

    /// Overwrite an existing file from a stream.
    async fn update_stream(
        &self,
        path: &str,
        stream: ByteStream,
        options: &WriteOptions,
    ) -> Result<ObjectRecord>;

    /// Read a file.
    async fn read(&self, path: &str) -> Result<ReadResponse>;

    /// Read a file as a stream.
    async fn read_stream(&self, path: &str) -> Result<ReadStreamResponse>;

    /// Rename a file.
    ///
    /// Copies to `new_path` then deletes `path`. Returns `Ok(false)` and
    /// leaves the source untouched if the copy fails. A failed delete after a
    /// successful copy leaves both objects in place.
    async fn rename(&self, path: &str, new_path: &str) -> Result<bool>;

    /// Copy a file. Returns `false` on any backend error.
    async fn copy(&self, path: &str, new_path: &str) -> bool;

    /// Delete a file.
    ///
    /// Returns `true` only if the object is confirmed absent afterwards.
    async fn delete(&self, path: &str) -> Result<bool>;

    /// Delete a directory and everything below it.
    ///
    /// `dirname` is matched as a plain key prefix: `"tmp"` also removes
    /// `tmpx/...`. Pass `"tmp/"` to stay inside one directory.
    /// Completion is not verified; always returns `true`.
    async fn delete_dir(&self, dirname: &str) -> bool;

    /// Create a directory.
    async fn create_dir(&self, dirname: &str, options: &WriteOptions) -> Result<ObjectRecord>;

    /// Set the visibility of a file. Returns `false` on any backend error.
    async fn set_visibility(&self, path: &str, visibility: Visibility) -> bool;

    /// Check whether a file exists.
    async fn has(&self, path: &str) -> Result<bool>;

    /// List the contents of a directory.
    ///
    /// Returns an empty vector on any backend error.
    async fn list_contents(&self, directory: &str, recursive: bool) -> Vec<ObjectRecord>;

    /// Get all head metadata for a file.
    async fn get_metadata(&self, path: &str) -> Result<ObjectMetadata>;

    /// Get the size of a file in bytes.
    async fn get_size(&self, path: &str) -> Result<u64>;

    /// Get the MIME type of a file.
    async fn get_mimetype(&self, path: &str) -> Result<String>;

    /// Get the last modification time of a file as Unix seconds.
    async fn get_timestamp(&self, path: &str) -> Result<i64>;

    /// Get the visibility of a file. Defaults to private on any backend error.
    async fn get_visibility(&self, path: &str) -> Visibility;

    /// Public URL for a path.
    fn get_url(&self, path: &str) -> String;
}
