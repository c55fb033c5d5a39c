//! Common types used throughout ossdisk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroize;

/// Kind of an entry in a flat object-key namespace.
///
/// Keys ending in `/` are directory markers; everything else is a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    File,
    Dir,
}

impl ObjectKind {
    /// Infer the kind from an object key.
    pub fn from_key(key: &str) -> Self {
        if key.ends_with('/') {
            ObjectKind::Dir
        } else {
            ObjectKind::File
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, ObjectKind::Dir)
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::File => write!(f, "file"),
            ObjectKind::Dir => write!(f, "dir"),
        }
    }
}

/// One entry of a listing, or the result of a write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRecord {
    /// File or directory marker.
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    /// Full object key.
    pub path: String,
    /// Size in bytes.
    pub size: u64,
    /// Last modification as Unix seconds.
    pub timestamp: i64,
}

/// Head metadata of a single remote object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    /// Size in bytes.
    pub content_length: u64,
    /// MIME type as stored on the remote object.
    pub content_type: String,
    /// Last modification time.
    pub last_modified: DateTime<Utc>,
    /// Entity tag, if the service returned one.
    pub etag: Option<String>,
}

/// Public or private readability of an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    /// The remote ACL applied for this visibility.
    pub fn to_acl(self) -> Acl {
        match self {
            Visibility::Public => Acl::PublicRead,
            Visibility::Private => Acl::Private,
        }
    }

    /// Only an explicit private ACL counts as private.
    pub fn from_acl(acl: Acl) -> Self {
        match acl {
            Acl::Private => Visibility::Private,
            _ => Visibility::Public,
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
        }
    }
}

impl FromStr for Visibility {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            other => Err(crate::Error::InvalidInput(format!(
                "Unknown visibility '{}', expected 'public' or 'private'",
                other
            ))),
        }
    }
}

/// Canned ACL vocabulary of the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Acl {
    /// Inherit the bucket ACL.
    Default,
    Private,
    PublicRead,
    PublicReadWrite,
}

impl Acl {
    pub fn as_str(&self) -> &'static str {
        match self {
            Acl::Default => "default",
            Acl::Private => "private",
            Acl::PublicRead => "public-read",
            Acl::PublicReadWrite => "public-read-write",
        }
    }
}

impl fmt::Display for Acl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-call options for writes and directory creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteOptions {
    /// Explicit content type; guessed from the path extension when absent.
    #[serde(default)]
    pub mimetype: Option<String>,
    /// ACL to apply on upload; the bucket default when absent.
    #[serde(default)]
    pub visibility: Option<Visibility>,
}

impl WriteOptions {
    pub fn with_mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.mimetype = Some(mimetype.into());
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }
}

/// Credential string that zeroizes on drop and never prints its value.
#[derive(Clone, Zeroize, Serialize, Deserialize)]
#[zeroize(drop)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    /// Wrap a credential.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the raw credential.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret([REDACTED])")
    }
}
