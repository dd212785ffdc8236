//! Object storage module
//!
//! The uploader talks to storage only through the [`ObjectStore`] trait, so
//! the decision logic can be tested without a network. [`OssClient`] is the
//! production implementation on top of the S3-compatible API.
//!
//! # Tracing
//!
//! All storage operations are instrumented with spans:
//!
//! | Operation | Span Name | Attributes |
//! |-----------|-----------|------------|
//! | HeadObject (existence) | `oss.object_exists` | bucket, key, exists |
//! | HeadObject | `oss.head_object` | bucket, key, version_id |
//! | PutObject | `oss.put_object` | bucket, key, bytes, status_code, request_id, version_id |

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod client;
pub mod credentials;

pub use client::OssClient;
pub use credentials::{
    Credentials, CredentialsError, CredentialsProvider, CredentialsProviderTrait,
    EnvironmentCredentials, StaticCredentials,
};

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("{operation} failed for {bucket}/{key}: {message}")]
    RequestError {
        operation: &'static str,
        bucket: String,
        key: String,
        message: String,
    },

    #[error("Failed to read {}: {message}", path.display())]
    FileError { path: PathBuf, message: String },
}

/// Snapshot of an object already present in the bucket
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistingObjectInfo {
    pub exists: bool,
    /// User metadata with the `x-*-meta-` prefix stripped
    pub metadata: HashMap<String, String>,
    pub version_id: Option<String>,
}

impl ExistingObjectInfo {
    /// Look up a single metadata value
    pub fn metadata_value(&self, name: &str) -> Option<&str> {
        self.metadata.get(name).map(String::as_str)
    }
}

/// Result of a successful PutObject
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutObjectOutcome {
    pub status_code: u16,
    pub request_id: Option<String>,
    pub version_id: Option<String>,
    pub etag: Option<String>,
}

/// Minimal object storage surface needed for an idempotent upload
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Whether `key` exists in `bucket`. Absence is `Ok(false)`, not an error.
    async fn object_exists(&self, bucket: &str, key: &str) -> Result<bool, StorageError>;

    /// Fetch metadata and version of an existing object
    async fn head_object(&self, bucket: &str, key: &str)
        -> Result<ExistingObjectInfo, StorageError>;

    /// Upload a local file, attaching `metadata` as user metadata
    async fn put_object_from_file(
        &self,
        bucket: &str,
        key: &str,
        file_path: &Path,
        metadata: HashMap<String, String>,
    ) -> Result<PutObjectOutcome, StorageError>;
}
