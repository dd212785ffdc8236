//! Upload module
//!
//! Idempotent upload: the object is written only when the bucket does not
//! already hold it under the same unique key.

use crate::config::UploadRequest;
use crate::storage::{ObjectStore, PutObjectOutcome, StorageError};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// User metadata entry carrying the idempotency token
pub const UNIQUE_KEY_METADATA: &str = "unique-key";

/// Upload errors
#[derive(Error, Debug)]
pub enum UploadError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// What a run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The object already carries the requested unique key
    Skipped {
        key: String,
        version_id: Option<String>,
    },
    /// The file was uploaded
    Uploaded(PutObjectOutcome),
}

impl UploadOutcome {
    /// Whether the upload was skipped
    pub fn is_skipped(&self) -> bool {
        matches!(self, UploadOutcome::Skipped { .. })
    }
}

fn or_none(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("none")
}

impl fmt::Display for UploadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadOutcome::Skipped { key, version_id } => write!(
                f,
                "object {} already exists\nversion_id: {}",
                key,
                or_none(version_id)
            ),
            UploadOutcome::Uploaded(put) => write!(
                f,
                "upload file to oss successfully\nstatus_code: {}\nrequest_id: {}\nversion_id: {}",
                put.status_code,
                or_none(&put.request_id),
                or_none(&put.version_id)
            ),
        }
    }
}

/// Metadata to attach to the uploaded object
pub fn upload_metadata(unique_key: Option<&str>) -> HashMap<String, String> {
    unique_key
        .map(|value| HashMap::from([(UNIQUE_KEY_METADATA.to_string(), value.to_string())]))
        .unwrap_or_default()
}

/// Uploads a file unless an identical one is already stored
pub struct IdempotentUploader<S> {
    store: S,
}

impl<S: ObjectStore> IdempotentUploader<S> {
    /// Create an uploader over the given store
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Check the target object and upload the file if needed
    ///
    /// Without a unique key the upload always proceeds. Storage failures,
    /// including a failed metadata fetch for an object that exists, are
    /// returned as-is without retrying.
    #[tracing::instrument(
        name = "upload.idempotent",
        skip(self, request),
        fields(
            oss.bucket = %request.storage.bucket,
            oss.key = %request.key,
            upload.unique_key = ?request.unique_key,
            upload.skipped = tracing::field::Empty
        ),
        err
    )]
    pub async fn run(&self, request: &UploadRequest) -> Result<UploadOutcome, UploadError> {
        let bucket = request.storage.bucket.as_str();
        let key = request.key.as_str();
        let span = tracing::Span::current();

        let exists = self.store.object_exists(bucket, key).await?;

        if let (true, Some(unique_key)) = (exists, request.unique_key.as_deref()) {
            let existing = self.store.head_object(bucket, key).await?;
            if existing.metadata_value(UNIQUE_KEY_METADATA) == Some(unique_key) {
                span.record("upload.skipped", true);
                tracing::info!(
                    version_id = ?existing.version_id,
                    "Object already present with same unique key, skipping upload"
                );
                return Ok(UploadOutcome::Skipped {
                    key: request.key.clone(),
                    version_id: existing.version_id,
                });
            }
            tracing::debug!(
                stored = ?existing.metadata_value(UNIQUE_KEY_METADATA),
                "Unique key differs, uploading again"
            );
        }

        let put = self
            .store
            .put_object_from_file(
                bucket,
                key,
                &request.file_path,
                upload_metadata(request.unique_key.as_deref()),
            )
            .await?;

        span.record("upload.skipped", false);
        tracing::info!(
            status_code = put.status_code,
            request_id = ?put.request_id,
            version_id = ?put.version_id,
            "Upload completed"
        );

        Ok(UploadOutcome::Uploaded(put))
    }
}
