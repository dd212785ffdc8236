//! OSS client
//!
//! [`ObjectStore`] implementation on the S3-compatible API of Alibaba Cloud
//! OSS (or any other S3-compatible service via `--endpoint`). Signing,
//! transport and retries are left to `aws-sdk-s3` defaults.
//!
//! # Example
//!
//! ```no_run
//! use oss_uploadr::config::StorageConfig;
//! use oss_uploadr::storage::{EnvironmentCredentials, ObjectStore, OssClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = StorageConfig {
//!     region: "cn-hangzhou".to_string(),
//!     bucket: "code-packages".to_string(),
//!     endpoint: None,
//!     path_style: false,
//! };
//! let credentials = EnvironmentCredentials::new()?;
//! let client = OssClient::new(config, &credentials).await;
//!
//! let exists = client.object_exists("code-packages", "app.zip").await?;
//! println!("exists: {}", exists);
//! # Ok(())
//! # }
//! ```

use super::{
    CredentialsProviderTrait, ExistingObjectInfo, ObjectStore, PutObjectOutcome, StorageError,
};
use crate::config::StorageConfig;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{
    ConfigBag, Region, RequestChecksumCalculation, ResponseChecksumValidation,
};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::operation::RequestId;
use aws_sdk_s3::primitives::ByteStream;
use aws_smithy_runtime_api::box_error::BoxError;
use aws_smithy_runtime_api::client::interceptors::context::BeforeDeserializationInterceptorContextRef;
use aws_smithy_runtime_api::client::interceptors::Intercept;
use aws_smithy_runtime_api::client::runtime_components::RuntimeComponents;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;

/// Records the HTTP status of the response it sees
///
/// The SDK output types do not carry the status code, so PutObject attaches
/// this per request.
#[derive(Debug, Clone, Default)]
struct StatusCapture {
    status: Arc<AtomicU16>,
}

impl StatusCapture {
    fn get(&self) -> u16 {
        self.status.load(Ordering::Relaxed)
    }
}

impl Intercept for StatusCapture {
    fn name(&self) -> &'static str {
        "StatusCapture"
    }

    fn read_after_transmit(
        &self,
        context: &BeforeDeserializationInterceptorContextRef<'_>,
        _runtime_components: &RuntimeComponents,
        _cfg: &mut ConfigBag,
    ) -> Result<(), BoxError> {
        self.status
            .store(context.response().status().as_u16(), Ordering::Relaxed);
        Ok(())
    }
}

fn request_error(
    operation: &'static str,
    bucket: &str,
    key: &str,
    err: impl std::error::Error,
) -> StorageError {
    StorageError::RequestError {
        operation,
        bucket: bucket.to_string(),
        key: key.to_string(),
        message: DisplayErrorContext(&err).to_string(),
    }
}

/// OSS client
pub struct OssClient {
    client: aws_sdk_s3::Client,
    config: StorageConfig,
}

impl OssClient {
    /// Create a new client for the given storage settings
    pub async fn new(config: StorageConfig, credentials: &impl CredentialsProviderTrait) -> Self {
        let endpoint = config.endpoint_url();
        let sdk_credentials: aws_credential_types::Credentials = credentials.credentials().into();

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(&endpoint)
            .credentials_provider(sdk_credentials)
            .load()
            .await;

        // OSS rejects the aws-chunked trailing checksums newer SDKs send by default
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.path_style)
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
            .response_checksum_validation(ResponseChecksumValidation::WhenRequired)
            .build();

        tracing::debug!(
            endpoint = %endpoint,
            region = %config.region,
            path_style = config.path_style,
            "Created OSS client"
        );

        Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
            config,
        }
    }

    /// Get the configured bucket name
    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }

    /// Get the region
    pub fn region(&self) -> &str {
        &self.config.region
    }

    /// Get the endpoint URL
    pub fn endpoint(&self) -> String {
        self.config.endpoint_url()
    }
}

#[async_trait]
impl ObjectStore for OssClient {
    #[tracing::instrument(
        name = "oss.object_exists",
        skip(self),
        fields(
            oss.bucket = %bucket,
            oss.key = %key,
            http.method = "HEAD",
            oss.exists = tracing::field::Empty
        ),
        err
    )]
    async fn object_exists(&self, bucket: &str, key: &str) -> Result<bool, StorageError> {
        let exists = match self.client.head_object().bucket(bucket).key(key).send().await {
            Ok(_) => true,
            Err(e) if e.as_service_error().map(|e| e.is_not_found()) == Some(true) => false,
            Err(e) => return Err(request_error("object_exists", bucket, key, e)),
        };

        tracing::Span::current().record("oss.exists", exists);
        Ok(exists)
    }

    #[tracing::instrument(
        name = "oss.head_object",
        skip(self),
        fields(
            oss.bucket = %bucket,
            oss.key = %key,
            http.method = "HEAD",
            oss.version_id = tracing::field::Empty
        ),
        err
    )]
    async fn head_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<ExistingObjectInfo, StorageError> {
        let output = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| request_error("head_object", bucket, key, e))?;

        let info = ExistingObjectInfo {
            exists: true,
            metadata: output.metadata().cloned().unwrap_or_default(),
            version_id: output.version_id().map(str::to_string),
        };

        if let Some(version_id) = &info.version_id {
            tracing::Span::current().record("oss.version_id", version_id.as_str());
        }
        Ok(info)
    }

    #[tracing::instrument(
        name = "oss.put_object",
        skip(self, file_path, metadata),
        fields(
            oss.bucket = %bucket,
            oss.key = %key,
            file.path = %file_path.display(),
            http.method = "PUT",
            upload.bytes = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
            oss.request_id = tracing::field::Empty,
            oss.version_id = tracing::field::Empty
        ),
        err
    )]
    async fn put_object_from_file(
        &self,
        bucket: &str,
        key: &str,
        file_path: &Path,
        metadata: HashMap<String, String>,
    ) -> Result<PutObjectOutcome, StorageError> {
        let body = ByteStream::from_path(file_path)
            .await
            .map_err(|e| StorageError::FileError {
                path: file_path.to_path_buf(),
                message: e.to_string(),
            })?;

        let span = tracing::Span::current();
        if let Some(len) = body.size_hint().1 {
            span.record("upload.bytes", len);
        }

        let status = StatusCapture::default();
        let output = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .set_metadata((!metadata.is_empty()).then_some(metadata))
            .body(body)
            .customize()
            .interceptor(status.clone())
            .send()
            .await
            .map_err(|e| request_error("put_object", bucket, key, e))?;

        // OSS's S3-compatible endpoint answers with x-amz-request-id and
        // x-amz-version-id alongside its x-oss-* headers; only the former are read
        let outcome = PutObjectOutcome {
            status_code: status.get(),
            request_id: output.request_id().map(str::to_string),
            version_id: output.version_id().map(str::to_string),
            etag: output.e_tag().map(str::to_string),
        };

        span.record("http.status_code", outcome.status_code);
        if let Some(request_id) = &outcome.request_id {
            span.record("oss.request_id", request_id.as_str());
        }
        if let Some(version_id) = &outcome.version_id {
            span.record("oss.version_id", version_id.as_str());
        }

        tracing::info!(
            status_code = outcome.status_code,
            etag = ?outcome.etag,
            "PutObject completed"
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StaticCredentials;

    fn storage_config(endpoint: Option<&str>) -> StorageConfig {
        StorageConfig {
            region: "cn-hangzhou".into(),
            bucket: "test-bucket".into(),
            endpoint: endpoint.map(str::to_string),
            path_style: endpoint.is_some(),
        }
    }

    #[tokio::test]
    async fn test_client_creation() {
        let credentials = StaticCredentials::new("ak", "sk");
        let client = OssClient::new(storage_config(None), &credentials).await;
        assert_eq!(client.bucket(), "test-bucket");
        assert_eq!(client.region(), "cn-hangzhou");
        assert_eq!(client.endpoint(), "https://oss-cn-hangzhou.aliyuncs.com");
    }

    #[tokio::test]
    async fn test_custom_endpoint() {
        let credentials = StaticCredentials::new("ak", "sk");
        let client =
            OssClient::new(storage_config(Some("http://localhost:9000")), &credentials).await;
        assert_eq!(client.endpoint(), "http://localhost:9000");
    }

    #[tokio::test]
    async fn test_put_missing_file_is_file_error() {
        let credentials = StaticCredentials::new("ak", "sk");
        let client =
            OssClient::new(storage_config(Some("http://127.0.0.1:9")), &credentials).await;

        let result = client
            .put_object_from_file(
                "test-bucket",
                "k",
                Path::new("/nonexistent/oss-uploadr/file.bin"),
                HashMap::new(),
            )
            .await;

        assert!(matches!(result, Err(StorageError::FileError { .. })));
    }
}
