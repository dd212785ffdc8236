//! OSS Uploadr Library
//!
//! Idempotent single-file uploader for Alibaba Cloud OSS and other
//! S3-compatible object storage.
//!
//! # Features
//!
//! - **Idempotent**: A `unique-key` metadata entry (e.g. a commit id) marks
//!   what was uploaded; re-running with the same key is a no-op
//! - **Flexible Config**: Flags, `OSS_*` environment variables, or a YAML file
//! - **S3 Compatible**: Works against OSS, MinIO, RustFS and friends
//!
//! # Example
//!
//! ```no_run
//! use oss_uploadr::config::{StorageConfig, UploadRequest};
//! use oss_uploadr::storage::{EnvironmentCredentials, OssClient};
//! use oss_uploadr::upload::IdempotentUploader;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let request = UploadRequest {
//!         storage: StorageConfig {
//!             region: "cn-hangzhou".into(),
//!             bucket: "code-packages".into(),
//!             endpoint: None,
//!             path_style: false,
//!         },
//!         key: "releases/app.zip".into(),
//!         file_path: "app.zip".into(),
//!         unique_key: Some("4f2a9c1".into()),
//!     };
//!     let credentials = EnvironmentCredentials::new()?;
//!     let client = OssClient::new(request.storage.clone(), &credentials).await;
//!     let outcome = IdempotentUploader::new(client).run(&request).await?;
//!     println!("{}", outcome);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod storage;
pub mod upload;

// Re-export commonly used types
pub use config::{ConfigError, StorageConfig, UploadRequest};
pub use upload::{IdempotentUploader, UploadOutcome};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
