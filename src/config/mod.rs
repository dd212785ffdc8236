//! Configuration module for OSS Uploadr
//!
//! Resolves the upload request from command-line flags, environment
//! variables and an optional YAML config file, in that order of precedence.
//! Validation collects every problem before failing so the user sees all of
//! them at once.

use crate::cli::Args;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand environment variables in a string.
///
/// Supports two syntaxes:
/// - `${VAR_NAME}` - Simple expansion, keeps placeholder if var not found
/// - `${VAR_NAME:-default}` - Expansion with default value
///
/// Variable names must start with a letter or underscore and contain only
/// uppercase letters, digits, and underscores.
fn expand_env_vars(s: &str) -> Result<String, ConfigError> {
    let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}")?;
    let mut last_match = 0;
    let mut result = String::with_capacity(s.len());

    for cap in re.captures_iter(s) {
        let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
            continue;
        };

        result.push_str(&s[last_match..full_match.start()]);

        let value = match std::env::var(var_name.as_str()) {
            Ok(val) => val,
            Err(_) => match cap.get(2) {
                Some(default) => default.as_str().to_string(),
                // No env var and no default. Keep the original placeholder.
                None => full_match.as_str().to_string(),
            },
        };
        result.push_str(&value);

        last_match = full_match.end();
    }

    result.push_str(&s[last_match..]);

    Ok(result)
}

// ============================================================================
// Validation Helpers
// ============================================================================

/// Validate that a URL starts with http:// or https://
fn is_valid_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Treat empty strings the same as missing values
fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid placeholder pattern: {0}")]
    PatternError(#[from] regex_lite::Error),

    /// One or more validation failures, in the order they were found
    #[error("Invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

impl ConfigError {
    /// Validation messages, if this is a validation failure
    pub fn messages(&self) -> &[String] {
        match self {
            ConfigError::Invalid(messages) => messages,
            _ => &[],
        }
    }
}

/// Optional settings read from a YAML config file
///
/// Every field is optional; flags and environment variables win over
/// anything set here.
///
/// ```yaml
/// region: "cn-hangzhou"
/// bucket: "${RELEASE_BUCKET:-code-packages}"
/// endpoint: "https://oss-cn-hangzhou-internal.aliyuncs.com"
/// path_style: false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub path_style: Option<bool>,
}

impl FileConfig {
    /// Load a config file from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        ConfigLoader::load(path)
    }
}

/// Object storage connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub region: String,
    pub bucket: String,
    /// Explicit endpoint URL; derived from the region when unset
    pub endpoint: Option<String>,
    /// Use `{endpoint}/{bucket}/{key}` addressing instead of virtual hosts
    pub path_style: bool,
}

impl StorageConfig {
    /// Get the endpoint URL
    ///
    /// Defaults to the public OSS endpoint for the region. A region already
    /// carrying the `oss-` prefix is used as-is.
    pub fn endpoint_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => {
                let region = self.region.strip_prefix("oss-").unwrap_or(&self.region);
                format!("https://oss-{}.aliyuncs.com", region)
            }
        }
    }
}

/// A fully resolved upload request
///
/// Built once at startup and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub storage: StorageConfig,
    pub key: String,
    pub file_path: PathBuf,
    pub unique_key: Option<String>,
}

impl UploadRequest {
    /// Resolve the request from parsed arguments, loading `--config` if given
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let file = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(args, file)
    }

    /// Merge arguments with file settings and validate the result
    ///
    /// Environment fallbacks are already folded into `args` by clap.
    pub fn resolve(args: &Args, file: FileConfig) -> Result<Self, ConfigError> {
        let region = non_empty(args.region.as_deref()).or(non_empty(file.region.as_deref()));
        let bucket = non_empty(args.bucket.as_deref()).or(non_empty(file.bucket.as_deref()));
        let endpoint =
            non_empty(args.endpoint.as_deref()).or(non_empty(file.endpoint.as_deref()));
        let path_style = args.path_style.or(file.path_style).unwrap_or(false);

        let mut errors = Vec::new();
        if region.is_none() {
            errors.push(
                "Region must be provided either as argument or via OSS_REGION environment variable"
                    .to_string(),
            );
        }
        if bucket.is_none() {
            errors.push(
                "Bucket name must be provided either as argument or via OSS_BUCKET environment variable"
                    .to_string(),
            );
        }
        if let Some(ref endpoint) = endpoint {
            if !is_valid_http_url(endpoint) {
                errors.push(format!(
                    "Invalid endpoint '{}': must start with http:// or https://",
                    endpoint
                ));
            }
        }

        match (region, bucket) {
            (Some(region), Some(bucket)) if errors.is_empty() => Ok(Self {
                storage: StorageConfig {
                    region,
                    bucket,
                    endpoint,
                    path_style,
                },
                key: args.key.clone(),
                file_path: args.file_path.clone(),
                unique_key: non_empty(args.unique_key.as_deref()),
            }),
            _ => Err(ConfigError::Invalid(errors)),
        }
    }
}
