//! OSS Credentials Module
//!
//! Provides credential loading from various sources using a trait-based design.
//!
//! # Implementations
//!
//! - `StaticCredentials` - Credentials supplied directly (tests, embedding)
//! - `EnvironmentCredentials` - Credentials from `OSS_*` environment variables
//!
//! # Example
//!
//! ```
//! use oss_uploadr::storage::{CredentialsProviderTrait, StaticCredentials};
//!
//! let provider = StaticCredentials::new("access-key", "secret-key");
//!
//! let creds = provider.credentials();
//! assert_eq!(creds.access_key_id(), "access-key");
//! assert_eq!(creds.secret_access_key(), "secret-key");
//! ```

use thiserror::Error;

/// Access key id variable
pub const ACCESS_KEY_ID_VAR: &str = "OSS_ACCESS_KEY_ID";
/// Access key secret variable
pub const ACCESS_KEY_SECRET_VAR: &str = "OSS_ACCESS_KEY_SECRET";
/// Optional STS session token variable
pub const SESSION_TOKEN_VAR: &str = "OSS_SESSION_TOKEN";

/// Credential loading errors
#[derive(Error, Debug)]
pub enum CredentialsError {
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),
}

/// Credentials for signing storage requests
#[derive(Clone)]
pub struct Credentials {
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field("session_token", &self.session_token.as_ref().map(|_| "** redacted **"))
            .finish()
    }
}

impl Credentials {
    /// Create new credentials
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    /// Create credentials with session token (for temporary STS credentials)
    pub fn with_session_token(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: impl Into<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: Some(session_token.into()),
        }
    }

    /// Get the access key ID
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// Get the secret access key
    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    /// Get the session token (if any)
    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }
}

impl From<&Credentials> for aws_credential_types::Credentials {
    fn from(creds: &Credentials) -> Self {
        aws_credential_types::Credentials::new(
            creds.access_key_id.clone(),
            creds.secret_access_key.clone(),
            creds.session_token.clone(),
            None,
            "oss-uploadr",
        )
    }
}

/// Trait for credential providers
///
/// Implement this trait to create custom credential loading mechanisms.
pub trait CredentialsProviderTrait: Send + Sync {
    /// Get credentials from this provider
    fn credentials(&self) -> &Credentials;
}

/// Factory methods for loading credentials
pub struct CredentialsProvider;

impl CredentialsProvider {
    /// Load credentials from environment variables
    ///
    /// Looks for:
    /// - `OSS_ACCESS_KEY_ID`
    /// - `OSS_ACCESS_KEY_SECRET`
    /// - `OSS_SESSION_TOKEN` (optional)
    pub fn from_env() -> Result<Credentials, CredentialsError> {
        let access_key = required_var(ACCESS_KEY_ID_VAR)?;
        let secret_key = required_var(ACCESS_KEY_SECRET_VAR)?;

        let session_token = std::env::var(SESSION_TOKEN_VAR)
            .ok()
            .filter(|token| !token.is_empty());

        Ok(match session_token {
            Some(token) => Credentials::with_session_token(access_key, secret_key, token),
            None => Credentials::new(access_key, secret_key),
        })
    }
}

fn required_var(name: &str) -> Result<String, CredentialsError> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| CredentialsError::MissingCredentials(format!("{} not set", name)))
}

/// Static credentials provider
///
/// Holds credentials directly.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    credentials: Credentials,
}

impl StaticCredentials {
    /// Create a new static credentials provider
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            credentials: Credentials::new(access_key_id, secret_access_key),
        }
    }
}

impl CredentialsProviderTrait for StaticCredentials {
    fn credentials(&self) -> &Credentials {
        &self.credentials
    }
}

/// Environment credentials provider
///
/// Loads credentials from environment variables when created.
#[derive(Debug, Clone)]
pub struct EnvironmentCredentials {
    credentials: Credentials,
}

impl EnvironmentCredentials {
    /// Create a new environment credentials provider
    pub fn new() -> Result<Self, CredentialsError> {
        let credentials = CredentialsProvider::from_env()?;
        Ok(Self { credentials })
    }
}

impl CredentialsProviderTrait for EnvironmentCredentials {
    fn credentials(&self) -> &Credentials {
        &self.credentials
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for var in [ACCESS_KEY_ID_VAR, ACCESS_KEY_SECRET_VAR, SESSION_TOKEN_VAR] {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_credentials_creation() {
        let creds = Credentials::new("access", "secret");
        assert_eq!(creds.access_key_id(), "access");
        assert_eq!(creds.secret_access_key(), "secret");
        assert!(creds.session_token().is_none());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let creds = Credentials::with_session_token("access", "secret", "token");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("access"));
        assert!(!debug.contains("secret\""));
        assert!(!debug.contains("token\""));
    }

    #[test]
    fn test_static_credentials() {
        let provider = StaticCredentials::new("static-access", "static-secret");
        assert_eq!(provider.credentials().access_key_id(), "static-access");
        assert_eq!(provider.credentials().secret_access_key(), "static-secret");
    }

    #[test]
    fn test_into_sdk_credentials() {
        let creds = Credentials::with_session_token("ak", "sk", "st");
        let sdk: aws_credential_types::Credentials = (&creds).into();
        assert_eq!(sdk.access_key_id(), "ak");
        assert_eq!(sdk.secret_access_key(), "sk");
        assert_eq!(sdk.session_token(), Some("st"));
    }

    #[test]
    #[serial]
    fn test_from_env_success() {
        clear_env();
        std::env::set_var(ACCESS_KEY_ID_VAR, "env-access");
        std::env::set_var(ACCESS_KEY_SECRET_VAR, "env-secret");

        let provider = EnvironmentCredentials::new().unwrap();
        assert_eq!(provider.credentials().access_key_id(), "env-access");
        assert_eq!(provider.credentials().secret_access_key(), "env-secret");
        assert!(provider.credentials().session_token().is_none());

        std::env::set_var(SESSION_TOKEN_VAR, "env-token");
        let creds = CredentialsProvider::from_env().unwrap();
        assert_eq!(creds.session_token(), Some("env-token"));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_missing_secret() {
        clear_env();
        std::env::set_var(ACCESS_KEY_ID_VAR, "env-access");

        let err = CredentialsProvider::from_env().unwrap_err();
        assert!(err.to_string().contains(ACCESS_KEY_SECRET_VAR));

        clear_env();
    }
}
