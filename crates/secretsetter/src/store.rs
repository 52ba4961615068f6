//! The remote secrets service, seen as a narrow capability
//!
//! Three operations are all the tool needs: login, create, delete. Failures
//! are classified here so callers branch on the variant, never on the text
//! of a server message.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Errors reported by a [`SecretStore`]
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("secret already exists")]
    Conflict,

    #[error("authentication rejected: {0}")]
    Auth(String),

    #[error("network error communicating with Infisical: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Infisical API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("unexpected Infisical response: {0}")]
    InvalidResponse(String),

    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
}

/// Where a secret lives: project, environment, path, and name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretCoordinates {
    pub project_id: String,
    pub environment: String,
    pub path: String,
    pub name: String,
}

/// A secret value. Never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretValue(String);

impl SecretValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretValue(<{} bytes>)", self.0.len())
    }
}

/// Write access to a remote secrets service
#[async_trait]
pub trait SecretStore: Send {
    /// Authenticate the session. Must succeed before create/delete.
    async fn login(&mut self) -> Result<(), StoreError>;

    /// Create a secret. Returns [`StoreError::Conflict`] when one already
    /// exists at the same coordinates.
    async fn create(
        &mut self,
        coordinates: &SecretCoordinates,
        value: &SecretValue,
    ) -> Result<(), StoreError>;

    /// Delete the secret at the given coordinates
    async fn delete(&mut self, coordinates: &SecretCoordinates) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_value_debug_hides_value() {
        let value = SecretValue::new("s3cr3t");
        let debug = format!("{:?}", value);
        assert!(!debug.contains("s3cr3t"));
        assert_eq!(debug, "SecretValue(<6 bytes>)");
        assert_eq!(value.expose(), "s3cr3t");
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(StoreError::Conflict.to_string(), "secret already exists");
        let err = StoreError::Api {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Infisical API error (status 500): boom");
    }
}
