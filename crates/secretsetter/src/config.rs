//! Environment configuration
//!
//! Everything the tool needs besides its arguments comes from the process
//! environment, read fresh on every run:
//! - INFISICAL_API_URL - site URL, defaults to Infisical Cloud
//! - INFISICAL_PROJECT_ID - project the secret is written to
//! - INFISICAL_UNIVERSAL_AUTH_CLIENT_ID / _CLIENT_SECRET - machine identity

use reqwest::Url;
use std::fmt;
use thiserror::Error;

pub const API_URL_ENV: &str = "INFISICAL_API_URL";
pub const PROJECT_ID_ENV: &str = "INFISICAL_PROJECT_ID";
pub const CLIENT_ID_ENV: &str = "INFISICAL_UNIVERSAL_AUTH_CLIENT_ID";
pub const CLIENT_SECRET_ENV: &str = "INFISICAL_UNIVERSAL_AUTH_CLIENT_SECRET";

/// Used when INFISICAL_API_URL is unset or empty
pub const DEFAULT_SITE_URL: &str = "https://app.infisical.com";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("invalid INFISICAL_API_URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Universal auth credentials. Either field may be empty; login rejects that.
#[derive(Clone, Default)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn is_complete(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Resolved settings for one run
#[derive(Debug, Clone)]
pub struct Settings {
    pub site_url: Url,
    pub project_id: String,
    pub credentials: Credentials,
}

impl Settings {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).unwrap_or_default();

        let site_url = site_url(&var(API_URL_ENV))?;

        let project_id = var(PROJECT_ID_ENV);
        if project_id.is_empty() {
            return Err(ConfigError::Missing(PROJECT_ID_ENV));
        }

        let credentials = Credentials {
            client_id: var(CLIENT_ID_ENV),
            client_secret: var(CLIENT_SECRET_ENV),
        };

        Ok(Self {
            site_url,
            project_id,
            credentials,
        })
    }
}

/// Normalize a site URL. `/api` is appended per request, so a configured
/// `https://host/api` is accepted and stripped back to `https://host`.
fn site_url(raw: &str) -> Result<Url, ConfigError> {
    let mut trimmed = raw.trim_end_matches('/');
    if trimmed.is_empty() {
        trimmed = DEFAULT_SITE_URL;
    }
    let trimmed = trimmed.strip_suffix("/api").unwrap_or(trimmed);

    let invalid = |reason: String| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme '{}'", other))),
    }
    if url.cannot_be_a_base() {
        return Err(invalid("not a base URL".to_string()));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_full_settings() {
        let settings = Settings::from_lookup(lookup(&[
            (API_URL_ENV, "https://vault.example.com"),
            (PROJECT_ID_ENV, "proj-123"),
            (CLIENT_ID_ENV, "id"),
            (CLIENT_SECRET_ENV, "secret"),
        ]))
        .unwrap();

        assert_eq!(settings.site_url.as_str(), "https://vault.example.com/");
        assert_eq!(settings.project_id, "proj-123");
        assert!(settings.credentials.is_complete());
    }

    #[test]
    fn test_default_site_url() {
        let settings = Settings::from_lookup(lookup(&[(PROJECT_ID_ENV, "p")])).unwrap();
        assert_eq!(settings.site_url.as_str(), "https://app.infisical.com/");

        let settings =
            Settings::from_lookup(lookup(&[(API_URL_ENV, ""), (PROJECT_ID_ENV, "p")])).unwrap();
        assert_eq!(settings.site_url.as_str(), "https://app.infisical.com/");
    }

    #[test]
    fn test_api_suffix_stripped() {
        let url = site_url("https://infisical.internal/api/").unwrap();
        assert_eq!(url.as_str(), "https://infisical.internal/");

        let url = site_url("http://localhost:8080/infisical/api").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/infisical");
    }

    #[test]
    fn test_missing_project_id() {
        let err = Settings::from_lookup(lookup(&[(API_URL_ENV, "https://x.example")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing(PROJECT_ID_ENV)));

        let err = Settings::from_lookup(lookup(&[(PROJECT_ID_ENV, "   ")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(
            site_url("not a url"),
            Err(ConfigError::InvalidUrl { .. })
        ));
        assert!(matches!(
            site_url("ftp://files.example.com"),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_missing_credentials_are_incomplete() {
        let settings = Settings::from_lookup(lookup(&[
            (PROJECT_ID_ENV, "p"),
            (CLIENT_ID_ENV, "id"),
        ]))
        .unwrap();
        assert!(!settings.credentials.is_complete());
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let creds = Credentials {
            client_id: "id".to_string(),
            client_secret: "hunter2".to_string(),
        };
        let debug = format!("{:?}", creds);
        assert!(debug.contains("id"));
        assert!(!debug.contains("hunter2"));
    }
}
