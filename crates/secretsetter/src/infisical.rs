//! Infisical REST client
//!
//! Implements [`SecretStore`] over the Infisical HTTP API:
//! - POST   /api/v1/auth/universal-auth/login
//! - POST   /api/v3/secrets/raw/{name}
//! - DELETE /api/v3/secrets/raw/{name}
//!
//! The access token is refreshed automatically: any call made with an
//! expired token logs in again first.

use crate::config::{Credentials, Settings};
use crate::store::{SecretCoordinates, SecretStore, SecretValue, StoreError};
use async_trait::async_trait;
use reqwest::{Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Tokens this close to expiry are treated as expired
const REFRESH_MARGIN: Duration = Duration::from_secs(10);

const SECRET_TYPE_SHARED: &str = "shared";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateSecretRequest<'a> {
    workspace_id: &'a str,
    environment: &'a str,
    secret_path: &'a str,
    secret_value: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteSecretRequest<'a> {
    workspace_id: &'a str,
    environment: &'a str,
    secret_path: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    message: Option<String>,
}

struct AccessToken {
    value: String,
    /// `None` when the lifetime is too large to represent; never expires
    expires_at: Option<Instant>,
}

impl AccessToken {
    fn new(value: String, expires_in: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now().checked_add(expires_in.saturating_sub(REFRESH_MARGIN)),
        }
    }

    fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Instant::now() >= expires_at,
            None => false,
        }
    }
}

/// Infisical API client authenticated with universal auth
pub struct InfisicalClient {
    http: reqwest::Client,
    site_url: Url,
    credentials: Credentials,
    token: Option<AccessToken>,
}

impl InfisicalClient {
    fn user_agent() -> String {
        format!("secretsetter/{}", env!("CARGO_PKG_VERSION"))
    }

    /// Create a client for the site at `site_url`
    pub fn new(site_url: Url, credentials: Credentials) -> Result<Self, StoreError> {
        if site_url.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl(site_url.to_string()));
        }

        let http = reqwest::Client::builder()
            .user_agent(Self::user_agent())
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            site_url,
            credentials,
            token: None,
        })
    }

    /// Create a client from resolved settings
    pub fn from_settings(settings: &Settings) -> Result<Self, StoreError> {
        Self::new(settings.site_url.clone(), settings.credentials.clone())
    }

    /// Build `{site}/api/...` from path segments, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.site_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidUrl(self.site_url.to_string()))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    fn secret_endpoint(&self, name: &str) -> Result<Url, StoreError> {
        self.endpoint(&["v3", "secrets", "raw", name])
    }

    async fn universal_auth_login(&mut self) -> Result<(), StoreError> {
        if !self.credentials.is_complete() {
            return Err(StoreError::Auth(format!(
                "universal auth credentials missing; set {} and {}",
                crate::config::CLIENT_ID_ENV,
                crate::config::CLIENT_SECRET_ENV
            )));
        }

        let url = self.endpoint(&["v1", "auth", "universal-auth", "login"])?;
        debug!(url = %url, "logging in with universal auth");

        let resp = self
            .http
            .post(url)
            .json(&LoginRequest {
                client_id: &self.credentials.client_id,
                client_secret: &self.credentials.client_secret,
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let message = error_message(resp).await;
            return Err(StoreError::Auth(format!("{} ({})", message, status.as_u16())));
        }

        let body: LoginResponse = resp
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(format!("login response: {}", e)))?;

        debug!(expires_in = body.expires_in, "access token issued");
        self.token = Some(AccessToken::new(
            body.access_token,
            Duration::from_secs(body.expires_in),
        ));
        Ok(())
    }

    /// Current access token, logging in again when it is missing or expired
    async fn bearer(&mut self) -> Result<String, StoreError> {
        let needs_login = match &self.token {
            Some(token) => token.is_expired(),
            None => true,
        };
        if needs_login {
            debug!("access token missing or expired, refreshing");
            self.universal_auth_login().await?;
        }

        self.token
            .as_ref()
            .map(|token| token.value.clone())
            .ok_or_else(|| StoreError::Auth("no access token after login".to_string()))
    }
}

#[async_trait]
impl SecretStore for InfisicalClient {
    async fn login(&mut self) -> Result<(), StoreError> {
        self.universal_auth_login().await
    }

    async fn create(
        &mut self,
        coordinates: &SecretCoordinates,
        value: &SecretValue,
    ) -> Result<(), StoreError> {
        let token = self.bearer().await?;
        let url = self.secret_endpoint(&coordinates.name)?;
        debug!(
            secret = %coordinates.name,
            environment = %coordinates.environment,
            path = %coordinates.path,
            "creating secret"
        );

        let resp = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&CreateSecretRequest {
                workspace_id: &coordinates.project_id,
                environment: &coordinates.environment,
                secret_path: &coordinates.path,
                secret_value: value.expose(),
                kind: SECRET_TYPE_SHARED,
            })
            .send()
            .await?;

        check(resp).await
    }

    async fn delete(&mut self, coordinates: &SecretCoordinates) -> Result<(), StoreError> {
        let token = self.bearer().await?;
        let url = self.secret_endpoint(&coordinates.name)?;
        debug!(
            secret = %coordinates.name,
            environment = %coordinates.environment,
            path = %coordinates.path,
            "deleting secret"
        );

        let resp = self
            .http
            .delete(url)
            .bearer_auth(token)
            .json(&DeleteSecretRequest {
                workspace_id: &coordinates.project_id,
                environment: &coordinates.environment,
                secret_path: &coordinates.path,
                kind: SECRET_TYPE_SHARED,
            })
            .send()
            .await?;

        check(resp).await
    }
}

/// Map a secrets endpoint response onto `Ok` or a classified error
async fn check(resp: Response) -> Result<(), StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }
    let message = error_message(resp).await;
    Err(classify(status, message))
}

/// Infisical reports an existing secret with a "Secret already exist"
/// message rather than a dedicated status, so that text marks a conflict on
/// any non-auth status.
fn classify(status: StatusCode, message: String) -> StoreError {
    match status.as_u16() {
        401 | 403 => StoreError::Auth(message),
        409 => StoreError::Conflict,
        _ if is_already_exists(&message) => StoreError::Conflict,
        code => StoreError::Api {
            status: code,
            message,
        },
    }
}

fn is_already_exists(message: &str) -> bool {
    message.contains("Secret already exist")
}

/// Best-effort error message from a failed response
async fn error_message(resp: Response) -> String {
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();

    let parsed = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.is_empty());

    match parsed {
        Some(message) => message,
        None if !text.trim().is_empty() => text.trim().to_string(),
        None => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    }
}
