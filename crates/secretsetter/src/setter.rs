//! The set operation: login, read the value, create, resolve conflicts
//!
//! When the secret already exists and overwrite is enabled, the existing
//! secret is deleted and the create is retried once. The delete completes
//! before the retry starts; a crash in between leaves the secret absent.

use crate::input::read_secret_value;
use crate::store::{SecretCoordinates, SecretStore, SecretValue, StoreError};
use std::io::{self, Read};
use thiserror::Error;
use tracing::{debug, info, warn};

/// What to write and whether an existing secret may be replaced
#[derive(Debug, Clone)]
pub struct SetRequest {
    pub coordinates: SecretCoordinates,
    pub overwrite: bool,
}

/// How a successful run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Overwritten,
}

/// Why a run failed
#[derive(Error, Debug)]
pub enum SetError {
    #[error("Authentication failed: {0}")]
    Login(#[source] StoreError),

    #[error("Failed to read secret value: {0}")]
    ReadInput(#[source] io::Error),

    #[error("Secret '{name}' already exists; use --overwrite to replace it")]
    Exists { name: String },

    #[error("Failed to delete existing secret: {0}")]
    Delete(#[source] StoreError),

    #[error("Failed to set secret: {0}")]
    Create(#[source] StoreError),
}

/// Authenticate, read the secret value from `input`, and store it
pub async fn run<S, R>(store: &mut S, input: R, request: &SetRequest) -> Result<Outcome, SetError>
where
    S: SecretStore + ?Sized,
    R: Read,
{
    store.login().await.map_err(SetError::Login)?;
    debug!("Authenticated");

    let value = read_secret_value(input).map_err(SetError::ReadInput)?;
    debug!(bytes = value.expose().len(), "Read secret value");

    set_secret(store, request, &value).await
}

/// Create the secret, deleting and recreating it on conflict if allowed
pub async fn set_secret<S>(
    store: &mut S,
    request: &SetRequest,
    value: &SecretValue,
) -> Result<Outcome, SetError>
where
    S: SecretStore + ?Sized,
{
    let coordinates = &request.coordinates;

    match store.create(coordinates, value).await {
        Ok(()) => {
            info!(
                secret = %coordinates.name,
                environment = %coordinates.environment,
                path = %coordinates.path,
                "Secret set successfully"
            );
            Ok(Outcome::Created)
        }
        Err(StoreError::Conflict) if request.overwrite => {
            info!(secret = %coordinates.name, "Secret already exists, overwriting");

            store.delete(coordinates).await.map_err(SetError::Delete)?;
            debug!(secret = %coordinates.name, "Deleted existing secret");

            store
                .create(coordinates, value)
                .await
                .map_err(SetError::Create)?;

            info!(
                secret = %coordinates.name,
                environment = %coordinates.environment,
                path = %coordinates.path,
                "Secret overwritten successfully"
            );
            Ok(Outcome::Overwritten)
        }
        Err(StoreError::Conflict) => {
            warn!(
                secret = %coordinates.name,
                "Secret already exists, pass --overwrite to replace it"
            );
            Err(SetError::Exists {
                name: coordinates.name.clone(),
            })
        }
        Err(err) => Err(SetError::Create(err)),
    }
}
