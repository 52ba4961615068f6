//! secretsetter - Write a secret from stdin into Infisical
//!
//! Reads one value from standard input, trims it, and stores it under a
//! secret name in an Infisical project environment and path. An existing
//! secret is only replaced when the caller asks for it with `--overwrite`.
//!
//! The remote service is reached through the [`SecretStore`] capability so
//! the operation sequence in [`setter`] runs unchanged against a fake.

pub mod cli;
pub mod config;
pub mod infisical;
pub mod input;
pub mod logging;
pub mod setter;
pub mod store;

pub use config::{ConfigError, Credentials, Settings};
pub use infisical::InfisicalClient;
pub use setter::{Outcome, SetError, SetRequest};
pub use store::{SecretCoordinates, SecretStore, SecretValue, StoreError};
