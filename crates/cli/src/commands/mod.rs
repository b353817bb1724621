//! Subcommand implementations.
//!
//! # Environment Variables
//!
//! - `SIMLA_API_URL` - Account URL, e.g. `https://shop.simla.com`
//! - `SIMLA_API_KEY` - API key
//! - `SIMLA_CACHE_DIR` - Where grouped results are cached (default `var/cache`)
//! - `RUST_LOG` - Log filter (default `info`)

pub mod customers;
pub mod directory;

use std::io::Write;

use serde::Serialize;
use simla_core::CustomerId;
use simla_gateway::{
    ConfigError, DirectoryGateway, GatewayError, JsonFileCache, SimlaClient, SimlaConfig,
    SimlaError,
};
use thiserror::Error;

/// Gateway wired for the command line: HTTP client plus file cache.
pub type Gateway = DirectoryGateway<SimlaClient, JsonFileCache>;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The CRM rejected a request.
    #[error(transparent)]
    Simla(#[from] SimlaError),

    /// A gateway operation failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Output could not be written.
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),

    /// Output could not be encoded.
    #[error("Failed to encode output: {0}")]
    Json(#[from] serde_json::Error),

    /// Requested customers are not in the directory.
    #[error("Unknown customers: {0:?}")]
    UnknownCustomers(Vec<CustomerId>),

    /// An internal ID given on the command line is not numeric.
    #[error("Invalid customer id: {0}")]
    InvalidCustomerId(String),

    /// Some items of a batch failed.
    #[error("{failed} of {total} customers could not be updated")]
    PartialFailure { failed: usize, total: usize },
}

/// Build the gateway from the environment.
pub fn gateway() -> Result<Gateway, CommandError> {
    let config = SimlaConfig::from_env()?;
    tracing::debug!(?config, "Loaded configuration");
    Ok(DirectoryGateway::from_config(&config)?)
}

/// Pretty-print `value` as JSON on stdout.
fn write_json<T: Serialize>(value: &T) -> Result<(), CommandError> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
