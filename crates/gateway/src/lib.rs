//! Simla Gateway - Cached directory access to a Simla (`RetailCRM`) account.
//!
//! # Architecture
//!
//! ```text
//! host ──► DirectoryGateway ──► CrmApi ──► SimlaClient ──► /api/v5
//!                 │
//!                 └──────────► DirectoryCache (JSON files or moka)
//! ```
//!
//! The gateway pages through the customer and order lists, groups the records
//! by site and persists the grouped maps so later calls skip the network. It
//! also forwards single-customer mutations (edit, combine, subscriptions).
//!
//! # Modules
//!
//! - [`api`] - The remote capability set the gateway depends on
//! - [`cache`] - Cache keys and backends
//! - [`config`] - Environment-based configuration
//! - [`directory`] - The gateway itself
//! - [`error`] - Unified error type
//! - [`simla`] - HTTP client for the Simla REST API

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cache;
pub mod config;
pub mod directory;
pub mod error;
pub mod simla;

#[cfg(test)]
mod test_logs;

pub use api::CrmApi;
pub use cache::{CacheKey, CacheKind, DirectoryCache, JsonFileCache, MemoryCache};
pub use config::{ConfigError, SimlaConfig};
pub use directory::{BatchPolicy, DirectoryGateway, PhoneClearOutcome};
pub use error::GatewayError;
pub use simla::{SimlaClient, SimlaError};
