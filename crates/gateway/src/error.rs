//! Unified error handling for the gateway.

use simla_core::ByIdentifier;
use thiserror::Error;
use tracing::error;

use crate::cache::CacheError;
use crate::simla::SimlaError;

/// Failure of a gateway operation.
///
/// Remote faults carry whatever the CRM reported; every other variant is a
/// local fault and has no HTTP status.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The CRM rejected the request or could not be reached.
    #[error("Simla error: {0}")]
    Remote(#[from] SimlaError),

    /// The cache backend failed.
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Cached content or an outgoing payload was not valid JSON for its type.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The customer lacks the identifier the request is routed by.
    #[error("Customer has no {0} to route the request by")]
    MissingIdentifier(ByIdentifier),
}

impl GatewayError {
    /// HTTP status of a remote fault, `None` for local faults.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Remote(e) => e.status_code(),
            _ => None,
        }
    }

    /// Whether the failure came from the CRM rather than from this process.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

/// Log a swallowed failure at error level.
pub(crate) fn log_failure(operation: &str, err: &GatewayError) {
    match err {
        GatewayError::Remote(e) => match e.status_code() {
            Some(status) => error!(
                operation,
                status,
                "Error from Simla API (status code: {status}): {e}"
            ),
            None => error!(operation, "Error from Simla API: {e}"),
        },
        local => error!(operation, "Local failure in {operation}: {local}"),
    }
}
