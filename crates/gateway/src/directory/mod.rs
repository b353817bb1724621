//! Remote directory gateway.
//!
//! Wraps a [`CrmApi`] implementation and a [`DirectoryCache`] and exposes the
//! operations the host application needs:
//!
//! - **Credentials check**: [`DirectoryGateway::check`]
//! - **Bulk fetch**: [`DirectoryGateway::cached_customers_by_site`],
//!   [`DirectoryGateway::cached_orders_by_site`]
//! - **Mutations**: edit, duplicate-phone clearing, combine, subscriptions
//!
//! # Error policy
//!
//! Each fallible operation has a `try_*` form returning [`GatewayError`] and a
//! lenient form that logs the failure and returns an empty value instead.
//! [`DirectoryGateway::customers_combine`] is the exception: it always hands
//! the classified [`SimlaError`](crate::simla::SimlaError) back to the caller.
//!
//! Every operation runs its requests one after another; nothing is fetched
//! concurrently.

mod fetch;
mod grouping;
mod mutations;

#[cfg(test)]
mod mock;

pub use grouping::{group_customers, group_orders};
pub use mutations::{BatchPolicy, PhoneClearOutcome};

use tracing::{debug, instrument};

use crate::api::CrmApi;
use crate::cache::{CacheKey, CacheKind, DirectoryCache, JsonFileCache};
use crate::config::SimlaConfig;
use crate::error::{GatewayError, log_failure};
use crate::simla::{Credentials, SimlaClient, SimlaError};

/// Page size requested from list endpoints.
pub const PAGE_LIMIT: u32 = 100;

/// Gateway between the host application and the CRM.
pub struct DirectoryGateway<C, K> {
    client: C,
    cache: K,
    api_url: String,
    log_payloads: bool,
}

impl<C, K> DirectoryGateway<C, K> {
    /// Create a gateway. `api_url` namespaces the cache entries.
    pub fn new(client: C, cache: K, api_url: impl Into<String>) -> Self {
        Self {
            client,
            cache,
            api_url: api_url.into(),
            log_payloads: false,
        }
    }

    /// Log full customer payloads at debug level.
    ///
    /// Payloads contain personal data; keep this off outside of debugging.
    #[must_use]
    pub const fn with_payload_logging(mut self, enabled: bool) -> Self {
        self.log_payloads = enabled;
        self
    }

    /// The underlying CRM client.
    pub const fn client(&self) -> &C {
        &self.client
    }

    /// The cache backend.
    pub const fn cache(&self) -> &K {
        &self.cache
    }

    /// Account URL used to namespace cache entries.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn cache_key(&self, kind: CacheKind) -> CacheKey {
        CacheKey::new(&self.api_url, kind)
    }
}

impl DirectoryGateway<SimlaClient, JsonFileCache> {
    /// Build the production gateway: HTTP client plus file cache.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn from_config(config: &SimlaConfig) -> Result<Self, SimlaError> {
        let client = SimlaClient::new(config)?;
        let cache = JsonFileCache::new(&config.cache_dir).with_ttl(config.cache_ttl);

        Ok(Self::new(client, cache, config.api_url.clone())
            .with_payload_logging(config.log_payloads))
    }
}

impl<C: CrmApi, K: DirectoryCache> DirectoryGateway<C, K> {
    /// Verify the configured credentials.
    ///
    /// # Errors
    ///
    /// Returns the remote fault if the CRM rejects the key or cannot be reached.
    #[instrument(skip(self))]
    pub async fn try_check(&self) -> Result<Credentials, GatewayError> {
        let credentials = self.client.credentials().await?;
        debug!(?credentials, "Credentials response");
        Ok(credentials)
    }

    /// Verify the configured credentials, logging any failure.
    pub async fn check(&self) -> Option<Credentials> {
        match self.try_check().await {
            Ok(credentials) => Some(credentials),
            Err(e) => {
                log_failure("credentials check", &e);
                None
            }
        }
    }
}

impl<C, K> std::fmt::Debug for DirectoryGateway<C, K>
where
    C: std::fmt::Debug,
    K: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryGateway")
            .field("client", &self.client)
            .field("cache", &self.cache)
            .field("api_url", &self.api_url)
            .field("log_payloads", &self.log_payloads)
            .finish()
    }
}
