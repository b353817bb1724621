//! Paginated bulk fetches with cache short-circuit.

use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;
use simla_core::{GroupedCustomers, GroupedOrders};
use tracing::{debug, info, instrument, warn};

use super::grouping::{group_customers, group_orders};
use super::{DirectoryGateway, PAGE_LIMIT};
use crate::api::CrmApi;
use crate::cache::{CacheKey, CacheKind, DirectoryCache};
use crate::error::{GatewayError, log_failure};
use crate::simla::{Pagination, SimlaError};

/// Request pages 1..=N, where N is the total page count the latest page reports.
///
/// At least one page is always requested. Returns the number of pages fetched.
/// An API that under-reports its total page count truncates the result.
async fn paginate<T, F, Fut>(
    mut fetch: F,
    mut on_page: impl FnMut(Vec<T>),
) -> Result<u32, SimlaError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<(Vec<T>, Pagination), SimlaError>>,
{
    let mut page = 1;
    loop {
        let (items, pagination) = fetch(page).await?;
        debug!(
            page,
            total_pages = pagination.total_page_count,
            items = items.len(),
            "Fetched page"
        );
        on_page(items);

        if page >= pagination.total_page_count {
            return Ok(page);
        }
        page += 1;
    }
}

impl<C: CrmApi, K: DirectoryCache> DirectoryGateway<C, K> {
    /// All customers grouped by site, from cache unless `no_cache` is set.
    ///
    /// # Errors
    ///
    /// Returns the remote fault if any page fails (nothing is cached then),
    /// or a local fault if the cache cannot be read or holds invalid JSON.
    #[instrument(skip(self))]
    pub async fn try_cached_customers_by_site(
        &self,
        no_cache: bool,
    ) -> Result<GroupedCustomers, GatewayError> {
        let key = self.cache_key(CacheKind::Customers);
        if !no_cache && let Some(cached) = self.read_cached(&key).await? {
            return Ok(cached);
        }

        let mut grouped = GroupedCustomers::new();
        let pages = paginate(
            |page| async move {
                let response = self.client.list_customers(page, PAGE_LIMIT).await?;
                Ok::<_, SimlaError>((response.customers, response.pagination))
            },
            |customers| group_customers(&mut grouped, customers),
        )
        .await?;

        info!(pages, sites = grouped.len(), "Customers fetched");
        self.store(&key, &grouped).await;
        Ok(grouped)
    }

    /// All customers grouped by site; empty if the fetch failed.
    pub async fn cached_customers_by_site(&self, no_cache: bool) -> GroupedCustomers {
        self.try_cached_customers_by_site(no_cache)
            .await
            .unwrap_or_else(|e| {
                log_failure("customers fetch", &e);
                GroupedCustomers::new()
            })
    }

    /// All orders grouped by site then customer, from cache unless `no_cache` is set.
    ///
    /// # Errors
    ///
    /// Same as [`DirectoryGateway::try_cached_customers_by_site`].
    #[instrument(skip(self))]
    pub async fn try_cached_orders_by_site(
        &self,
        no_cache: bool,
    ) -> Result<GroupedOrders, GatewayError> {
        let key = self.cache_key(CacheKind::Orders);
        if !no_cache && let Some(cached) = self.read_cached(&key).await? {
            return Ok(cached);
        }

        let mut grouped = GroupedOrders::new();
        let pages = paginate(
            |page| async move {
                let response = self.client.list_orders(page, PAGE_LIMIT).await?;
                Ok::<_, SimlaError>((response.orders, response.pagination))
            },
            |orders| group_orders(&mut grouped, orders),
        )
        .await?;

        info!(pages, sites = grouped.len(), "Orders fetched");
        self.store(&key, &grouped).await;
        Ok(grouped)
    }

    /// All orders grouped by site then customer; empty if the fetch failed.
    pub async fn cached_orders_by_site(&self, no_cache: bool) -> GroupedOrders {
        self.try_cached_orders_by_site(no_cache)
            .await
            .unwrap_or_else(|e| {
                log_failure("orders fetch", &e);
                GroupedOrders::new()
            })
    }

    async fn read_cached<T: DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> Result<Option<T>, GatewayError> {
        let Some(bytes) = self.cache.read(key).await? else {
            return Ok(None);
        };

        debug!(%key, bytes = bytes.len(), "Serving from cache");
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Persist a freshly fetched result. A failed write is logged, not returned:
    /// the data is already in hand and the next fetch will simply miss.
    async fn store<T: Serialize + Sync>(&self, key: &CacheKey, value: &T) {
        let result = match serde_json::to_vec(value) {
            Ok(bytes) => self
                .cache
                .write(key, &bytes)
                .await
                .map_err(GatewayError::from),
            Err(e) => Err(e.into()),
        };

        if let Err(e) = result {
            warn!(%key, error = %e, "Failed to write cache entry");
        }
    }
}
