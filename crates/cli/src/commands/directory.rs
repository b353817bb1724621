//! Credentials check and bulk fetch commands.
//!
//! # Usage
//!
//! ```bash
//! simla check
//! simla customers [--no-cache] [--json]
//! simla orders [--no-cache] [--json]
//! ```

use indexmap::IndexMap;

use super::{CommandError, Gateway, write_json};

/// Verify the configured credentials.
pub async fn check(gateway: &Gateway) -> Result<(), CommandError> {
    let credentials = gateway.try_check().await?;

    tracing::info!(
        site_access = credentials.site_access.as_deref().unwrap_or("unknown"),
        sites = ?credentials.sites_available,
        "Credentials are valid ({} API methods allowed)",
        credentials.credentials.len()
    );
    Ok(())
}

/// Fetch customers grouped by site.
pub async fn customers(gateway: &Gateway, no_cache: bool, json: bool) -> Result<(), CommandError> {
    let grouped = gateway.try_cached_customers_by_site(no_cache).await?;

    if json {
        return write_json(&grouped);
    }
    for (site, count) in entry_counts(&grouped, IndexMap::len) {
        tracing::info!("{site}: {count} customers");
    }
    Ok(())
}

/// Fetch orders grouped by site and customer.
pub async fn orders(gateway: &Gateway, no_cache: bool, json: bool) -> Result<(), CommandError> {
    let grouped = gateway.try_cached_orders_by_site(no_cache).await?;

    if json {
        return write_json(&grouped);
    }
    let counts = entry_counts(&grouped, |by_customer| {
        by_customer.values().map(Vec::len).sum()
    });
    for (site, count) in counts {
        tracing::info!("{site}: {count} orders");
    }
    Ok(())
}

/// Per-site totals, in site order.
fn entry_counts<'a, V>(
    grouped: &'a IndexMap<String, V>,
    count: impl Fn(&V) -> usize,
) -> Vec<(&'a str, usize)> {
    grouped
        .iter()
        .map(|(site, entries)| (site.as_str(), count(entries)))
        .collect()
}
