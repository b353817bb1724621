//! Integration tests for the Simla directory gateway.
//!
//! The tests drive the real [`SimlaClient`] and [`DirectoryGateway`] against
//! a local `mockito` server, with the file cache in a temporary directory.
//! No network access or credentials are needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p simla-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `simla_client` - Wire format and error classification
//! - `directory_fetch` - Pagination, grouping and caching
//! - `customer_mutations` - Edit, phone clearing, combine, subscriptions

use std::time::Duration;

use secrecy::SecretString;
use simla_gateway::{
    CacheKey, CacheKind, DirectoryGateway, JsonFileCache, SimlaClient, SimlaConfig,
};
use tempfile::TempDir;

/// API key sent by every test client.
pub const TEST_API_KEY: &str = "Qw8fZ2LmN4xR7tYb1KcV9pHs3JdE6uGa";

/// Gateway under test plus the temporary cache directory it writes to.
pub struct TestContext {
    pub gateway: DirectoryGateway<SimlaClient, JsonFileCache>,
    pub cache_dir: TempDir,
}

impl TestContext {
    /// Build a gateway pointed at `api_url` with an empty cache directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory or the HTTP client cannot be created.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new(api_url: &str) -> Self {
        let cache_dir = tempfile::tempdir().expect("failed to create cache dir");
        let config = SimlaConfig {
            api_url: api_url.to_string(),
            api_key: SecretString::from(TEST_API_KEY.to_string()),
            cache_dir: cache_dir.path().to_path_buf(),
            cache_ttl: None,
            timeout: Duration::from_secs(5),
            log_payloads: false,
        };
        let gateway = DirectoryGateway::from_config(&config).expect("failed to build gateway");

        Self { gateway, cache_dir }
    }

    /// Path of the cache file for `kind`.
    #[must_use]
    pub fn cache_file(&self, kind: CacheKind) -> std::path::PathBuf {
        self.gateway
            .cache()
            .path_for(&CacheKey::new(self.gateway.api_url(), kind))
    }
}

/// JSON body of a list page.
#[must_use]
pub fn page_body(entity: &str, items: &serde_json::Value, page: u32, total_pages: u32) -> String {
    serde_json::json!({
        "success": true,
        entity: items,
        "pagination": {
            "limit": 100,
            "totalCount": total_pages * 100,
            "currentPage": page,
            "totalPageCount": total_pages
        }
    })
    .to_string()
}
