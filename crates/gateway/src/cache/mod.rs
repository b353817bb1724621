//! Persistence for assembled list results.
//!
//! The gateway only ever stores two blobs per CRM account (grouped customers
//! and grouped orders), so the cache is a plain key → bytes store. Entries are
//! replaced wholesale; there is no partial update and no eviction beyond the
//! optional TTL.

mod file;
mod memory;

pub use file::JsonFileCache;
pub use memory::MemoryCache;

use std::future::Future;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a cache backend.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Filesystem operation failed.
    #[error("Cache I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Which grouped result an entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKind {
    Customers,
    Orders,
}

impl CacheKind {
    /// Suffix appended to the account namespace.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customers => "customers",
            Self::Orders => "orders",
        }
    }
}

/// Cache entry key: the CRM account plus the kind of result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    namespace: String,
    kind: CacheKind,
}

impl CacheKey {
    /// Key for `kind` results fetched from the account at `api_url`.
    #[must_use]
    pub fn new(api_url: &str, kind: CacheKind) -> Self {
        Self {
            namespace: sanitize_api_url(api_url),
            kind,
        }
    }

    /// Account namespace derived from the API URL.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub const fn kind(&self) -> CacheKind {
        self.kind
    }

    /// File name used by file-backed caches, e.g. `shop.simla.com_customers.json`.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}_{}.json", self.namespace, self.kind.as_str())
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.namespace, self.kind.as_str())
    }
}

/// Strip `/`, `:` and the literal `https` from an API URL.
///
/// Replacements run in that order, so `http://` collapses to `http` while
/// `https://` disappears entirely.
#[must_use]
#[allow(clippy::collapsible_str_replace)] // `https` must go after `:` and `/`
pub fn sanitize_api_url(api_url: &str) -> String {
    api_url
        .replace('/', "")
        .replace(':', "")
        .replace("https", "")
}

/// Key → bytes store for grouped list results.
pub trait DirectoryCache: Send + Sync {
    /// Read an entry. `Ok(None)` when absent or expired.
    fn read(
        &self,
        key: &CacheKey,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, CacheError>> + Send;

    /// Replace an entry with `contents`.
    fn write(
        &self,
        key: &CacheKey,
        contents: &[u8],
    ) -> impl Future<Output = Result<(), CacheError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_https_url() {
        assert_eq!(sanitize_api_url("https://shop.simla.com"), "shop.simla.com");
        assert_eq!(
            sanitize_api_url("https://shop.simla.com:8443/"),
            "shop.simla.com8443"
        );
    }

    #[test]
    fn test_sanitize_http_url_keeps_scheme_text() {
        assert_eq!(
            sanitize_api_url("http://127.0.0.1:1234"),
            "http127.0.0.11234"
        );
    }

    #[test]
    fn test_cache_key_file_names() {
        let customers = CacheKey::new("https://shop.simla.com", CacheKind::Customers);
        let orders = CacheKey::new("https://shop.simla.com", CacheKind::Orders);

        assert_eq!(customers.file_name(), "shop.simla.com_customers.json");
        assert_eq!(orders.file_name(), "shop.simla.com_orders.json");
        assert_eq!(customers.to_string(), "shop.simla.com_customers");
        assert_ne!(customers, orders);
    }
}
