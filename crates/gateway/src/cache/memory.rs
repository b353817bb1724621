//! In-process cache backed by `moka`.
//!
//! Useful for hosts that fetch repeatedly within one process and do not want
//! files on disk.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use super::{CacheError, CacheKey, DirectoryCache};

/// In-memory cache.
#[derive(Clone)]
pub struct MemoryCache {
    entries: Cache<CacheKey, Arc<Vec<u8>>>,
}

impl MemoryCache {
    /// Create a cache with an optional time-to-live per entry.
    #[must_use]
    pub fn new(ttl: Option<Duration>) -> Self {
        let mut builder = Cache::<CacheKey, Arc<Vec<u8>>>::builder().max_capacity(64);
        if let Some(ttl) = ttl {
            builder = builder.time_to_live(ttl);
        }

        Self {
            entries: builder.build(),
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(None)
    }
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}

impl DirectoryCache for MemoryCache {
    async fn read(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.entries.get(key).await.map(|bytes| bytes.as_ref().clone()))
    }

    async fn write(&self, key: &CacheKey, contents: &[u8]) -> Result<(), CacheError> {
        self.entries
            .insert(key.clone(), Arc::new(contents.to_vec()))
            .await;
        Ok(())
    }
}
