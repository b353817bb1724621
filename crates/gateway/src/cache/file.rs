//! File-backed cache.
//!
//! Each entry is one JSON file under the cache directory. Writes go to a
//! temporary sibling first and are renamed into place, so readers see either
//! the previous file or the complete new one.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::fs;
use tracing::debug;

use super::{CacheError, CacheKey, DirectoryCache};

/// Cache storing entries as files in a directory.
#[derive(Debug, Clone)]
pub struct JsonFileCache {
    dir: PathBuf,
    ttl: Option<Duration>,
}

impl JsonFileCache {
    /// Create a cache rooted at `dir`. Entries never expire.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ttl: None,
        }
    }

    /// Treat files older than `ttl` as missing.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl = ttl;
        self
    }

    /// Directory holding the cache files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of the file backing `key`.
    #[must_use]
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    fn is_stale(&self, modified: SystemTime) -> bool {
        self.ttl.is_some_and(|ttl| {
            // A modification time in the future counts as fresh.
            modified.elapsed().is_ok_and(|age| age > ttl)
        })
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> CacheError + '_ {
    move |source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl DirectoryCache for JsonFileCache {
    async fn read(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.path_for(key);

        let metadata = match fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&path)(e)),
        };

        if self.ttl.is_some() {
            let modified = metadata.modified().map_err(io_error(&path))?;
            if self.is_stale(modified) {
                debug!(path = %path.display(), "Cache file expired");
                return Ok(None);
            }
        }

        match fs::read(&path).await {
            Ok(contents) => Ok(Some(contents)),
            // Removed between the metadata check and the read.
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path)(e)),
        }
    }

    async fn write(&self, key: &CacheKey, contents: &[u8]) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(io_error(&self.dir))?;

        let path = self.path_for(key);
        let tmp_path = self
            .dir
            .join(format!(".{}.{}.tmp", key.file_name(), std::process::id()));

        fs::write(&tmp_path, contents)
            .await
            .map_err(io_error(&tmp_path))?;

        if let Err(e) = fs::rename(&tmp_path, &path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(io_error(&path)(e));
        }

        debug!(path = %path.display(), bytes = contents.len(), "Cache file written");
        Ok(())
    }
}
