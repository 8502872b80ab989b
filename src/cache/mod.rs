//! Remote fetch cache
//!
//! Every outbound fetch in the crate goes through [`FetchCache`], which:
//! - Returns stored results without touching the network while they are fresh
//! - Collapses concurrent requests for the same key into one fetch
//! - Never stores failures, so the next call retries
//!
//! Results are kept in a pluggable [`CacheStore`](crate::storage::CacheStore).

mod fetch_cache;
mod key;

pub use fetch_cache::{Cacheable, EntryState, FetchCache, DEFAULT_TTL};
pub use key::CacheKey;

use crate::config::{CacheBackend, CacheConfig};
use crate::storage::{CacheStore, MemoryStore, SqliteStore};
use crate::Result;
use std::path::Path;
use std::sync::Arc;

/// Opens the cache described by the `[cache]` configuration section
///
/// # Arguments
///
/// * `config` - The cache configuration
///
/// # Returns
///
/// * `Ok(FetchCache)` - Cache over the configured backend
/// * `Err(ArchiveError::Storage)` - The sqlite database could not be opened
pub fn open_cache(config: &CacheConfig) -> Result<FetchCache> {
    let store: Arc<dyn CacheStore> = match config.backend {
        CacheBackend::Memory => Arc::new(MemoryStore::new()),
        CacheBackend::Sqlite => {
            let path = config.sqlite_path.as_deref().unwrap_or("archive-cache.db");
            tracing::debug!("Opening sqlite cache at {}", path);
            let store = SqliteStore::new(Path::new(path))?;
            let purged = store.purge_expired()?;
            if purged > 0 {
                tracing::info!("Purged {} expired cache entries", purged);
            }
            Arc::new(store)
        }
    };

    Ok(FetchCache::new(store, config.ttl()))
}
