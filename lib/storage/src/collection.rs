// Typed cache views for catalog data
use crate::cache::{AlbumCache, CacheStats};
use crate::key::cache_key;
use anyhow::Result;
use chrono::Duration;
use serde_json::Value;
use std::path::Path;
use vinylx_core::Album;

const PREFIX_COLLECTION: &str = "collection";
const PREFIX_RELEASE: &str = "release";
const PREFIX_SEARCH: &str = "search";

/// Default lifetimes per kind of catalog data
#[derive(Debug, Clone, Copy)]
pub struct CacheTtls {
    pub collection: Duration,
    pub release: Duration,
    pub search: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            collection: Duration::hours(24),
            release: Duration::hours(168),
            search: Duration::hours(6),
        }
    }
}

/// Collections, release details and search results over one [`AlbumCache`]
#[derive(Clone)]
pub struct CollectionCache {
    cache: AlbumCache,
    ttls: CacheTtls,
}

impl CollectionCache {
    pub fn new(cache: AlbumCache) -> Self {
        Self::with_ttls(cache, CacheTtls::default())
    }

    pub fn with_ttls(cache: AlbumCache, ttls: CacheTtls) -> Self {
        Self { cache, ttls }
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let ttls = CacheTtls::default();
        Ok(Self::with_ttls(AlbumCache::open(path, ttls.collection)?, ttls))
    }

    pub fn inner(&self) -> &AlbumCache {
        &self.cache
    }

    pub fn ttls(&self) -> CacheTtls {
        self.ttls
    }

    pub fn get_collection(&self, source: &str) -> Result<Option<Vec<Album>>> {
        let key = cache_key(PREFIX_COLLECTION, &[source]);
        let albums: Option<Vec<Album>> = self.cache.get(&key)?;
        match &albums {
            Some(albums) => {
                tracing::info!("Loaded {} albums from cache for {}", albums.len(), source)
            }
            None => tracing::debug!("No cached collection for {}", source),
        }
        Ok(albums)
    }

    pub fn set_collection(
        &self,
        source: &str,
        albums: &[Album],
        ttl: Option<Duration>,
    ) -> Result<()> {
        let key = cache_key(PREFIX_COLLECTION, &[source]);
        self.cache
            .set(&key, albums, Some(ttl.unwrap_or(self.ttls.collection)))?;
        tracing::info!("Cached {} albums for {}", albums.len(), source);
        Ok(())
    }

    /// Drop the cached collection of one source
    pub fn clear_collection(&self, source: &str) -> Result<bool> {
        self.cache.delete(&cache_key(PREFIX_COLLECTION, &[source]))
    }

    pub fn get_release_details(&self, release_id: u64) -> Result<Option<Value>> {
        self.cache
            .get(&cache_key(PREFIX_RELEASE, &[release_id.to_string()]))
    }

    pub fn set_release_details(
        &self,
        release_id: u64,
        details: &Value,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let key = cache_key(PREFIX_RELEASE, &[release_id.to_string()]);
        self.cache
            .set(&key, details, Some(ttl.unwrap_or(self.ttls.release)))
    }

    pub fn get_search_results(&self, query: &str, limit: usize) -> Result<Option<Vec<Value>>> {
        self.cache
            .get(&cache_key(PREFIX_SEARCH, &[query.to_string(), limit.to_string()]))
    }

    pub fn set_search_results(
        &self,
        query: &str,
        limit: usize,
        results: &[Value],
        ttl: Option<Duration>,
    ) -> Result<()> {
        let key = cache_key(PREFIX_SEARCH, &[query.to_string(), limit.to_string()]);
        self.cache
            .set(&key, results, Some(ttl.unwrap_or(self.ttls.search)))
    }

    pub fn stats(&self) -> Result<CacheStats> {
        self.cache.stats()
    }

    pub fn cleanup(&self) -> Result<u64> {
        self.cache.cleanup_expired()
    }

    pub fn clear(&self) -> Result<u64> {
        self.cache.clear()
    }
}
