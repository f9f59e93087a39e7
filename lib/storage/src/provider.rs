// Provider decorator that consults the cache first
use crate::collection::CollectionCache;
use chrono::Duration;
use serde::Serialize;
use std::collections::BTreeSet;
use vinylx_core::{Album, AlbumProvider, Result};

/// Where a load was served from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadOrigin {
    Cache,
    Source,
}

/// Wraps a provider with [`CollectionCache`]
///
/// Cache failures are logged and fall through to the wrapped provider; they
/// never fail a load.
pub struct CachedProvider<P> {
    inner: P,
    cache: CollectionCache,
    ttl: Option<Duration>,
    force_refresh: bool,
}

impl<P: AlbumProvider> CachedProvider<P> {
    pub fn new(inner: P, cache: CollectionCache) -> Self {
        Self {
            inner,
            cache,
            ttl: None,
            force_refresh: false,
        }
    }

    /// Override the collection TTL
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Skip the cache lookup and always reload from the source
    pub fn force_refresh(mut self, force: bool) -> Self {
        self.force_refresh = force;
        self
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn cache(&self) -> &CollectionCache {
        &self.cache
    }

    pub fn load(&self) -> Result<(Vec<Album>, LoadOrigin)> {
        let key = self.inner.source_key();

        if !self.force_refresh {
            match self.cache.get_collection(&key) {
                Ok(Some(albums)) => return Ok((albums, LoadOrigin::Cache)),
                Ok(None) => {}
                Err(e) => tracing::warn!("Cache lookup failed for {}: {}", key, e),
            }
        }

        let albums = self.inner.albums()?;
        if let Err(e) = self.cache.set_collection(&key, &albums, self.ttl) {
            tracing::warn!("Failed to cache collection {}: {}", key, e);
        }
        Ok((albums, LoadOrigin::Source))
    }

    /// Load the collection and summarize it
    pub fn sync(&self) -> Result<(Vec<Album>, CollectionSummary)> {
        tracing::info!("Starting collection sync for {}", self.inner.source_key());
        let (albums, origin) = self.load()?;
        let summary = CollectionSummary::from_albums(&albums, origin);
        tracing::info!("Collection sync complete: {} albums", summary.total_albums);
        Ok((albums, summary))
    }
}

impl<P: AlbumProvider> AlbumProvider for CachedProvider<P> {
    fn source_key(&self) -> String {
        self.inner.source_key()
    }

    fn albums(&self) -> Result<Vec<Album>> {
        self.load().map(|(albums, _)| albums)
    }
}

/// Counts over a loaded collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionSummary {
    pub total_albums: usize,
    pub unique_artists: usize,
    pub unique_genres: usize,
    pub unique_labels: usize,
    pub earliest_year: Option<i32>,
    pub latest_year: Option<i32>,
    pub origin: LoadOrigin,
}

impl CollectionSummary {
    pub fn from_albums(albums: &[Album], origin: LoadOrigin) -> Self {
        let artists: BTreeSet<&str> = albums.iter().map(|a| a.artist.as_str()).collect();
        let genres: BTreeSet<&str> = albums
            .iter()
            .flat_map(|a| a.genres.iter().map(String::as_str))
            .collect();
        let labels: BTreeSet<&str> = albums
            .iter()
            .flat_map(|a| a.labels.iter().map(String::as_str))
            .collect();
        let years = || albums.iter().filter_map(Album::known_year);

        Self {
            total_albums: albums.len(),
            unique_artists: artists.len(),
            unique_genres: genres.len(),
            unique_labels: labels.len(),
            earliest_year: years().min(),
            latest_year: years().max(),
            origin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::TempDir;
    use vinylx_core::StaticProvider;

    /// Counts how often the source is hit
    struct CountingProvider {
        inner: StaticProvider,
        calls: Cell<usize>,
    }

    impl AlbumProvider for CountingProvider {
        fn source_key(&self) -> String {
            self.inner.source_key()
        }

        fn albums(&self) -> Result<Vec<Album>> {
            self.calls.set(self.calls.get() + 1);
            self.inner.albums()
        }
    }

    fn setup() -> (TempDir, CollectionCache, CountingProvider) {
        let dir = TempDir::new().unwrap();
        let cache = CollectionCache::open(dir.path()).unwrap();
        let albums = vec![
            Album::new(1, "Kind of Blue", "Miles Davis")
                .with_year(1959)
                .with_genres(["Jazz"])
                .with_labels(["Columbia"]),
            Album::new(2, "Bitches Brew", "Miles Davis")
                .with_year(1970)
                .with_genres(["Jazz", "Rock"])
                .with_labels(["Columbia"]),
        ];
        let provider = CountingProvider {
            inner: StaticProvider::new("miles", albums),
            calls: Cell::new(0),
        };
        (dir, cache, provider)
    }

    #[test]
    fn test_second_load_served_from_cache() {
        let (_dir, cache, provider) = setup();
        let cached = CachedProvider::new(&provider, cache);

        let (first, origin) = cached.load().unwrap();
        assert_eq!(origin, LoadOrigin::Source);
        let (second, origin) = cached.load().unwrap();
        assert_eq!(origin, LoadOrigin::Cache);

        assert_eq!(first, second);
        assert_eq!(provider.calls.get(), 1);
    }

    #[test]
    fn test_force_refresh_bypasses_cache() {
        let (_dir, cache, provider) = setup();
        let cached = CachedProvider::new(&provider, cache).force_refresh(true);

        cached.albums().unwrap();
        cached.albums().unwrap();
        assert_eq!(provider.calls.get(), 2);
    }

    #[test]
    fn test_sync_summary() {
        let (_dir, cache, provider) = setup();
        let (albums, summary) = CachedProvider::new(&provider, cache).sync().unwrap();

        assert_eq!(albums.len(), 2);
        assert_eq!(summary.total_albums, 2);
        assert_eq!(summary.unique_artists, 1);
        assert_eq!(summary.unique_genres, 2);
        assert_eq!(summary.unique_labels, 1);
        assert_eq!(summary.earliest_year, Some(1959));
        assert_eq!(summary.latest_year, Some(1970));
        assert_eq!(summary.origin, LoadOrigin::Source);
    }

    #[test]
    fn test_summary_ignores_implausible_years() {
        let albums = vec![
            Album::new(1, "Cylinder", "Somebody").with_year(1850),
            Album::new(2, "Unknown", "Somebody").with_year(0),
            Album::new(3, "Blue Train", "John Coltrane").with_year(1957),
            Album::new(4, "Giant Steps", "John Coltrane").with_year(1960),
        ];
        let summary = CollectionSummary::from_albums(&albums, LoadOrigin::Cache);
        assert_eq!(summary.earliest_year, Some(1957));
        assert_eq!(summary.latest_year, Some(1960));

        let undated = CollectionSummary::from_albums(&albums[..2], LoadOrigin::Cache);
        assert_eq!(undated.earliest_year, None);
        assert_eq!(undated.latest_year, None);
    }
}
