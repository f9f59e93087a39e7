//! # vinylx Storage
//!
//! Persistent cache for catalog data, backed by LMDB.
//!
//! - [`AlbumCache`] - Key/value store with per-entry TTL and hit counts
//! - [`CollectionCache`] - Typed views for collections, releases and searches
//! - [`CachedProvider`] - Album provider that reads through the cache
//! - [`cache_key`] - Stable key derivation from a prefix and arguments

pub mod cache;
pub mod collection;
pub mod key;
pub mod provider;

pub use cache::{AlbumCache, CacheStats};
pub use collection::{CacheTtls, CollectionCache};
pub use key::cache_key;
pub use provider::{CachedProvider, CollectionSummary, LoadOrigin};
