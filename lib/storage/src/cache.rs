// LMDB-backed key/value cache with per-entry TTL
use anyhow::Result;
use chrono::{Duration, Utc};
use heed::types::{Bytes, Str};
use heed::{Database, Env, EnvOpenOptions};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

const DB_ENTRIES: &str = "cache_entries";
const MAP_SIZE: usize = 1024 * 1024 * 1024; // 1GB

/// Stored envelope; `data` is the JSON encoding of the cached value
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    created_at: i64,
    /// Milliseconds since the epoch, `None` for entries that never expire
    expires_at: Option<i64>,
    hit_count: u64,
    data: Vec<u8>,
}

impl CacheEntry {
    fn is_expired(&self, now: i64) -> bool {
        matches!(self.expires_at, Some(at) if now > at)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: u64,
    /// Size of the cached payloads
    pub total_size_bytes: u64,
    pub expired_entries: u64,
    pub avg_hit_count: f64,
    pub max_hit_count: u64,
}

/// Persistent cache; cloning shares the same environment
#[derive(Clone)]
pub struct AlbumCache {
    env: Arc<Env>,
    entries_db: Database<Str, Bytes>,
    default_ttl: Duration,
}

impl AlbumCache {
    pub fn open<P: AsRef<Path>>(path: P, default_ttl: Duration) -> Result<Self> {
        std::fs::create_dir_all(&path)?;

        let env = Arc::new(unsafe {
            EnvOpenOptions::new()
                .map_size(MAP_SIZE)
                .max_dbs(1)
                .open(path.as_ref())?
        });

        let mut wtxn = env.write_txn()?;
        let entries_db = env.create_database(&mut wtxn, Some(DB_ENTRIES))?;
        wtxn.commit()?;

        tracing::debug!("Opened cache at {}", path.as_ref().display());

        Ok(Self {
            env,
            entries_db,
            default_ttl,
        })
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }

    /// Fetch a value, counting the hit
    ///
    /// Expired or undecodable entries are removed and reported as a miss.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let mut wtxn = self.env.write_txn()?;
        let bytes = self.entries_db.get(&wtxn, key)?.map(<[u8]>::to_vec);
        let Some(bytes) = bytes else {
            return Ok(None);
        };

        let mut entry: CacheEntry = match bincode::deserialize(&bytes) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Dropping corrupt cache entry {}: {}", key, e);
                self.entries_db.delete(&mut wtxn, key)?;
                wtxn.commit()?;
                return Ok(None);
            }
        };
        if entry.is_expired(Self::now()) {
            self.entries_db.delete(&mut wtxn, key)?;
            wtxn.commit()?;
            tracing::debug!("Cache entry {} expired", key);
            return Ok(None);
        }

        let value = match serde_json::from_slice(&entry.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Dropping undecodable cache entry {}: {}", key, e);
                self.entries_db.delete(&mut wtxn, key)?;
                wtxn.commit()?;
                return Ok(None);
            }
        };

        entry.hit_count += 1;
        self.entries_db
            .put(&mut wtxn, key, &bincode::serialize(&entry)?)?;
        wtxn.commit()?;
        Ok(Some(value))
    }

    /// Store a value
    ///
    /// `ttl` of `None` uses the default TTL; a zero TTL never expires.
    pub fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let now = Self::now();
        let entry = CacheEntry {
            created_at: now,
            expires_at: (!ttl.is_zero()).then(|| now + ttl.num_milliseconds()),
            hit_count: 0,
            data: serde_json::to_vec(value)?,
        };

        let mut wtxn = self.env.write_txn()?;
        self.entries_db
            .put(&mut wtxn, key, &bincode::serialize(&entry)?)?;
        wtxn.commit()?;
        Ok(())
    }

    pub fn contains(&self, key: &str) -> Result<bool> {
        let rtxn = self.env.read_txn()?;
        Ok(self.entries_db.get(&rtxn, key)?.is_some())
    }

    pub fn delete(&self, key: &str) -> Result<bool> {
        let mut wtxn = self.env.write_txn()?;
        let existed = self.entries_db.delete(&mut wtxn, key)?;
        wtxn.commit()?;
        Ok(existed)
    }

    /// Remove every entry, returning how many there were
    pub fn clear(&self) -> Result<u64> {
        let mut wtxn = self.env.write_txn()?;
        let count = self.entries_db.len(&wtxn)?;
        self.entries_db.clear(&mut wtxn)?;
        wtxn.commit()?;
        tracing::info!("Cleared {} cache entries", count);
        Ok(count)
    }

    /// Remove expired entries, returning how many were removed
    ///
    /// Entries whose envelope no longer decodes count as expired.
    pub fn cleanup_expired(&self) -> Result<u64> {
        let now = Self::now();
        let mut wtxn = self.env.write_txn()?;

        let mut expired = Vec::new();
        for result in self.entries_db.iter(&wtxn)? {
            let (key, bytes) = result?;
            let stale = match bincode::deserialize::<CacheEntry>(bytes) {
                Ok(entry) => entry.is_expired(now),
                Err(_) => true,
            };
            if stale {
                expired.push(key.to_string());
            }
        }

        for key in &expired {
            self.entries_db.delete(&mut wtxn, key)?;
        }
        wtxn.commit()?;

        if !expired.is_empty() {
            tracing::info!("Removed {} expired cache entries", expired.len());
        }
        Ok(expired.len() as u64)
    }

    pub fn stats(&self) -> Result<CacheStats> {
        let now = Self::now();
        let rtxn = self.env.read_txn()?;
        let mut stats = CacheStats::default();
        let mut total_hits = 0u64;

        for result in self.entries_db.iter(&rtxn)? {
            let (_, bytes) = result?;
            stats.total_entries += 1;
            let Ok(entry) = bincode::deserialize::<CacheEntry>(bytes) else {
                // Unreadable; cleanup_expired removes it
                stats.expired_entries += 1;
                stats.total_size_bytes += bytes.len() as u64;
                continue;
            };
            stats.total_size_bytes += entry.data.len() as u64;
            if entry.is_expired(now) {
                stats.expired_entries += 1;
            }
            total_hits += entry.hit_count;
            stats.max_hit_count = stats.max_hit_count.max(entry.hit_count);
        }

        if stats.total_entries > 0 {
            stats.avg_hit_count = total_hits as f64 / stats.total_entries as f64;
        }
        Ok(stats)
    }
}
