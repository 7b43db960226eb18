use crate::models::Collection;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Configuration for the response cache
#[derive(Clone, Debug)]
pub struct CacheConfig {
    /// How long to keep a response
    pub ttl: Duration,
    /// Maximum number of cached entries
    pub max_entries: usize,
    /// Whether caching is enabled
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::minutes(5),
            max_entries: 500,
            enabled: true,
        }
    }
}

impl CacheConfig {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries,
            enabled: true,
        }
    }
}

/// Cached response body with metadata
#[derive(Clone, Debug)]
pub struct CachedResponse {
    pub data: Value,
    pub collection: Collection,
    pub created_at: DateTime<Utc>,
    pub ttl: Duration,
}

impl CachedResponse {
    pub fn new(data: Value, collection: Collection, ttl: Duration) -> Self {
        Self {
            data,
            collection,
            created_at: Utc::now(),
            ttl,
        }
    }

    /// Check if the cached response is still valid
    pub fn is_valid(&self) -> bool {
        self.created_at
            .checked_add_signed(self.ttl)
            .map_or(true, |expires_at| Utc::now() < expires_at)
    }
}

/// Cache key for GET requests
#[derive(Hash, Eq, PartialEq, Clone, Debug)]
pub enum CacheKey {
    Record(String), // Hash of a single-record url
    Count(String),  // Hash of a count url
}

impl CacheKey {
    pub fn record(url: &str) -> Self {
        CacheKey::Record(Self::digest(url))
    }

    pub fn count(url: &str) -> Self {
        CacheKey::Count(Self::digest(url))
    }

    fn digest(url: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// In-memory cache implementation using DashMap for thread safety
pub struct ResponseCache {
    cache: DashMap<CacheKey, CachedResponse>,
    /// Bumped by every invalidation of a collection.
    epochs: DashMap<Collection, u64>,
    pub config: CacheConfig,
}

impl ResponseCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            cache: DashMap::new(),
            epochs: DashMap::new(),
            config,
        }
    }

    /// Get cached body if available and valid
    pub fn get(&self, key: &CacheKey) -> Option<Value> {
        if !self.config.enabled {
            return None;
        }

        if let Some(cached) = self.cache.get(key) {
            if cached.is_valid() {
                log::debug!("Cache hit for key: {:?}", key);
                return Some(cached.data.clone());
            }
        }

        if self.cache.remove_if(key, |_, cached| !cached.is_valid()).is_some() {
            log::debug!("Cache expired for key: {:?}", key);
        } else {
            log::debug!("Cache miss for key: {:?}", key);
        }
        None
    }

    /// Store a body in cache
    pub fn put(&self, key: CacheKey, collection: Collection, data: Value) {
        if !self.config.enabled {
            return;
        }

        if self.cache.len() >= self.config.max_entries {
            self.evict_expired();

            if self.cache.len() >= self.config.max_entries {
                self.evict_oldest();
            }
        }

        let cached = CachedResponse::new(data, collection, self.config.ttl);
        self.cache.insert(key.clone(), cached);
        log::debug!("Stored in cache with key: {:?}", key);
    }

    /// Current invalidation epoch of `collection`. Capture it before a
    /// request and hand it to [`ResponseCache::put_since`].
    pub fn epoch(&self, collection: Collection) -> u64 {
        self.epochs.get(&collection).map(|epoch| *epoch).unwrap_or(0)
    }

    /// Store a body fetched while `collection` was at `epoch`. Nothing is
    /// kept if the collection was invalidated in the meantime.
    pub fn put_since(&self, key: CacheKey, collection: Collection, epoch: u64, data: Value) {
        if self.epoch(collection) != epoch {
            log::debug!("Discarded stale response for key: {:?}", key);
            return;
        }
        self.put(key.clone(), collection, data);
        if self.epoch(collection) != epoch {
            self.cache.remove(&key);
            log::debug!("Discarded stale response for key: {:?}", key);
        }
    }

    /// Drop every entry of `collection`; called after a mutation.
    pub fn invalidate(&self, collection: Collection) {
        *self.epochs.entry(collection).or_insert(0) += 1;
        let before = self.cache.len();
        self.cache.retain(|_, cached| cached.collection != collection);
        log::debug!(
            "Invalidated {} cache entries for {}",
            before.saturating_sub(self.cache.len()),
            collection
        );
    }

    /// Remove expired entries from cache
    pub fn evict_expired(&self) {
        let before = self.cache.len();
        self.cache.retain(|_, cached| cached.is_valid());
        log::debug!(
            "Evicted {} expired cache entries",
            before.saturating_sub(self.cache.len())
        );
    }

    /// Remove the oldest quarter of the entries when at capacity
    fn evict_oldest(&self) {
        let mut entries: Vec<_> = self
            .cache
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().created_at))
            .collect();

        entries.sort_by_key(|(_, created_at)| *created_at);

        let to_remove = (self.config.max_entries / 4).max(1);
        for (key, _) in entries.into_iter().take(to_remove) {
            self.cache.remove(&key);
        }

        log::debug!("Evicted {} oldest cache entries", to_remove);
    }

    pub fn clear(&self) {
        self.cache.clear();
        log::info!("Cache cleared");
    }

    pub fn stats(&self) -> CacheStats {
        let total_entries = self.cache.len();
        let expired_entries = self
            .cache
            .iter()
            .filter(|entry| !entry.value().is_valid())
            .count();

        CacheStats {
            total_entries,
            valid_entries: total_entries - expired_entries,
            expired_entries,
            max_entries: self.config.max_entries,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
    pub max_entries: usize,
}

/// Thread-safe wrapper for the cache
pub type SharedResponseCache = Arc<ResponseCache>;
