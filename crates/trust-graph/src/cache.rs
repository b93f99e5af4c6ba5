//! Trust network cache
//!
//! Rebuilding a network fans out to up to 100 contact-list fetches, so built
//! networks are kept in an LRU cache with a freshness window. Entries are
//! keyed on the user and a fingerprint of their follow list; a changed
//! follow list misses and replaces the user's old entry.

use lru::LruCache;
use parking_lot::Mutex;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::builder::TrustNetwork;
use crate::config::TrustConfig;

/// Identity of a follow list: its length and an order-sensitive hash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FollowFingerprint {
    len: usize,
    hash: u64,
}

impl FollowFingerprint {
    /// Fingerprint a follow list
    pub fn of(follows: &[String]) -> Self {
        let mut hasher = DefaultHasher::new();
        follows.hash(&mut hasher);
        Self { len: follows.len(), hash: hasher.finish() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    user_key: String,
    fingerprint: FollowFingerprint,
}

/// Cache entry with metadata
#[derive(Debug, Clone)]
struct CacheEntry {
    network: Arc<TrustNetwork>,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-memory LRU cache of built trust networks
pub struct TrustNetworkCache {
    entries: Mutex<LruCache<CacheKey, CacheEntry>>,
    ttl: Duration,
}

impl TrustNetworkCache {
    /// Create a cache holding up to `capacity` networks for `ttl` each
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self { entries: Mutex::new(LruCache::new(capacity)), ttl }
    }

    /// Create a cache from trust configuration
    pub fn from_config(config: &TrustConfig) -> Self {
        Self::new(config.cache_capacity, config.cache_ttl)
    }

    /// Get a fresh network for this user and follow list
    pub fn get(&self, user_key: &str, follows: &[String]) -> Option<Arc<TrustNetwork>> {
        let key = CacheKey {
            user_key: user_key.to_string(),
            fingerprint: FollowFingerprint::of(follows),
        };
        let mut entries = self.entries.lock();

        let is_expired = entries.peek(&key).map(CacheEntry::is_expired).unwrap_or(false);
        if is_expired {
            entries.pop(&key);
            tracing::debug!(user = user_key, "Cached trust network expired");
            return None;
        }

        entries.get(&key).map(|entry| Arc::clone(&entry.network))
    }

    /// Store a network, replacing any other entry for the same user
    pub fn put(&self, follows: &[String], network: TrustNetwork) -> Arc<TrustNetwork> {
        let network = Arc::new(network);
        let key = CacheKey {
            user_key: network.user_key().to_string(),
            fingerprint: FollowFingerprint::of(follows),
        };
        let entry = CacheEntry {
            network: Arc::clone(&network),
            expires_at: Instant::now() + self.ttl,
        };

        let mut entries = self.entries.lock();
        remove_user(&mut entries, &key.user_key);
        entries.put(key, entry);

        network
    }

    /// Drop every entry for a user
    pub fn invalidate(&self, user_key: &str) -> usize {
        remove_user(&mut self.entries.lock(), user_key)
    }

    /// Clear all entries
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Remove expired entries
    pub fn evict_expired(&self) -> usize {
        let mut entries = self.entries.lock();

        let expired: Vec<CacheKey> = entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            entries.pop(key);
        }

        expired.len()
    }

    /// Number of entries, including expired ones not yet evicted
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

fn remove_user(entries: &mut LruCache<CacheKey, CacheEntry>, user_key: &str) -> usize {
    let stale: Vec<CacheKey> = entries
        .iter()
        .filter(|(key, _)| key.user_key == user_key)
        .map(|(key, _)| key.clone())
        .collect();

    for key in &stale {
        entries.pop(key);
    }

    stale.len()
}
