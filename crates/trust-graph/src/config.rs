//! Trust network configuration

use std::time::Duration;

/// Maximum number of first-degree follows whose contact lists are fetched
pub const MAX_FOLLOWS_TO_CHECK: usize = 100;

/// Configuration for building and caching trust networks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustConfig {
    /// First-degree follows expanded into second degree
    pub max_follows_to_check: usize,
    /// Deadline for each relay fetch
    pub fetch_timeout: Duration,
    /// How long a built network stays fresh
    pub cache_ttl: Duration,
    /// Maximum cached networks
    pub cache_capacity: usize,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            max_follows_to_check: MAX_FOLLOWS_TO_CHECK,
            fetch_timeout: Duration::from_secs(5),
            cache_ttl: Duration::from_secs(300), // 5 minutes
            cache_capacity: 64,
        }
    }
}

impl TrustConfig {
    /// Create a new configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the expansion cap
    pub fn max_follows_to_check(mut self, max: usize) -> Self {
        self.max_follows_to_check = max;
        self
    }

    /// Set the fetch deadline
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Set the freshness window
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Set the cache capacity
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }
}
