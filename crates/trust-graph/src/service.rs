//! Trust network service
//!
//! Ties the builder and cache to a relay source: loads the user's own
//! follow list, builds the two-hop network and remembers it.

use std::collections::HashSet;
use std::sync::Arc;

use relay_client::{EventFilter, EventSource, Kind, SourceContactLists};

use crate::builder::{TrustGraphBuilder, TrustNetwork};
use crate::cache::TrustNetworkCache;
use crate::config::TrustConfig;
use crate::Result;

/// Loads, builds and caches trust networks from an [`EventSource`]
pub struct TrustService<S> {
    contacts: SourceContactLists<S>,
    builder: TrustGraphBuilder,
    cache: TrustNetworkCache,
}

impl<S: EventSource> TrustService<S> {
    /// Create a service over `source`
    pub fn new(source: S, config: TrustConfig) -> Self {
        let cache = TrustNetworkCache::from_config(&config);
        Self {
            contacts: SourceContactLists::new(source),
            builder: TrustGraphBuilder::new(config),
            cache,
        }
    }

    /// Get the underlying source
    pub fn source(&self) -> &S {
        self.contacts.source()
    }

    /// Get the network cache
    pub fn cache(&self) -> &TrustNetworkCache {
        &self.cache
    }

    /// Get the configuration
    pub fn config(&self) -> &TrustConfig {
        self.builder.config()
    }

    /// Load the user's current follow list
    ///
    /// Uses the newest contact list the user published. Order is kept and
    /// repeated keys are dropped. A user with no contact list follows nobody.
    pub async fn follows_for(&self, user_key: &str) -> Result<Vec<String>> {
        let filter = EventFilter::new()
            .kind(Kind::CONTACT_LIST)
            .authors([user_key]);

        let events = self
            .source()
            .query(filter, 1, self.config().fetch_timeout)
            .await?;

        let Some(latest) = events
            .iter()
            .filter(|e| e.is_contact_list() && e.author_key == user_key)
            .max_by_key(|e| e.created_at)
        else {
            tracing::debug!(user = user_key, "No contact list found");
            return Ok(Vec::new());
        };

        let mut seen = HashSet::new();
        Ok(latest
            .pubkeys()
            .filter(|key| seen.insert(*key))
            .map(str::to_string)
            .collect())
    }

    /// Get the network for a known follow list, building it on a cache miss
    ///
    /// Networks whose second-degree fetch failed are returned but not cached,
    /// so the next call retries the expansion.
    pub async fn network_with_follows(
        &self,
        user_key: &str,
        follows: &[String],
    ) -> Arc<TrustNetwork> {
        if let Some(network) = self.cache.get(user_key, follows) {
            tracing::debug!(user = user_key, members = network.len(), "Trust network cache hit");
            return network;
        }

        let network = self.builder.build(user_key, follows, &self.contacts).await;

        if network.is_complete() {
            self.cache.put(follows, network)
        } else {
            Arc::new(network)
        }
    }

    /// Load the user's follows and return their network
    ///
    /// If the follow list cannot be loaded the result is an empty network,
    /// which leaves trust filtering inactive.
    pub async fn network_for(&self, user_key: &str) -> Arc<TrustNetwork> {
        match self.follows_for(user_key).await {
            Ok(follows) => self.network_with_follows(user_key, &follows).await,
            Err(e) => {
                tracing::warn!(user = user_key, error = %e, "Failed to load follow list");
                Arc::new(TrustNetwork::empty(user_key))
            }
        }
    }

    /// Forget the cached network for a user, e.g. after they follow someone
    pub fn invalidate(&self, user_key: &str) -> usize {
        self.cache.invalidate(user_key)
    }
}
