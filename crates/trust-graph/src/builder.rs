//! Two-hop trust network construction
//!
//! The network is the user, everyone the user follows, and everyone those
//! follows follow. Only the first [`MAX_FOLLOWS_TO_CHECK`] follows, in the
//! order the caller supplies them, are expanded; the rest still count as
//! first-degree members.
//!
//! The expansion is a single batched contact-list fetch under a deadline.
//! If it fails or times out the network degrades to first-degree members
//! instead of returning an error.
//!
//! [`MAX_FOLLOWS_TO_CHECK`]: crate::config::MAX_FOLLOWS_TO_CHECK

use std::collections::HashSet;

use relay_client::ContactListFetcher;

use crate::config::TrustConfig;

/// Authors within two follow-hops of a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustNetwork {
    user_key: String,
    members: HashSet<String>,
    first_degree: usize,
    expanded: usize,
    complete: bool,
}

impl TrustNetwork {
    /// A network with no members, used when the user follows nobody
    pub fn empty(user_key: impl Into<String>) -> Self {
        Self {
            user_key: user_key.into(),
            members: HashSet::new(),
            first_degree: 0,
            expanded: 0,
            complete: true,
        }
    }

    /// The user the network was built for
    pub fn user_key(&self) -> &str {
        &self.user_key
    }

    /// All member keys
    pub fn members(&self) -> &HashSet<String> {
        &self.members
    }

    /// Check whether an author is a member
    pub fn contains(&self, author_key: &str) -> bool {
        self.members.contains(author_key)
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if the network has no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Number of first-degree follows supplied
    pub fn first_degree_count(&self) -> usize {
        self.first_degree
    }

    /// Number of follows whose contact lists were requested
    pub fn expanded_count(&self) -> usize {
        self.expanded
    }

    /// Whether the second-degree fetch succeeded
    pub fn is_complete(&self) -> bool {
        self.complete
    }
}

/// Builds [`TrustNetwork`]s from follow lists
#[derive(Debug, Clone, Default)]
pub struct TrustGraphBuilder {
    config: TrustConfig,
}

impl TrustGraphBuilder {
    /// Create a builder
    pub fn new(config: TrustConfig) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &TrustConfig {
        &self.config
    }

    /// Build the network for `user_key`
    ///
    /// Never fails: a fetch error or timeout leaves out the second degree.
    /// An empty follow list yields an empty network, leaving the caller to
    /// decide whether trust filtering should stay on.
    pub async fn build<F>(&self, user_key: &str, follows: &[String], fetcher: &F) -> TrustNetwork
    where
        F: ContactListFetcher + ?Sized,
    {
        if follows.is_empty() {
            tracing::debug!(user = user_key, "No follows; trust network is empty");
            return TrustNetwork::empty(user_key);
        }

        let expand: Vec<String> =
            follows.iter().take(self.config.max_follows_to_check).cloned().collect();
        let timeout = self.config.fetch_timeout;

        let contact_lists =
            match tokio::time::timeout(timeout, fetcher.fetch_contact_lists(&expand, timeout))
                .await
            {
                Ok(Ok(events)) => Some(events),
                Ok(Err(e)) => {
                    tracing::warn!(user = user_key, error = %e, "Contact list fetch failed; using first-degree trust only");
                    None
                }
                Err(_) => {
                    tracing::warn!(user = user_key, ?timeout, "Contact list fetch timed out; using first-degree trust only");
                    None
                }
            };

        let complete = contact_lists.is_some();
        let mut members: HashSet<String> = HashSet::with_capacity(follows.len() + 1);
        members.insert(user_key.to_string());
        members.extend(follows.iter().cloned());

        for event in contact_lists.iter().flatten() {
            members.extend(event.pubkeys().map(str::to_string));
        }

        tracing::debug!(
            user = user_key,
            first_degree = follows.len(),
            expanded = expand.len(),
            members = members.len(),
            "Built trust network"
        );

        TrustNetwork {
            user_key: user_key.to_string(),
            members,
            first_degree: follows.len(),
            expanded: expand.len(),
            complete,
        }
    }
}
