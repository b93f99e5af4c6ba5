//! Query capability supplied by the relay layer
//!
//! Connection management, subscriptions and retries live behind
//! [`EventSource`]. The filter crates only ever see finished result sets.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::types::{Event, Kind};
use crate::Result;

/// Contact-list versions allowed per author in one batched fetch
///
/// A relay pool can return superseded lists or the same list from several
/// relays; the extra room keeps those from crowding other authors out.
pub const CONTACT_LIST_HEADROOM: usize = 4;

/// Relay query filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Event kinds to match (empty = any)
    pub kinds: Vec<u16>,
    /// Restrict to these authors
    pub authors: Option<Vec<String>>,
    /// Tag constraints, keyed by tag name
    pub tags: BTreeMap<String, Vec<String>>,
    /// Full-text search term
    pub search: Option<String>,
}

impl EventFilter {
    /// Create an empty filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a kind
    pub fn kind(mut self, kind: u16) -> Self {
        self.kinds.push(kind);
        self
    }

    /// Restrict to authors
    pub fn authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authors = Some(authors.into_iter().map(Into::into).collect());
        self
    }

    /// Add a tag constraint
    pub fn tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.entry(name.into()).or_default().push(value.into());
        self
    }

    /// Set a search term
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }
}

/// A queryable store of events, typically a relay pool
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Run a one-shot query, returning at most `limit` events
    ///
    /// Implementations must give up once `timeout` has elapsed.
    async fn query(&self, filter: EventFilter, limit: usize, timeout: Duration)
        -> Result<Vec<Event>>;
}

/// Batched contact-list lookup used to expand the web of trust
#[async_trait]
pub trait ContactListFetcher: Send + Sync {
    /// Fetch the contact lists published by `authors`
    async fn fetch_contact_lists(&self, authors: &[String], timeout: Duration)
        -> Result<Vec<Event>>;
}

/// [`ContactListFetcher`] backed by any [`EventSource`]
///
/// Returns at most one list per author, the newest one received.
pub struct SourceContactLists<S> {
    source: S,
}

impl<S: EventSource> SourceContactLists<S> {
    /// Wrap an event source
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Get the wrapped source
    pub fn source(&self) -> &S {
        &self.source
    }
}

#[async_trait]
impl<S: EventSource> ContactListFetcher for SourceContactLists<S> {
    async fn fetch_contact_lists(
        &self,
        authors: &[String],
        timeout: Duration,
    ) -> Result<Vec<Event>> {
        if authors.is_empty() {
            return Ok(Vec::new());
        }

        let filter = EventFilter::new()
            .kind(Kind::CONTACT_LIST)
            .authors(authors.iter().cloned());
        let limit = authors.len().saturating_mul(CONTACT_LIST_HEADROOM);

        let events = self.source.query(filter, limit, timeout).await?;
        if events.len() >= limit {
            tracing::warn!(
                requested = authors.len(),
                limit,
                "Contact list fetch hit its limit; some lists may be missing"
            );
        }

        let received = events.len();
        let lists = newest_per_author(events);
        tracing::debug!(
            requested = authors.len(),
            received,
            kept = lists.len(),
            "Fetched contact lists"
        );
        Ok(lists)
    }
}

/// Keep each author's newest contact list, in order of first appearance
fn newest_per_author(events: Vec<Event>) -> Vec<Event> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut lists: Vec<Event> = Vec::new();

    for event in events.into_iter().filter(Event::is_contact_list) {
        match slots.get(&event.author_key) {
            Some(&slot) if lists[slot].created_at >= event.created_at => {}
            Some(&slot) => lists[slot] = event,
            None => {
                slots.insert(event.author_key.clone(), lists.len());
                lists.push(event);
            }
        }
    }

    lists
}
