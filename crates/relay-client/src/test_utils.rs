//! Test utilities and fixtures for relay-facing code
//!
//! This module provides an in-memory [`EventSource`] and common event
//! fixtures. It is compiled for this crate's tests and, through the
//! `test-utils` feature, for other crates' tests.

#![allow(dead_code)] // Test utilities may not all be used yet

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::source::{EventFilter, EventSource};
use crate::types::Event;
use crate::{Result, SourceError};

/// Test author keys
pub mod keys {
    /// Alice's key
    pub fn alice() -> String {
        "a".repeat(64)
    }

    /// Bob's key
    pub fn bob() -> String {
        "b".repeat(64)
    }

    /// Carol's key
    pub fn carol() -> String {
        "c".repeat(64)
    }

    /// Dave's key
    pub fn dave() -> String {
        "d".repeat(64)
    }

    /// Deterministic key for the `n`th generated author
    pub fn numbered(n: usize) -> String {
        format!("{:064x}", n + 0x1000)
    }
}

/// Test event fixtures
pub mod events {
    use super::*;

    /// Fixed timestamp for reproducible tests (2024-01-01 00:00:00 UTC)
    pub const FIXED_TIME: i64 = 1_704_067_200;

    /// Text note with a generated id
    pub fn note(author: &str, content: &str) -> Event {
        let prefix: String = author.chars().take(8).collect();
        let id = format!("{}-{}", prefix, content.len());
        Event::note(id, author, FIXED_TIME, content)
    }

    /// Text note with an explicit id
    pub fn note_with_id(id: &str, author: &str, content: &str) -> Event {
        Event::note(id, author, FIXED_TIME, content)
    }

    /// Contact list for `author`
    pub fn contact_list(author: &str, follows: &[String]) -> Event {
        Event::contact_list(
            format!("contacts-{}", author),
            author,
            FIXED_TIME,
            follows.iter().cloned(),
        )
    }
}

/// In-memory event source
///
/// Answers queries from a fixed event set, newest first. Can be told to fail
/// or to respond slowly so timeout handling can be exercised with paused
/// time.
pub struct MockEventSource {
    events: Mutex<Vec<Event>>,
    delay: Option<Duration>,
    fail_with: Option<String>,
    queries: AtomicUsize,
    last_filter: Mutex<Option<EventFilter>>,
}

impl MockEventSource {
    /// Create a source holding `events`
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events: Mutex::new(events),
            delay: None,
            fail_with: None,
            queries: AtomicUsize::new(0),
            last_filter: Mutex::new(None),
        }
    }

    /// Respond only after `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fail every query with a relay error
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.fail_with = Some(message.into());
        self
    }

    /// Add an event after construction
    pub fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    /// Number of queries served so far
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// The most recent filter received
    pub fn last_filter(&self) -> Option<EventFilter> {
        self.last_filter.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventSource for MockEventSource {
    async fn query(
        &self,
        filter: EventFilter,
        limit: usize,
        timeout: Duration,
    ) -> Result<Vec<Event>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        *self.last_filter.lock().unwrap() = Some(filter.clone());

        if let Some(delay) = self.delay {
            if tokio::time::timeout(timeout, tokio::time::sleep(delay)).await.is_err() {
                return Err(SourceError::Timeout(timeout));
            }
        }

        if let Some(message) = &self.fail_with {
            return Err(SourceError::Relay(message.clone()));
        }

        let mut matched: Vec<Event> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| matches_filter(&filter, e))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matched.truncate(limit);

        Ok(matched)
    }
}

/// Structural match of an event against a filter; `search` is relay-defined
/// and ignored
fn matches_filter(filter: &EventFilter, event: &Event) -> bool {
    if !filter.kinds.is_empty() && !filter.kinds.contains(&event.kind) {
        return false;
    }

    if let Some(authors) = &filter.authors {
        if !authors.iter().any(|a| a == &event.author_key) {
            return false;
        }
    }

    filter.tags.iter().all(|(name, wanted)| {
        event
            .tag_values(name)
            .any(|value| wanted.iter().any(|w| w == value))
    })
}
