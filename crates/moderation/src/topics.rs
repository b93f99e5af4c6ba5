//! Topic blocklist filtering
//!
//! A [`TopicFilter`] is compiled once from a [`TopicFilterConfig`] and then
//! checked against each event in three passes, stopping at the first hit:
//!
//! - **Keywords** are matched with evasion tolerance against the content
//!   plus every hashtag rendered as `#value`.
//! - **Hashtags** must equal a blocked hashtag exactly after normalization,
//!   so blocking `#art` does not catch `#artificial`.
//! - **Emoji** match on presence, except for ambiguous emoji with
//!   associated keywords, which also need one of those keywords in the text.

use std::collections::{BTreeSet, HashSet};

use relay_client::Event;

use crate::emoji;
use crate::filtering::{FilterReason, TopicFilterConfig};
use crate::matcher::KeywordMatcher;
use crate::normalize::comparison_key;

/// A blocked emoji with its disambiguation keywords
#[derive(Debug, Clone)]
struct EmojiRule {
    /// Canonical emoji
    emoji: String,
    /// Keywords one of which must also appear; `None` if the emoji is unambiguous
    corroborators: Option<KeywordMatcher>,
}

/// Compiled topic blocklist
#[derive(Debug, Clone, Default)]
pub struct TopicFilter {
    keywords: KeywordMatcher,
    /// Blocked hashtags as (comparison key, configured value)
    hashtags: Vec<(String, String)>,
    emojis: Vec<EmojiRule>,
}

impl TopicFilter {
    /// Compile a blocklist
    ///
    /// Terms are compiled in sorted order so the reported reason for an
    /// event matching several terms is stable.
    pub fn new(config: &TopicFilterConfig) -> Self {
        let keywords = KeywordMatcher::new(sorted(&config.keywords));

        let mut seen = HashSet::new();
        let hashtags = sorted(&config.hashtags)
            .into_iter()
            .filter_map(|tag| {
                let key = comparison_key(tag.trim_start_matches('#'));
                (!key.is_empty() && seen.insert(key.clone())).then(|| (key, tag.to_string()))
            })
            .collect();

        let emojis = sorted(&config.emojis)
            .into_iter()
            .map(emoji::canonical)
            .filter(|e| !e.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(|canonical| {
                let corroborators =
                    emoji::associated_keywords(&canonical).map(KeywordMatcher::new);
                EmojiRule { emoji: canonical, corroborators }
            })
            .collect();

        Self { keywords, hashtags, emojis }
    }

    /// Check if the filter can never match
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty() && self.hashtags.is_empty() && self.emojis.is_empty()
    }

    /// Find why an event should be filtered, if it should
    pub fn evaluate(&self, event: &Event) -> Option<FilterReason> {
        if self.is_empty() {
            return None;
        }

        let text = event_text(event);
        let key = comparison_key(&text);

        if let Some(keyword) = self.keywords.find_in_key(&key) {
            return Some(FilterReason::Keyword(keyword.to_string()));
        }

        if !self.hashtags.is_empty() {
            if let Some(tag) = self.find_hashtag(event) {
                return Some(FilterReason::Hashtag(tag.to_string()));
            }
        }

        if !self.emojis.is_empty() {
            if let Some(emoji) = self.find_emoji(&text, &key) {
                return Some(FilterReason::Emoji(emoji.to_string()));
            }
        }

        None
    }

    /// Check whether an event should be filtered
    pub fn should_filter(&self, event: &Event) -> bool {
        self.evaluate(event).is_some()
    }

    /// Keep events that pass the blocklist, preserving order
    pub fn filter_events(&self, events: &[Event]) -> Vec<Event> {
        if self.is_empty() {
            return events.to_vec();
        }
        events.iter().filter(|e| !self.should_filter(e)).cloned().collect()
    }

    fn find_hashtag(&self, event: &Event) -> Option<&str> {
        event.hashtags().find_map(|value| {
            let key = comparison_key(value);
            self.hashtags
                .iter()
                .find(|(blocked, _)| *blocked == key)
                .map(|(_, configured)| configured.as_str())
        })
    }

    fn find_emoji(&self, text: &str, key: &str) -> Option<&str> {
        let present = emoji::extract_emojis(text);
        if present.is_empty() {
            return None;
        }

        self.emojis
            .iter()
            .filter(|rule| present.contains(&rule.emoji))
            .find(|rule| match &rule.corroborators {
                Some(keywords) => keywords.find_in_key(key).is_some(),
                None => true,
            })
            .map(|rule| rule.emoji.as_str())
    }
}

fn sorted(terms: &HashSet<String>) -> Vec<&str> {
    let mut terms: Vec<&str> = terms.iter().map(String::as_str).collect();
    terms.sort_unstable();
    terms
}

/// Text searched for keywords and emoji
///
/// The content followed by each hashtag as `#value`, space-joined in tag
/// order.
pub fn event_text(event: &Event) -> String {
    std::iter::once(event.content.clone())
        .chain(event.hashtags().map(|value| format!("#{}", value)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Check one event against an optional blocklist
///
/// Compiles the blocklist on every call; prefer [`TopicFilter`] for batches.
pub fn should_filter(event: &Event, config: Option<&TopicFilterConfig>) -> bool {
    match config {
        Some(config) if !config.is_empty() => TopicFilter::new(config).should_filter(event),
        _ => false,
    }
}

/// Drop events matching an optional blocklist, preserving order
///
/// An absent or empty config returns the events unchanged.
pub fn filter_events_by_topic(events: &[Event], config: Option<&TopicFilterConfig>) -> Vec<Event> {
    match config {
        Some(config) if !config.is_empty() => TopicFilter::new(config).filter_events(events),
        _ => events.to_vec(),
    }
}
