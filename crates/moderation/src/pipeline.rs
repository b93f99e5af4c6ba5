//! Composed filter pipeline
//!
//! The pipeline narrows a result set through three independent per-event
//! predicates: the NSFW verdict, the topic blocklist and web-of-trust
//! membership. Each stage only ever drops events, so the result is the
//! logical AND of the predicates and does not depend on stage order.
//!
//! # Example
//!
//! ```
//! use moderation::{FilterContext, FilterPipeline, TopicFilter, TopicFilterConfig};
//! use relay_client::Event;
//!
//! let mut topics = TopicFilterConfig::new();
//! topics.block_keyword("spoiler").unwrap();
//! let topics = TopicFilter::new(&topics);
//!
//! let context = FilterContext::new()
//!     .with_nsfw_predicate(|event: &Event| event.content.contains("nsfw"))
//!     .apply_nsfw(true)
//!     .with_topic_filter(&topics);
//!
//! let events = vec![
//!     Event::note("1", "alice", 0, "gm"),
//!     Event::note("2", "bob", 0, "s.p.o.i.l.e.r"),
//!     Event::note("3", "carol", 0, "nsfw pic"),
//! ];
//!
//! let kept = FilterPipeline::new(context).apply(&events);
//! assert_eq!(kept.len(), 1);
//! assert_eq!(kept[0].id, "1");
//! ```

use std::collections::HashSet;

use relay_client::Event;

use crate::filtering::{FilterReason, FilterSettings};
use crate::topics::TopicFilter;

/// External NSFW classifier verdict
pub type NsfwPredicate<'a> = Box<dyn Fn(&Event) -> bool + Send + Sync + 'a>;

/// Everything one filtering call needs
///
/// Built per call and borrowed from longer-lived state (compiled topic
/// filter, cached trust network). Every criterion has an explicit "off"
/// state; [`FilterContext::new`] starts with all of them off.
pub struct FilterContext<'a> {
    nsfw_predicate: NsfwPredicate<'a>,
    should_apply_nsfw: bool,
    topic_filter: Option<&'a TopicFilter>,
    trust_network: Option<&'a HashSet<String>>,
    trust_active: bool,
}

impl<'a> FilterContext<'a> {
    /// Create a context that filters nothing
    pub fn new() -> Self {
        Self {
            nsfw_predicate: Box::new(|_: &Event| false),
            should_apply_nsfw: false,
            topic_filter: None,
            trust_network: None,
            trust_active: false,
        }
    }

    /// Create a context from user settings
    ///
    /// `topics` should be compiled from `settings` once and reused across
    /// calls; `trust_network` usually comes from a cache.
    pub fn from_settings(
        settings: &FilterSettings,
        topics: Option<&'a TopicFilter>,
        trust_network: Option<&'a HashSet<String>>,
    ) -> Self {
        Self {
            nsfw_predicate: Box::new(|_: &Event| false),
            should_apply_nsfw: settings.nsfw_filter_enabled,
            topic_filter: topics,
            trust_network,
            trust_active: settings.trust_active,
        }
    }

    /// Set the NSFW classifier
    pub fn with_nsfw_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Event) -> bool + Send + Sync + 'a,
    {
        self.nsfw_predicate = Box::new(predicate);
        self
    }

    /// Enable or disable the NSFW stage
    pub fn apply_nsfw(mut self, enabled: bool) -> Self {
        self.should_apply_nsfw = enabled;
        self
    }

    /// Set the compiled topic blocklist
    pub fn with_topic_filter(mut self, topics: &'a TopicFilter) -> Self {
        self.topic_filter = Some(topics);
        self
    }

    /// Set the trust network and whether it is enforced
    pub fn with_trust_network(mut self, network: &'a HashSet<String>, active: bool) -> Self {
        self.trust_network = Some(network);
        self.trust_active = active;
        self
    }

    /// The network to enforce, if trust filtering is on and has members
    ///
    /// An empty network means it could not be built; filtering on it would
    /// hide everything, so the stage is skipped instead.
    fn enforced_network(&self) -> Option<&'a HashSet<String>> {
        if !self.trust_active {
            return None;
        }
        self.trust_network.filter(|network| !network.is_empty())
    }
}

impl Default for FilterContext<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-stage counts from one pipeline run
///
/// Each dropped event is attributed to the first stage that rejected it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Events received
    pub input: usize,
    /// Dropped by the NSFW stage
    pub nsfw: usize,
    /// Dropped by the topic blocklist
    pub topic: usize,
    /// Dropped for being outside the web of trust
    pub untrusted: usize,
    /// Events kept
    pub kept: usize,
}

impl PipelineStats {
    /// Total events dropped
    pub fn dropped(&self) -> usize {
        self.nsfw + self.topic + self.untrusted
    }

    fn record(&mut self, reason: Option<&FilterReason>) {
        match reason {
            None => self.kept += 1,
            Some(FilterReason::Nsfw) => self.nsfw += 1,
            Some(FilterReason::OutsideTrustNetwork) => self.untrusted += 1,
            Some(_) => self.topic += 1,
        }
    }
}

/// Filter pipeline over one [`FilterContext`]
pub struct FilterPipeline<'a> {
    context: FilterContext<'a>,
}

impl<'a> FilterPipeline<'a> {
    /// Create a pipeline
    pub fn new(context: FilterContext<'a>) -> Self {
        Self { context }
    }

    /// Get the context
    pub fn context(&self) -> &FilterContext<'a> {
        &self.context
    }

    /// Find the first reason to drop an event, if any
    pub fn evaluate(&self, event: &Event) -> Option<FilterReason> {
        let ctx = &self.context;

        if ctx.should_apply_nsfw && (ctx.nsfw_predicate)(event) {
            return Some(FilterReason::Nsfw);
        }

        if let Some(topics) = ctx.topic_filter {
            if let Some(reason) = topics.evaluate(event) {
                return Some(reason);
            }
        }

        if let Some(network) = ctx.enforced_network() {
            if !network.contains(&event.author_key) {
                return Some(FilterReason::OutsideTrustNetwork);
            }
        }

        None
    }

    /// Check whether an event passes every enabled stage
    pub fn allows(&self, event: &Event) -> bool {
        self.evaluate(event).is_none()
    }

    /// Keep the events that pass, in input order
    pub fn apply(&self, events: &[Event]) -> Vec<Event> {
        self.apply_with_stats(events).0
    }

    /// Keep the events that pass, with per-stage counts
    pub fn apply_with_stats(&self, events: &[Event]) -> (Vec<Event>, PipelineStats) {
        let mut stats = PipelineStats { input: events.len(), ..PipelineStats::default() };

        let kept: Vec<Event> = events
            .iter()
            .filter(|event| {
                let reason = self.evaluate(event);
                stats.record(reason.as_ref());
                reason.is_none()
            })
            .cloned()
            .collect();

        tracing::debug!(
            input = stats.input,
            nsfw = stats.nsfw,
            topic = stats.topic,
            untrusted = stats.untrusted,
            kept = stats.kept,
            "Applied filter pipeline"
        );

        (kept, stats)
    }
}
