//! Content moderation for Relay Sieve
//!
//! This crate handles evasion-resistant topic filtering, emoji
//! disambiguation, and the composed filter pipeline that applies NSFW,
//! topic and web-of-trust criteria to relay result sets.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod emoji;
pub mod filtering;
pub mod matcher;
pub mod normalize;
pub mod pipeline;
pub mod topics;

pub use filtering::{FilterError, FilterReason, FilterSettings, TopicFilterConfig};
pub use matcher::{contains_keyword, KeywordMatcher};
pub use normalize::normalize;
pub use pipeline::{FilterContext, FilterPipeline, PipelineStats};
pub use topics::{filter_events_by_topic, should_filter, TopicFilter};
