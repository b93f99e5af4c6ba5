//! Filter configuration and outcomes
//!
//! This module holds the user-facing blocklist configuration, the overall
//! filter settings consumed by the pipeline, and the reasons an event can be
//! suppressed.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::emoji;
use crate::topics::TopicFilter;

/// Errors that can occur while configuring filters
#[derive(Debug, Error)]
pub enum FilterError {
    /// Invalid filter configuration
    #[error("Invalid filter configuration: {0}")]
    InvalidConfig(String),

    /// Blocklist too large
    #[error("Blocklist too large: {count} exceeds maximum {max}")]
    TooManyTerms {
        /// Actual count
        count: usize,
        /// Maximum allowed
        max: usize,
    },

    /// Settings could not be parsed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for filter operations
pub type Result<T> = std::result::Result<T, FilterError>;

/// Maximum number of blocked terms across keywords, hashtags and emoji
pub const MAX_BLOCKED_TERMS: usize = 500;

/// Reason an event was filtered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterReason {
    /// The NSFW classifier flagged the event
    Nsfw,
    /// Content or hashtags contain a blocked keyword
    Keyword(String),
    /// A hashtag exactly matches a blocked hashtag
    Hashtag(String),
    /// Content contains a blocked emoji
    Emoji(String),
    /// The author is outside the user's web of trust
    OutsideTrustNetwork,
}

impl FilterReason {
    /// Get a human-readable description
    pub fn description(&self) -> String {
        match self {
            FilterReason::Nsfw => "Sensitive content".to_string(),
            FilterReason::Keyword(word) => format!("Contains blocked keyword: {}", word),
            FilterReason::Hashtag(tag) => {
                format!("Tagged with blocked hashtag: #{}", tag.trim_start_matches('#'))
            }
            FilterReason::Emoji(emoji) => format!("Contains blocked emoji: {}", emoji),
            FilterReason::OutsideTrustNetwork => "Author outside web of trust".to_string(),
        }
    }
}

/// User's topic blocklist
///
/// All comparisons are case- and diacritic-insensitive. A config with every
/// set empty filters nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TopicFilterConfig {
    /// Blocked keywords, matched against content and hashtags
    #[serde(default)]
    pub keywords: HashSet<String>,
    /// Blocked hashtags, matched exactly against `t` tags
    #[serde(default)]
    pub hashtags: HashSet<String>,
    /// Blocked emoji
    #[serde(default)]
    pub emojis: HashSet<String>,
}

impl TopicFilterConfig {
    /// Create an empty config
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if nothing is blocked
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty() && self.hashtags.is_empty() && self.emojis.is_empty()
    }

    /// Total number of blocked terms
    pub fn total_terms(&self) -> usize {
        self.keywords.len() + self.hashtags.len() + self.emojis.len()
    }

    fn ensure_capacity(&self) -> Result<()> {
        if self.total_terms() >= MAX_BLOCKED_TERMS {
            return Err(FilterError::TooManyTerms {
                count: self.total_terms() + 1,
                max: MAX_BLOCKED_TERMS,
            });
        }
        Ok(())
    }

    /// Block a keyword
    pub fn block_keyword(&mut self, keyword: impl Into<String>) -> Result<()> {
        let keyword = keyword.into().trim().to_lowercase();
        if keyword.is_empty() {
            return Err(FilterError::InvalidConfig("empty keyword".to_string()));
        }
        self.ensure_capacity()?;
        self.keywords.insert(keyword);
        Ok(())
    }

    /// Unblock a keyword
    pub fn unblock_keyword(&mut self, keyword: &str) {
        self.keywords.remove(&keyword.trim().to_lowercase());
    }

    /// Block a hashtag; a leading `#` is ignored
    pub fn block_hashtag(&mut self, hashtag: impl Into<String>) -> Result<()> {
        let hashtag = hashtag.into();
        let hashtag = hashtag.trim().trim_start_matches('#').to_lowercase();
        if hashtag.is_empty() {
            return Err(FilterError::InvalidConfig("empty hashtag".to_string()));
        }
        self.ensure_capacity()?;
        self.hashtags.insert(hashtag);
        Ok(())
    }

    /// Unblock a hashtag
    pub fn unblock_hashtag(&mut self, hashtag: &str) {
        self.hashtags
            .remove(&hashtag.trim().trim_start_matches('#').to_lowercase());
    }

    /// Block an emoji
    pub fn block_emoji(&mut self, emoji: impl Into<String>) -> Result<()> {
        let emoji = emoji.into();
        if !emoji::is_emoji(emoji.trim()) {
            return Err(FilterError::InvalidConfig(format!("not an emoji: {}", emoji)));
        }
        self.ensure_capacity()?;
        self.emojis.insert(emoji::canonical(&emoji));
        Ok(())
    }

    /// Unblock an emoji
    pub fn unblock_emoji(&mut self, emoji: &str) {
        self.emojis.remove(&emoji::canonical(emoji));
    }

    /// Check the blocklist stays within [`MAX_BLOCKED_TERMS`]
    pub fn validate(&self) -> Result<()> {
        if self.total_terms() > MAX_BLOCKED_TERMS {
            return Err(FilterError::TooManyTerms {
                count: self.total_terms(),
                max: MAX_BLOCKED_TERMS,
            });
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

/// Filter settings supplied by the host application
///
/// Persisted elsewhere and handed to this crate by value. An absent topic
/// config means topic filtering is off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSettings {
    /// Topic blocklist
    #[serde(default)]
    pub topics: Option<TopicFilterConfig>,
    /// Restrict results to the web of trust
    #[serde(default)]
    pub trust_active: bool,
    /// Drop events the NSFW classifier flags
    #[serde(default = "default_true")]
    pub nsfw_filter_enabled: bool,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            topics: None,
            trust_active: false,
            nsfw_filter_enabled: true,
        }
    }
}

impl FilterSettings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create settings that filter nothing
    pub fn permissive() -> Self {
        Self {
            topics: None,
            trust_active: false,
            nsfw_filter_enabled: false,
        }
    }

    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        match &self.topics {
            Some(topics) => topics.validate(),
            None => Ok(()),
        }
    }

    /// Get the topic config, treating an all-empty config as absent
    pub fn active_topics(&self) -> Option<&TopicFilterConfig> {
        self.topics.as_ref().filter(|t| !t.is_empty())
    }

    /// Compile the topic blocklist, if there is one
    pub fn compile_topics(&self) -> Option<TopicFilter> {
        self.active_topics().map(TopicFilter::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_reason_description() {
        assert!(FilterReason::Keyword("spoiler".to_string())
            .description()
            .contains("spoiler"));
        assert!(FilterReason::Hashtag("nsfw".to_string())
            .description()
            .contains("#nsfw"));
        assert!(FilterReason::Emoji("🍉".to_string()).description().contains("🍉"));
        assert!(FilterReason::OutsideTrustNetwork.description().contains("trust"));
        assert!(FilterReason::Nsfw.description().contains("Sensitive"));
    }

    #[test]
    fn test_topic_config_empty() {
        let config = TopicFilterConfig::new();
        assert!(config.is_empty());
        assert_eq!(config.total_terms(), 0);
    }

    #[test]
    fn test_topic_config_keywords() {
        let mut config = TopicFilterConfig::new();

        config.block_keyword("  Spoiler ").unwrap();
        assert!(config.keywords.contains("spoiler"));
        assert!(!config.is_empty());

        config.unblock_keyword("SPOILER");
        assert!(config.is_empty());
    }

    #[test]
    fn test_topic_config_rejects_empty_terms() {
        let mut config = TopicFilterConfig::new();
        assert!(matches!(config.block_keyword("   "), Err(FilterError::InvalidConfig(_))));
        assert!(matches!(config.block_hashtag("#"), Err(FilterError::InvalidConfig(_))));
        assert!(matches!(config.block_emoji("abc"), Err(FilterError::InvalidConfig(_))));
    }

    #[test]
    fn test_topic_config_hashtags_strip_hash() {
        let mut config = TopicFilterConfig::new();
        config.block_hashtag("#Politics").unwrap();
        assert!(config.hashtags.contains("politics"));

        config.unblock_hashtag("politics");
        assert!(config.hashtags.is_empty());
    }

    #[test]
    fn test_topic_config_emoji_canonical() {
        let mut config = TopicFilterConfig::new();
        config.block_emoji("⚡\u{FE0F}").unwrap();
        assert!(config.emojis.contains("⚡"));

        config.unblock_emoji("⚡");
        assert!(config.emojis.is_empty());
    }

    #[test]
    fn test_topic_config_capacity() {
        let mut config = TopicFilterConfig::new();
        for i in 0..MAX_BLOCKED_TERMS {
            config.block_keyword(format!("word{}", i)).unwrap();
        }

        let result = config.block_hashtag("onemore");
        assert!(matches!(
            result,
            Err(FilterError::TooManyTerms { count: 501, max: 500 })
        ));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_settings_default() {
        let settings = FilterSettings::new();
        assert!(settings.nsfw_filter_enabled);
        assert!(!settings.trust_active);
        assert!(settings.topics.is_none());
        assert!(settings.compile_topics().is_none());
    }

    #[test]
    fn test_settings_permissive() {
        let settings = FilterSettings::permissive();
        assert!(!settings.nsfw_filter_enabled);
        assert!(!settings.trust_active);
    }

    #[test]
    fn test_settings_empty_topics_are_inactive() {
        let settings = FilterSettings {
            topics: Some(TopicFilterConfig::new()),
            ..FilterSettings::default()
        };
        assert!(settings.active_topics().is_none());
        assert!(settings.compile_topics().is_none());
    }

    #[test]
    fn test_settings_from_json() {
        let json = r#"{
            "topics": { "keywords": ["spoiler"], "emojis": ["🍉"] },
            "trustActive": true
        }"#;

        let settings = FilterSettings::from_json(json).unwrap();
        assert!(settings.trust_active);
        assert!(settings.nsfw_filter_enabled);

        let topics = settings.active_topics().unwrap();
        assert!(topics.keywords.contains("spoiler"));
        assert!(topics.hashtags.is_empty());
        assert!(topics.emojis.contains("🍉"));
    }

    #[test]
    fn test_settings_from_json_missing_fields() {
        let settings = FilterSettings::from_json("{}").unwrap();
        assert_eq!(settings, FilterSettings::default());
    }

    #[test]
    fn test_settings_from_json_too_many_terms() {
        let keywords: Vec<String> = (0..=MAX_BLOCKED_TERMS).map(|i| format!("w{}", i)).collect();
        let json = serde_json::json!({ "topics": { "keywords": keywords } }).to_string();

        let result = FilterSettings::from_json(&json);
        assert!(matches!(result, Err(FilterError::TooManyTerms { .. })));
    }

    #[test]
    fn test_settings_from_invalid_json() {
        let result = FilterSettings::from_json("not json");
        assert!(matches!(result, Err(FilterError::Serialization(_))));
    }

    #[test]
    fn test_settings_serialization() {
        let mut topics = TopicFilterConfig::new();
        topics.block_keyword("test").unwrap();
        let settings = FilterSettings {
            topics: Some(topics),
            trust_active: true,
            nsfw_filter_enabled: false,
        };

        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("trustActive"));
        assert!(json.contains("nsfwFilterEnabled"));

        let deserialized: FilterSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, settings);
    }

    #[test]
    fn test_filter_error_display() {
        let error = FilterError::InvalidConfig("bad config".to_string());
        assert!(format!("{}", error).contains("bad config"));

        let error = FilterError::TooManyTerms { count: 600, max: 500 };
        assert!(format!("{}", error).contains("600"));
    }
}
