//! Evasion-resistant keyword matching
//!
//! A keyword matches a haystack when, after both are canonicalized, any of
//! the following holds:
//!
//! 1. the keyword is a plain substring of the haystack;
//! 2. the keyword appears with spaces, hyphens, underscores or periods
//!    wedged between its characters ("p a l e s t i n e", "p-a-l");
//! 3. the keyword starts a word ("palestinian-activist").
//!
//! Patterns are compiled once per keyword in [`KeywordMatcher`] and reused
//! for every event.

use regex::{Regex, RegexBuilder};

use crate::normalize::comparison_key;

/// Separators tolerated between the characters of a spaced-out keyword
const SPACED_SEPARATORS: &str = r"[ \-_.]*";

/// A single keyword with its precompiled evasion patterns
#[derive(Debug, Clone)]
struct CompiledKeyword {
    /// Keyword as configured
    original: String,
    /// Canonical form used for substring checks
    key: String,
    /// Separator-tolerant pattern
    spaced: Option<Regex>,
    /// Word-boundary prefix pattern
    prefix: Option<Regex>,
}

impl CompiledKeyword {
    /// Compile a keyword, or `None` if it canonicalizes to nothing
    fn new(keyword: &str) -> Option<Self> {
        let key = comparison_key(keyword);
        if key.is_empty() {
            tracing::debug!(keyword, "Ignoring keyword with empty canonical form");
            return None;
        }

        let spaced = compile(keyword, &spaced_pattern(&key));
        let prefix = compile(keyword, &format!(r"\b{}", regex::escape(&key)));

        Some(Self { original: keyword.to_string(), key, spaced, prefix })
    }

    /// Check a haystack that is already in canonical form
    fn is_match(&self, haystack_key: &str) -> bool {
        haystack_key.contains(&self.key)
            || self.spaced.as_ref().is_some_and(|re| re.is_match(haystack_key))
            || self.prefix.as_ref().is_some_and(|re| re.is_match(haystack_key))
    }
}

/// Separator-tolerant pattern; whitespace in the keyword counts as a separator
fn spaced_pattern(key: &str) -> String {
    let mut buf = [0u8; 4];
    key.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| regex::escape(c.encode_utf8(&mut buf)))
        .collect::<Vec<_>>()
        .join(SPACED_SEPARATORS)
}

/// Compile a pattern case-insensitively; a failure disables only that pattern
fn compile(keyword: &str, pattern: &str) -> Option<Regex> {
    match RegexBuilder::new(pattern).case_insensitive(true).build() {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!(keyword, error = %e, "Keyword pattern failed to compile; falling back to substring match");
            None
        }
    }
}

/// A compiled keyword set
#[derive(Debug, Clone, Default)]
pub struct KeywordMatcher {
    keywords: Vec<CompiledKeyword>,
}

impl KeywordMatcher {
    /// Compile a keyword set
    ///
    /// Keywords that canonicalize to an empty string are dropped since they
    /// would otherwise match every event.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .filter_map(|k| CompiledKeyword::new(k.as_ref()))
                .collect(),
        }
    }

    /// Number of usable keywords
    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    /// Check if there are no usable keywords
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Find the first keyword present in a canonical-form haystack
    pub fn find_in_key(&self, haystack_key: &str) -> Option<&str> {
        self.keywords
            .iter()
            .find(|k| k.is_match(haystack_key))
            .map(|k| k.original.as_str())
    }

    /// Find the first keyword present in raw text
    pub fn find(&self, haystack: &str) -> Option<&str> {
        if self.is_empty() {
            return None;
        }
        self.find_in_key(&comparison_key(haystack))
    }

    /// Check if any keyword is present in raw text
    pub fn is_match(&self, haystack: &str) -> bool {
        self.find(haystack).is_some()
    }
}

/// Check whether `haystack` contains `needle` under any evasion pattern
///
/// Compiles the needle on every call; use [`KeywordMatcher`] to match one
/// keyword set against many texts. An empty needle matches nothing.
///
/// ```
/// use moderation::contains_keyword;
///
/// assert!(contains_keyword("p a l e s t i n e is happening", "palestine"));
/// assert!(!contains_keyword("unrelated text", "palestine"));
/// ```
pub fn contains_keyword(haystack: &str, needle: &str) -> bool {
    CompiledKeyword::new(needle).is_some_and(|k| k.is_match(&comparison_key(haystack)))
}
