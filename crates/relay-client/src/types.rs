//! Core event types
//!
//! Events arrive from untrusted relays, so every accessor here is lenient:
//! missing or malformed tag data reads as empty rather than failing.

use serde::{Deserialize, Serialize};

/// Event kind numbers used by the filter stages
pub struct Kind;

impl Kind {
    /// Short text note
    pub const TEXT_NOTE: u16 = 1;
    /// Contact list; its `p` tags enumerate the author's follows
    pub const CONTACT_LIST: u16 = 3;
}

/// Tag name for hashtags
pub const HASHTAG_TAG: &str = "t";

/// Tag name for referenced public keys
pub const PUBKEY_TAG: &str = "p";

/// A named, ordered list of string values attached to an event
///
/// On the wire a tag is a JSON array whose first element is the name, e.g.
/// `["t", "nostr"]`. An empty array is tolerated and has no name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(Vec<String>);

impl Tag {
    /// Create a tag from a name and its values
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parts = vec![name.into()];
        parts.extend(values.into_iter().map(Into::into));
        Self(parts)
    }

    /// Create a hashtag (`t`) tag
    pub fn hashtag(value: impl Into<String>) -> Self {
        Self::new(HASHTAG_TAG, [value.into()])
    }

    /// Create a pubkey reference (`p`) tag
    pub fn pubkey(key: impl Into<String>) -> Self {
        Self::new(PUBKEY_TAG, [key.into()])
    }

    /// Tag name, if present
    pub fn name(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Tag values (everything after the name)
    pub fn values(&self) -> &[String] {
        self.0.get(1..).unwrap_or(&[])
    }

    /// First value, if present
    pub fn value(&self) -> Option<&str> {
        self.values().first().map(String::as_str)
    }
}

/// An immutable signed social-network record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event id (hex)
    pub id: String,
    /// Author public key (hex)
    #[serde(rename = "pubkey")]
    pub author_key: String,
    /// Creation time in seconds since the Unix epoch
    #[serde(default)]
    pub created_at: i64,
    /// Event kind
    #[serde(default)]
    pub kind: u16,
    /// Free-text content
    #[serde(default)]
    pub content: String,
    /// Ordered tags
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Event {
    /// Create a text note
    pub fn note(
        id: impl Into<String>,
        author_key: impl Into<String>,
        created_at: i64,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            author_key: author_key.into(),
            created_at,
            kind: Kind::TEXT_NOTE,
            content: content.into(),
            tags: Vec::new(),
        }
    }

    /// Create a contact list whose `p` tags are `follows`, in order
    pub fn contact_list<I, S>(
        id: impl Into<String>,
        author_key: impl Into<String>,
        created_at: i64,
        follows: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            author_key: author_key.into(),
            created_at,
            kind: Kind::CONTACT_LIST,
            content: String::new(),
            tags: follows.into_iter().map(Tag::pubkey).collect(),
        }
    }

    /// Append a tag
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    /// Append a hashtag
    pub fn with_hashtag(self, value: impl Into<String>) -> Self {
        self.with_tag(Tag::hashtag(value))
    }

    /// First value of every tag named `name`, in tag order
    pub fn tag_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.tags
            .iter()
            .filter(move |tag| tag.name() == Some(name))
            .filter_map(Tag::value)
    }

    /// Hashtag values, in tag order
    pub fn hashtags(&self) -> impl Iterator<Item = &str> + '_ {
        self.tag_values(HASHTAG_TAG)
    }

    /// Referenced pubkeys, in tag order
    pub fn pubkeys(&self) -> impl Iterator<Item = &str> + '_ {
        self.tag_values(PUBKEY_TAG)
    }

    /// Check if this event is a contact list
    pub fn is_contact_list(&self) -> bool {
        self.kind == Kind::CONTACT_LIST
    }
}
