//! Relay client boundary for Relay Sieve
//!
//! This crate defines the event model shared by every filter stage and the
//! abstract query capability the relay layer supplies. It never opens a
//! connection itself.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod source;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use source::{
    ContactListFetcher, EventFilter, EventSource, SourceContactLists, CONTACT_LIST_HEADROOM,
};
pub use types::{Event, Kind, Tag};

/// Result type for relay operations
pub type Result<T> = std::result::Result<T, SourceError>;

/// Error types for relay operations
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The query did not complete within its deadline
    #[error("Query timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// A relay rejected or failed the query
    #[error("Relay error: {0}")]
    Relay(String),
}
