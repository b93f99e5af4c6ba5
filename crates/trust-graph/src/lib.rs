//! Web of trust for Relay Sieve
//!
//! This crate computes the set of authors within two follow-hops of a user,
//! caches it with a freshness window, and loads the user's own follow list
//! through the relay layer.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod cache;
pub mod config;
pub mod service;

pub use builder::{TrustGraphBuilder, TrustNetwork};
pub use cache::{FollowFingerprint, TrustNetworkCache};
pub use config::{TrustConfig, MAX_FOLLOWS_TO_CHECK};
pub use service::TrustService;

/// Result type for trust operations
pub type Result<T> = std::result::Result<T, TrustError>;

/// Error types for trust operations
#[derive(Debug, thiserror::Error)]
pub enum TrustError {
    /// The relay layer failed
    #[error("Source error: {0}")]
    Source(#[from] relay_client::SourceError),
}
