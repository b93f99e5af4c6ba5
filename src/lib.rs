//! Relay Sieve
//!
//! Batch filtering of relay query results by NSFW verdict, topic blocklist
//! and two-hop web of trust. The member crates do the work; this crate
//! re-exports them under one roof.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use moderation;
pub use relay_client;
pub use trust_graph;
