// GitHub API module.
// Provides the GraphQL client, query counters, and response types.

pub mod client;
pub mod counter;
pub mod queries;
pub mod types;

pub use client::GitHubClient;
pub use counter::{QueryCounts, QueryKind};
pub use types::*;
