// Error types for profile-stats.
// Covers GraphQL transport failures, cache file corruption, and configuration errors.

use thiserror::Error;

use crate::github::QueryCounts;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("GitHub API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{operation} has failed with a {status}: {body} (queries: {queries})")]
    Transport {
        operation: &'static str,
        status: u16,
        body: String,
        queries: QueryCounts,
    },

    #[error("{operation}: too many requests in a short amount of time, {detail} (queries: {queries})")]
    RateLimited {
        operation: &'static str,
        detail: String,
        queries: QueryCounts,
    },

    #[error("{operation} returned GraphQL errors: {message}")]
    GraphQl {
        operation: &'static str,
        message: String,
    },

    #[error("Malformed cache record on line {line}: {content:?}")]
    MalformedCacheRecord { line: usize, content: String },

    #[error("Missing access token (set ACCESS_TOKEN or GITHUB_TOKEN)")]
    MissingToken,

    #[error("Missing user name (set USER_NAME or pass --user)")]
    MissingUser,

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl StatsError {
    /// Whether this error came back from the remote API (as opposed to local state).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            StatsError::Http(_) | StatsError::Transport { .. } | StatsError::RateLimited { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, StatsError>;
