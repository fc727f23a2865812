// GitHub GraphQL response types.
// Defines the envelope, pagination info, and the domain values the queries return.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// GraphQL response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

/// A single entry of the GraphQL `errors` array.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

/// Cursor pagination info of a connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

/// Wrapper for `{ node: ... }` connection edges.
#[derive(Debug, Clone, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

/// Wrapper for `{ totalCount: N }` objects.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalCount {
    pub total_count: u64,
}

/// Repository ownership affiliation used to filter a user's repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Affiliation {
    Owner,
    Collaborator,
    OrganizationMember,
}

impl Affiliation {
    /// Every affiliation, the set used for contributed repositories and LOC.
    pub const ALL: [Affiliation; 3] = [
        Affiliation::Owner,
        Affiliation::Collaborator,
        Affiliation::OrganizationMember,
    ];
}

/// Node id of the tracked user, used to recognise commits they authored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerIdentity(String);

impl OwnerIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Account information for the tracked user.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: OwnerIdentity,
    pub created_at: DateTime<Utc>,
}

/// Repository count and star total for an affiliation set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RepoSummary {
    pub total_count: u64,
    pub stars: u64,
}

/// A repository as listed for LOC reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryDescriptor {
    /// Fully-qualified `owner/name`.
    pub name_with_owner: String,
    /// Commit total on the default branch; `None` when the repository is empty.
    pub commit_total: Option<u64>,
}

impl RepositoryDescriptor {
    pub fn new(name_with_owner: impl Into<String>, commit_total: Option<u64>) -> Self {
        Self {
            name_with_owner: name_with_owner.into(),
            commit_total,
        }
    }

    /// Split into `(owner, name)`.
    pub fn owner_and_name(&self) -> Option<(&str, &str)> {
        self.name_with_owner.split_once('/')
    }
}

/// One commit of a history page, reduced to what the walker needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    /// Node id of the GitHub user the commit is attributed to, if any.
    pub author_id: Option<String>,
    pub additions: u64,
    pub deletions: u64,
}

/// One page (up to 100 commits) of a repository's default-branch history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryPage {
    pub total_count: u64,
    pub commits: Vec<CommitRecord>,
    pub page_info: PageInfo,
}

/// Rate limit information from response headers.
#[derive(Debug, Clone, Default)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: Option<u64>,
    pub reset: u64,
}
