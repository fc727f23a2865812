// GraphQL query counters.
// Tracks how many requests each operation issued during one run.

use std::fmt;

use serde::Serialize;

/// Kind of GraphQL operation issued against the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    User,
    Followers,
    Contributions,
    ReposStars,
    LocQuery,
    History,
}

impl QueryKind {
    /// Operation name used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            QueryKind::User => "user",
            QueryKind::Followers => "followers",
            QueryKind::Contributions => "contributions",
            QueryKind::ReposStars => "repos_stars",
            QueryKind::LocQuery => "loc_query",
            QueryKind::History => "history",
        }
    }
}

/// Per-operation request counts, owned by the client for the duration of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueryCounts {
    pub user: u64,
    pub followers: u64,
    pub contributions: u64,
    pub repos_stars: u64,
    pub loc_query: u64,
    pub history: u64,
}

impl QueryCounts {
    /// Record one request of the given kind.
    pub fn record(&mut self, kind: QueryKind) {
        *self.slot(kind) += 1;
    }

    /// Count for a single kind.
    pub fn get(&self, kind: QueryKind) -> u64 {
        match kind {
            QueryKind::User => self.user,
            QueryKind::Followers => self.followers,
            QueryKind::Contributions => self.contributions,
            QueryKind::ReposStars => self.repos_stars,
            QueryKind::LocQuery => self.loc_query,
            QueryKind::History => self.history,
        }
    }

    /// Total requests across all kinds.
    pub fn total(&self) -> u64 {
        self.user
            + self.followers
            + self.contributions
            + self.repos_stars
            + self.loc_query
            + self.history
    }

    /// Iterate over `(name, count)` pairs in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        [
            QueryKind::User,
            QueryKind::Followers,
            QueryKind::Contributions,
            QueryKind::ReposStars,
            QueryKind::LocQuery,
            QueryKind::History,
        ]
        .into_iter()
        .map(|kind| (kind.name(), self.get(kind)))
    }

    fn slot(&mut self, kind: QueryKind) -> &mut u64 {
        match kind {
            QueryKind::User => &mut self.user,
            QueryKind::Followers => &mut self.followers,
            QueryKind::Contributions => &mut self.contributions,
            QueryKind::ReposStars => &mut self.repos_stars,
            QueryKind::LocQuery => &mut self.loc_query,
            QueryKind::History => &mut self.history,
        }
    }
}

impl fmt::Display for QueryCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(name, count)| format!("{}={}", name, count))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}
