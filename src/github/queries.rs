// GitHub GraphQL operations.
// Provides typed methods for the account, repository and commit history queries.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::error::{Result, StatsError};

use super::client::GitHubClient;
use super::counter::QueryKind;
use super::types::{
    Affiliation, CommitRecord, Edge, HistoryPage, OwnerIdentity, PageInfo, RepoSummary,
    RepositoryDescriptor, TotalCount, UserInfo,
};

/// Commits requested per history page.
pub const HISTORY_PAGE_SIZE: u32 = 100;
/// Repositories requested per page by the LOC listing. Larger pages tend to time out with a 502.
pub const LOC_PAGE_SIZE: u32 = 60;
/// Repositories requested per page by the star/repository count.
pub const REPOS_PAGE_SIZE: u32 = 100;

const USER_QUERY: &str = r#"
query($login: String!) {
    user(login: $login) {
        id
        createdAt
    }
}"#;

const FOLLOWERS_QUERY: &str = r#"
query($login: String!) {
    user(login: $login) {
        followers {
            totalCount
        }
    }
}"#;

const CONTRIBUTIONS_QUERY: &str = r#"
query($start_date: DateTime!, $end_date: DateTime!, $login: String!) {
    user(login: $login) {
        contributionsCollection(from: $start_date, to: $end_date) {
            contributionCalendar {
                totalContributions
            }
        }
    }
}"#;

const REPOS_STARS_QUERY: &str = r#"
query($owner_affiliation: [RepositoryAffiliation], $login: String!, $cursor: String, $first: Int!) {
    user(login: $login) {
        repositories(first: $first, after: $cursor, ownerAffiliations: $owner_affiliation) {
            totalCount
            edges {
                node {
                    ... on Repository {
                        nameWithOwner
                        stargazers {
                            totalCount
                        }
                    }
                }
            }
            pageInfo {
                endCursor
                hasNextPage
            }
        }
    }
}"#;

const LOC_QUERY: &str = r#"
query($owner_affiliation: [RepositoryAffiliation], $login: String!, $cursor: String, $first: Int!) {
    user(login: $login) {
        repositories(first: $first, after: $cursor, ownerAffiliations: $owner_affiliation) {
            edges {
                node {
                    ... on Repository {
                        nameWithOwner
                        defaultBranchRef {
                            target {
                                ... on Commit {
                                    history {
                                        totalCount
                                    }
                                }
                            }
                        }
                    }
                }
            }
            pageInfo {
                endCursor
                hasNextPage
            }
        }
    }
}"#;

const HISTORY_QUERY: &str = r#"
query($repo_name: String!, $owner: String!, $cursor: String, $first: Int!) {
    repository(name: $repo_name, owner: $owner) {
        defaultBranchRef {
            target {
                ... on Commit {
                    history(first: $first, after: $cursor) {
                        totalCount
                        edges {
                            node {
                                ... on Commit {
                                    committedDate
                                }
                                author {
                                    user {
                                        id
                                    }
                                }
                                deletions
                                additions
                            }
                        }
                        pageInfo {
                            endCursor
                            hasNextPage
                        }
                    }
                }
            }
        }
    }
}"#;

/// `{ user: ... }` root shared by the account-level queries.
#[derive(Debug, Deserialize)]
struct UserRoot<T> {
    user: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserNode {
    id: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct FollowersNode {
    followers: TotalCount,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributionsNode {
    contributions_collection: ContributionsCollection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributionsCollection {
    contribution_calendar: ContributionCalendar,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributionCalendar {
    total_contributions: u64,
}

#[derive(Debug, Deserialize)]
struct RepositoriesNode<T> {
    repositories: RepositoryConnection<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
struct RepositoryConnection<T> {
    #[serde(default)]
    total_count: u64,
    #[serde(default)]
    edges: Vec<Option<Edge<T>>>,
    page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
struct StarNode {
    #[serde(default)]
    stargazers: TotalCount,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocNode {
    name_with_owner: String,
    default_branch_ref: Option<BranchRef<CountTarget>>,
}

#[derive(Debug, Deserialize)]
struct BranchRef<T> {
    target: Option<T>,
}

#[derive(Debug, Deserialize)]
struct CountTarget {
    history: Option<TotalCount>,
}

#[derive(Debug, Deserialize)]
struct RepositoryRoot {
    repository: Option<RepositoryHistoryNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryHistoryNode {
    default_branch_ref: Option<BranchRef<HistoryTarget>>,
}

#[derive(Debug, Deserialize)]
struct HistoryTarget {
    history: Option<HistoryConnection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryConnection {
    total_count: u64,
    #[serde(default)]
    edges: Vec<Edge<CommitNode>>,
    page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
struct CommitNode {
    author: Option<CommitAuthor>,
    #[serde(default)]
    additions: u64,
    #[serde(default)]
    deletions: u64,
}

#[derive(Debug, Deserialize)]
struct CommitAuthor {
    user: Option<AuthorUser>,
}

#[derive(Debug, Deserialize)]
struct AuthorUser {
    id: String,
}

impl HistoryConnection {
    fn into_page(self) -> HistoryPage {
        let commits = self
            .edges
            .into_iter()
            .map(|edge| CommitRecord {
                author_id: edge.node.author.and_then(|a| a.user).map(|u| u.id),
                additions: edge.node.additions,
                deletions: edge.node.deletions,
            })
            .collect();
        HistoryPage {
            total_count: self.total_count,
            commits,
            page_info: self.page_info,
        }
    }
}

fn missing_user(operation: QueryKind, login: &str) -> StatsError {
    StatsError::Other(format!("{}: user {} not found", operation.name(), login))
}

impl GitHubClient {
    /// Get the account id and creation date of a user.
    pub async fn get_user(&mut self, login: &str) -> Result<UserInfo> {
        let root: UserRoot<UserNode> = self
            .query(QueryKind::User, USER_QUERY, &json!({ "login": login }))
            .await?;
        let user = root.user.ok_or_else(|| missing_user(QueryKind::User, login))?;
        Ok(UserInfo {
            id: OwnerIdentity::new(user.id),
            created_at: user.created_at,
        })
    }

    /// Get the number of followers of a user.
    pub async fn get_follower_count(&mut self, login: &str) -> Result<u64> {
        let root: UserRoot<FollowersNode> = self
            .query(
                QueryKind::Followers,
                FOLLOWERS_QUERY,
                &json!({ "login": login }),
            )
            .await?;
        let user = root
            .user
            .ok_or_else(|| missing_user(QueryKind::Followers, login))?;
        Ok(user.followers.total_count)
    }

    /// Get the contribution total of a user between two dates.
    pub async fn get_contribution_count(
        &mut self,
        login: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u64> {
        let variables = json!({
            "login": login,
            "start_date": from.to_rfc3339(),
            "end_date": to.to_rfc3339(),
        });
        let root: UserRoot<ContributionsNode> = self
            .query(QueryKind::Contributions, CONTRIBUTIONS_QUERY, &variables)
            .await?;
        let user = root
            .user
            .ok_or_else(|| missing_user(QueryKind::Contributions, login))?;
        Ok(user
            .contributions_collection
            .contribution_calendar
            .total_contributions)
    }

    /// Get the repository count and the star total across all pages.
    pub async fn get_repo_summary(
        &mut self,
        login: &str,
        affiliations: &[Affiliation],
    ) -> Result<RepoSummary> {
        let mut summary = RepoSummary::default();
        let mut cursor: Option<String> = None;

        loop {
            let variables = json!({
                "login": login,
                "owner_affiliation": affiliations,
                "cursor": cursor,
                "first": REPOS_PAGE_SIZE,
            });
            let root: UserRoot<RepositoriesNode<StarNode>> = self
                .query(QueryKind::ReposStars, REPOS_STARS_QUERY, &variables)
                .await?;
            let repos = root
                .user
                .ok_or_else(|| missing_user(QueryKind::ReposStars, login))?
                .repositories;

            summary.total_count = repos.total_count;
            summary.stars += repos
                .edges
                .iter()
                .flatten()
                .map(|edge| edge.node.stargazers.total_count)
                .sum::<u64>();

            match repos.page_info {
                PageInfo {
                    has_next_page: true,
                    end_cursor: Some(next),
                } => cursor = Some(next),
                _ => break,
            }
        }

        Ok(summary)
    }

    /// List every repository for the given affiliations with its default-branch commit total.
    pub async fn list_repositories(
        &mut self,
        login: &str,
        affiliations: &[Affiliation],
    ) -> Result<Vec<RepositoryDescriptor>> {
        let mut repositories = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let variables = json!({
                "login": login,
                "owner_affiliation": affiliations,
                "cursor": cursor,
                "first": LOC_PAGE_SIZE,
            });
            let root: UserRoot<RepositoriesNode<LocNode>> = self
                .query(QueryKind::LocQuery, LOC_QUERY, &variables)
                .await?;
            let repos = root
                .user
                .ok_or_else(|| missing_user(QueryKind::LocQuery, login))?
                .repositories;

            repositories.extend(repos.edges.into_iter().flatten().map(|edge| {
                let commit_total = edge
                    .node
                    .default_branch_ref
                    .and_then(|branch| branch.target)
                    .and_then(|target| target.history)
                    .map(|history| history.total_count);
                RepositoryDescriptor::new(edge.node.name_with_owner, commit_total)
            }));

            match repos.page_info {
                PageInfo {
                    has_next_page: true,
                    end_cursor: Some(next),
                } => cursor = Some(next),
                _ => break,
            }
        }

        tracing::debug!(count = repositories.len(), "listed repositories");
        Ok(repositories)
    }

    /// Get one page of a repository's default-branch history.
    /// Returns `None` when the repository has no default branch.
    pub async fn get_history_page(
        &mut self,
        owner: &str,
        repo_name: &str,
        cursor: Option<&str>,
    ) -> Result<Option<HistoryPage>> {
        let variables = json!({
            "owner": owner,
            "repo_name": repo_name,
            "cursor": cursor,
            "first": HISTORY_PAGE_SIZE,
        });
        let root: RepositoryRoot = self
            .query(QueryKind::History, HISTORY_QUERY, &variables)
            .await?;

        let history = root
            .repository
            .and_then(|repo| repo.default_branch_ref)
            .and_then(|branch| branch.target)
            .and_then(|target| target.history);
        Ok(history.map(HistoryConnection::into_page))
    }
}
