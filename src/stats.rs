// Profile statistics collection.
// Runs every account query plus the line-of-code reconciliation for one user.

use std::future::Future;
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::cache::{ArchiveSummary, CacheFile};
use crate::config::Config;
use crate::error::Result;
use crate::github::{Affiliation, GitHubClient, QueryCounts};
use crate::loc::{self, LocSummary};

/// Everything a profile card displays about a user.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileStats {
    pub user: String,
    pub account_created_at: DateTime<Utc>,
    /// Repositories owned by the user.
    pub repos: u64,
    /// Repositories the user owns, collaborates on, or reaches through an organization.
    pub contributed: u64,
    pub stars: u64,
    pub followers: u64,
    /// Commits authored by the user across cached (and archived) repositories.
    pub commits: u64,
    /// Contributions recorded over the last year.
    pub contributions_last_year: u64,
    /// Line totals; None when the LOC pass was skipped.
    pub loc: Option<LocSummary>,
    pub archive: Option<ArchiveSummary>,
    pub queries: QueryCounts,
}

/// Run `fut` and log how long it took.
async fn timed<T>(stage: &'static str, fut: impl Future<Output = Result<T>>) -> Result<T> {
    let start = Instant::now();
    let result = fut.await;
    tracing::info!(
        stage,
        elapsed_ms = start.elapsed().as_millis() as u64,
        ok = result.is_ok(),
        "stage finished"
    );
    result
}

/// Fold archived totals into the live line totals.
pub fn add_archive(loc: LocSummary, archive: &ArchiveSummary) -> LocSummary {
    let additions = loc.additions + archive.additions;
    let deletions = loc.deletions + archive.deletions;
    LocSummary {
        additions,
        deletions,
        net: additions as i64 - deletions as i64,
        cache_hit: loc.cache_hit,
    }
}

/// Collect all statistics for the configured user.
pub async fn collect(client: &mut GitHubClient, config: &Config) -> Result<ProfileStats> {
    let login = config.user.as_str();

    // The owner identity must be known before any history walk.
    let user = timed("account data", client.get_user(login)).await?;

    let owned = timed(
        "repositories",
        client.get_repo_summary(login, &[Affiliation::Owner]),
    )
    .await?;
    let contributed = timed(
        "contributed repositories",
        client.get_repo_summary(login, &Affiliation::ALL),
    )
    .await?;
    let followers = timed("followers", client.get_follower_count(login)).await?;

    let now = Utc::now();
    let contributions = timed(
        "contributions",
        client.get_contribution_count(login, now - Duration::days(365), now),
    )
    .await?;

    let location = config.cache_location();
    let loc = if config.skip_loc {
        None
    } else {
        let repositories = timed(
            "repository listing",
            client.list_repositories(login, &config.loc_affiliations),
        )
        .await?;
        let summary = timed(
            if config.force_rebuild {
                "LOC (forced rebuild)"
            } else {
                "LOC"
            },
            loc::reconcile(
                &mut *client,
                &user.id,
                &location,
                &repositories,
                config.force_rebuild,
            ),
        )
        .await?;
        Some(summary)
    };

    let cache = CacheFile::load_or_init(&location.dir, &location.user, location.comment_size)?;
    let mut commits = cache.commit_total();

    let archive = match &config.archive {
        Some(path) => ArchiveSummary::load(path, config.comment_size)?,
        None => None,
    };
    if let Some(archive) = &archive {
        commits += archive.my_commits;
    }
    let loc = match (loc, &archive) {
        (Some(loc), Some(archive)) => Some(add_archive(loc, archive)),
        (loc, _) => loc,
    };

    let queries = client.query_counts();
    tracing::info!(total = queries.total(), "GitHub GraphQL API calls");

    Ok(ProfileStats {
        user: config.user.clone(),
        account_created_at: user.created_at,
        repos: owned.total_count,
        contributed: contributed.total_count,
        stars: owned.stars,
        followers,
        commits,
        contributions_last_year: contributions,
        loc,
        archive,
        queries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_add_archive() {
        let loc = LocSummary {
            additions: 100,
            deletions: 30,
            net: 70,
            cache_hit: true,
        };
        let archive = ArchiveSummary {
            additions: 10,
            deletions: 50,
            my_commits: 3,
            repositories: 1,
        };
        assert_eq!(
            add_archive(loc, &archive),
            LocSummary {
                additions: 110,
                deletions: 80,
                net: 30,
                cache_hit: true,
            }
        );
    }

    async fn respond(server: &MockServer, needle: &str, body: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_string_contains(needle))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_collect_end_to_end() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();

        respond(
            &server,
            "createdAt",
            json!({ "data": { "user": { "id": "me", "createdAt": "2020-01-01T00:00:00Z" } } }),
        )
        .await;
        respond(
            &server,
            "stargazers",
            json!({ "data": { "user": { "repositories": {
                "totalCount": 1,
                "edges": [{ "node": { "nameWithOwner": "octocat/r1", "stargazers": { "totalCount": 4 } } }],
                "pageInfo": { "endCursor": null, "hasNextPage": false }
            } } } }),
        )
        .await;
        respond(
            &server,
            "followers",
            json!({ "data": { "user": { "followers": { "totalCount": 9 } } } }),
        )
        .await;
        respond(
            &server,
            "contributionsCollection",
            json!({ "data": { "user": { "contributionsCollection": {
                "contributionCalendar": { "totalContributions": 120 }
            } } } }),
        )
        .await;
        respond(
            &server,
            "history {",
            json!({ "data": { "user": { "repositories": {
                "edges": [{ "node": { "nameWithOwner": "octocat/r1",
                    "defaultBranchRef": { "target": { "history": { "totalCount": 2 } } } } }],
                "pageInfo": { "endCursor": null, "hasNextPage": false }
            } } } }),
        )
        .await;
        respond(
            &server,
            "repository(name: $repo_name",
            json!({ "data": { "repository": { "defaultBranchRef": { "target": { "history": {
                "totalCount": 2,
                "edges": [
                    { "node": { "author": { "user": { "id": "me" } }, "additions": 30, "deletions": 5 } },
                    { "node": { "author": { "user": { "id": "bot" } }, "additions": 1, "deletions": 1 } }
                ],
                "pageInfo": { "endCursor": "x", "hasNextPage": false }
            } } } } } }),
        )
        .await;

        let mut config = Config::new(Some("t".into()), Some("octocat".into())).unwrap();
        config.cache_dir = dir.path().to_path_buf();
        config.api_base = server.uri();
        let mut client = GitHubClient::with_base_url(&config.token, &config.api_base).unwrap();

        let stats = collect(&mut client, &config).await.unwrap();
        assert_eq!(stats.repos, 1);
        assert_eq!(stats.stars, 4);
        assert_eq!(stats.followers, 9);
        assert_eq!(stats.contributions_last_year, 120);
        assert_eq!(stats.commits, 1);
        let loc = stats.loc.unwrap();
        assert_eq!((loc.additions, loc.deletions, loc.net), (30, 5, 25));
        assert!(!loc.cache_hit);
        assert_eq!(stats.queries.history, 1);
        assert_eq!(stats.queries.loc_query, 1);
        assert_eq!(stats.queries.repos_stars, 2);
    }
}
