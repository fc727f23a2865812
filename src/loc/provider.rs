// Commit history provider.
// The seam between the line-of-code engine and the remote API.

use crate::error::Result;
use crate::github::{GitHubClient, HistoryPage};

/// Source of paginated default-branch commit history.
#[allow(async_fn_in_trait)]
pub trait HistoryProvider {
    /// Fetch one page of history starting after `cursor` (None for the first page).
    /// Returns None when the repository has no default branch.
    async fn history_page(
        &mut self,
        owner: &str,
        repo_name: &str,
        cursor: Option<&str>,
    ) -> Result<Option<HistoryPage>>;
}

impl HistoryProvider for GitHubClient {
    async fn history_page(
        &mut self,
        owner: &str,
        repo_name: &str,
        cursor: Option<&str>,
    ) -> Result<Option<HistoryPage>> {
        self.get_history_page(owner, repo_name, cursor).await
    }
}

#[cfg(test)]
pub(crate) mod scripted {
    use std::collections::{HashMap, HashSet};

    use super::*;
    use crate::error::StatsError;
    use crate::github::{CommitRecord, PageInfo, QueryCounts};
    use crate::github::queries::HISTORY_PAGE_SIZE;

    /// Build a commit attributed to `author`.
    pub fn commit(author: Option<&str>, additions: u64, deletions: u64) -> CommitRecord {
        CommitRecord {
            author_id: author.map(str::to_string),
            additions,
            deletions,
        }
    }

    /// In-memory provider serving canned pages and recording every request.
    #[derive(Debug, Default)]
    pub struct ScriptedProvider {
        histories: HashMap<String, Option<Vec<HistoryPage>>>,
        failing: HashSet<String>,
        pub calls: Vec<(String, Option<String>)>,
    }

    impl ScriptedProvider {
        pub fn new() -> Self {
            Self::default()
        }

        /// Serve `commits` for `repo`, split into pages of 100.
        pub fn with_commits(mut self, repo: &str, commits: Vec<CommitRecord>) -> Self {
            let chunks: Vec<Vec<CommitRecord>> = if commits.is_empty() {
                vec![Vec::new()]
            } else {
                commits
                    .chunks(HISTORY_PAGE_SIZE as usize)
                    .map(|chunk| chunk.to_vec())
                    .collect()
            };
            let page_count = chunks.len();
            let total_count = commits.len() as u64;

            let pages = chunks
                .into_iter()
                .enumerate()
                .map(|(idx, commits)| HistoryPage {
                    total_count,
                    commits,
                    page_info: PageInfo {
                        end_cursor: Some((idx + 1).to_string()),
                        has_next_page: idx + 1 < page_count,
                    },
                })
                .collect();

            self.histories.insert(repo.to_string(), Some(pages));
            self
        }

        /// Report `repo` as having no default branch.
        pub fn with_empty(mut self, repo: &str) -> Self {
            self.histories.insert(repo.to_string(), None);
            self
        }

        /// Fail every request for `repo` with a transport error.
        pub fn failing(mut self, repo: &str) -> Self {
            self.failing.insert(repo.to_string());
            self
        }

        /// Number of page requests issued for `repo`.
        pub fn calls_for(&self, repo: &str) -> usize {
            self.calls.iter().filter(|(name, _)| name == repo).count()
        }
    }

    impl HistoryProvider for ScriptedProvider {
        async fn history_page(
            &mut self,
            owner: &str,
            repo_name: &str,
            cursor: Option<&str>,
        ) -> Result<Option<HistoryPage>> {
            let key = format!("{}/{}", owner, repo_name);
            self.calls.push((key.clone(), cursor.map(str::to_string)));

            if self.failing.contains(&key) {
                return Err(StatsError::Transport {
                    operation: "history",
                    status: 502,
                    body: "bad gateway".to_string(),
                    queries: QueryCounts::default(),
                });
            }

            match self.histories.get(&key) {
                None => Err(StatsError::Other(format!("unscripted repository {}", key))),
                Some(None) => Ok(None),
                Some(Some(pages)) => {
                    let idx = cursor.and_then(|c| c.parse::<usize>().ok()).unwrap_or(0);
                    Ok(pages.get(idx).cloned())
                }
            }
        }
    }
}
