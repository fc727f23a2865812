// History walker.
// Pages through one repository's default-branch history and totals the tracked user's lines.

use serde::Serialize;

use crate::error::Result;
use crate::github::{HistoryPage, OwnerIdentity};

use super::provider::HistoryProvider;

/// Totals of one completed walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WalkTotals {
    pub additions: u64,
    pub deletions: u64,
    pub my_commits: u64,
}

/// Accumulators and cursor carried between pages.
#[derive(Debug, Default)]
struct WalkState {
    totals: WalkTotals,
    cursor: Option<String>,
    pages: u64,
}

impl WalkState {
    fn absorb(&mut self, page: &HistoryPage, owner_id: &OwnerIdentity) {
        self.pages += 1;
        for commit in &page.commits {
            if commit.author_id.as_deref() == Some(owner_id.as_str()) {
                self.totals.my_commits += 1;
                self.totals.additions += commit.additions;
                self.totals.deletions += commit.deletions;
            }
        }
    }
}

/// Walk every history page of `owner/repo_name`, one request per page.
///
/// Returns None when the repository has no default branch.
pub async fn walk<P: HistoryProvider>(
    provider: &mut P,
    owner_id: &OwnerIdentity,
    owner: &str,
    repo_name: &str,
) -> Result<Option<WalkTotals>> {
    let mut state = WalkState::default();

    loop {
        let Some(page) = provider
            .history_page(owner, repo_name, state.cursor.as_deref())
            .await?
        else {
            tracing::debug!(owner, repo = repo_name, "repository is empty");
            return Ok(None);
        };

        state.absorb(&page, owner_id);

        if page.commits.is_empty() || !page.page_info.has_next_page {
            break;
        }
        match page.page_info.end_cursor {
            Some(next) => state.cursor = Some(next),
            None => {
                tracing::warn!(
                    owner,
                    repo = repo_name,
                    "history reports another page without a cursor, stopping"
                );
                break;
            }
        }
    }

    tracing::debug!(
        owner,
        repo = repo_name,
        pages = state.pages,
        my_commits = state.totals.my_commits,
        "walked history"
    );
    Ok(Some(state.totals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::PageInfo;
    use crate::loc::provider::scripted::{ScriptedProvider, commit};

    fn me() -> OwnerIdentity {
        OwnerIdentity::new("me")
    }

    #[tokio::test]
    async fn test_walk_single_page() {
        let mut provider = ScriptedProvider::new().with_commits(
            "a/r1",
            vec![
                commit(Some("me"), 10, 2),
                commit(Some("someone"), 100, 100),
                commit(None, 7, 7),
                commit(Some("me"), 5, 1),
            ],
        );

        let totals = walk(&mut provider, &me(), "a", "r1").await.unwrap().unwrap();
        assert_eq!(
            totals,
            WalkTotals {
                additions: 15,
                deletions: 3,
                my_commits: 2,
            }
        );
        assert_eq!(provider.calls_for("a/r1"), 1);
    }

    #[tokio::test]
    async fn test_walk_spans_every_page() {
        // 250 commits over 3 pages, every third one authored by the tracked user.
        let commits: Vec<_> = (0..250)
            .map(|i| {
                if i % 3 == 0 {
                    commit(Some("me"), 2, 1)
                } else {
                    commit(Some("other"), 50, 50)
                }
            })
            .collect();
        let expected_mine = (0..250).filter(|i| i % 3 == 0).count() as u64;
        let mut provider = ScriptedProvider::new().with_commits("a/big", commits);

        let totals = walk(&mut provider, &me(), "a", "big").await.unwrap().unwrap();
        assert_eq!(totals.my_commits, expected_mine);
        assert_eq!(totals.additions, expected_mine * 2);
        assert_eq!(totals.deletions, expected_mine);

        let cursors: Vec<_> = provider.calls.iter().map(|(_, c)| c.clone()).collect();
        assert_eq!(
            cursors,
            vec![None, Some("1".to_string()), Some("2".to_string())]
        );
    }

    #[tokio::test]
    async fn test_walk_empty_repository() {
        let mut provider = ScriptedProvider::new().with_empty("a/empty");
        let totals = walk(&mut provider, &me(), "a", "empty").await.unwrap();
        assert!(totals.is_none());
    }

    #[tokio::test]
    async fn test_walk_no_commits() {
        let mut provider = ScriptedProvider::new().with_commits("a/fresh", Vec::new());
        let totals = walk(&mut provider, &me(), "a", "fresh").await.unwrap().unwrap();
        assert_eq!(totals, WalkTotals::default());
    }

    #[tokio::test]
    async fn test_walk_propagates_transport_failure() {
        let mut provider = ScriptedProvider::new().failing("a/broken");
        let err = walk(&mut provider, &me(), "a", "broken").await.unwrap_err();
        assert!(err.is_transport());
    }

    #[test]
    fn test_absorb_counts_only_owner() {
        let mut state = WalkState::default();
        let page = HistoryPage {
            total_count: 2,
            commits: vec![commit(Some("me"), 3, 4), commit(Some("you"), 1, 1)],
            page_info: PageInfo::default(),
        };
        state.absorb(&page, &me());
        assert_eq!(state.pages, 1);
        assert_eq!(state.totals.my_commits, 1);
        assert_eq!(state.totals.additions, 3);
        assert_eq!(state.totals.deletions, 4);
    }
}
