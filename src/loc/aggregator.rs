// Incremental line-of-code aggregation.
// Reconciles the listed repositories against the cache and re-walks only those whose history moved.

use std::path::PathBuf;

use serde::Serialize;

use crate::cache::{CacheFile, CacheSnapshot, RepositoryRecord};
use crate::error::{Result, StatsError};
use crate::github::{OwnerIdentity, RepositoryDescriptor};

use super::provider::HistoryProvider;
use super::walker;

/// Where a user's cache file lives and how its comment block is sized.
#[derive(Debug, Clone)]
pub struct CacheLocation {
    pub dir: PathBuf,
    pub user: String,
    pub comment_size: usize,
}

/// Line totals across every tracked repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LocSummary {
    pub additions: u64,
    pub deletions: u64,
    pub net: i64,
    /// False when the cache had to be rebuilt during this run.
    pub cache_hit: bool,
}

/// Bring the cache in line with `repositories` and return the summed line totals.
///
/// The cache is rebuilt from scratch when forced, when its line count does not
/// match the comment block plus one record per repository (whether or not those
/// lines parse), or when any record no longer sits at the position
/// of its repository. Afterwards only repositories whose commit total differs
/// from the cached one are walked. If a walk fails, the records updated so far
/// are flushed to disk before the error is returned.
pub async fn reconcile<P: HistoryProvider>(
    provider: &mut P,
    owner_id: &OwnerIdentity,
    location: &CacheLocation,
    repositories: &[RepositoryDescriptor],
    force_rebuild: bool,
) -> Result<LocSummary> {
    let snapshot =
        CacheSnapshot::read_or_init(&location.dir, &location.user, location.comment_size)?;

    // The line count is checked before any record is parsed.
    let (mut cache, rebuild_reason) = if force_rebuild {
        (snapshot.into_comments(), Some("forced"))
    } else if !snapshot.is_valid(repositories.len()) {
        (snapshot.into_comments(), Some("record count mismatch"))
    } else {
        let cache = snapshot.parse()?;
        let reason = (!cache.is_aligned(repositories)).then_some("repository order changed");
        (cache, reason)
    };

    let cache_hit = match rebuild_reason {
        Some(reason) => {
            tracing::info!(reason, repositories = repositories.len(), "rebuilding cache");
            cache.rebuild(repositories)?;
            false
        }
        None => true,
    };

    if let Err(e) = update_records(provider, owner_id, &mut cache, repositories).await {
        cache.emergency_flush();
        return Err(e);
    }

    cache.persist()?;

    let (additions, deletions) = cache.line_totals();
    let summary = LocSummary {
        additions,
        deletions,
        net: additions as i64 - deletions as i64,
        cache_hit,
    };
    tracing::info!(
        additions,
        deletions,
        net = summary.net,
        cache_hit,
        "reconciled line counts"
    );
    Ok(summary)
}

/// Re-walk every repository whose commit total moved, updating records in place.
async fn update_records<P: HistoryProvider>(
    provider: &mut P,
    owner_id: &OwnerIdentity,
    cache: &mut CacheFile,
    repositories: &[RepositoryDescriptor],
) -> Result<()> {
    let mut walked = 0usize;

    for (index, repo) in repositories.iter().enumerate() {
        let name = repo.name_with_owner.as_str();
        let cached = &cache.records()[index];

        let Some(commit_total) = repo.commit_total else {
            if cached != &RepositoryRecord::zeroed(name) {
                cache.set_record(index, RepositoryRecord::zeroed(name));
            }
            continue;
        };

        if commit_total == cached.commit_count {
            continue;
        }

        let (owner, repo_name) = repo
            .owner_and_name()
            .ok_or_else(|| StatsError::Other(format!("invalid repository name {}", name)))?;

        tracing::debug!(
            repo = name,
            cached = cached.commit_count,
            current = commit_total,
            "commit count changed"
        );
        walked += 1;

        let record = match walker::walk(provider, owner_id, owner, repo_name).await? {
            Some(totals) => RepositoryRecord {
                fingerprint: cached.fingerprint.clone(),
                commit_count: commit_total,
                my_commits: totals.my_commits,
                additions: totals.additions,
                deletions: totals.deletions,
            },
            None => RepositoryRecord::zeroed(name),
        };
        cache.set_record(index, record);
    }

    tracing::info!(walked, total = repositories.len(), "updated repositories");
    Ok(())
}
