// Archived repository totals.
// Reads last-known line counts for repositories that were deleted upstream.

use std::path::Path;

use serde::Serialize;

use crate::error::Result;

use super::store::{parse_records, read_text};

/// Totals contributed by archived repositories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ArchiveSummary {
    pub additions: u64,
    pub deletions: u64,
    pub my_commits: u64,
    pub repositories: u64,
}

impl ArchiveSummary {
    /// Read an archive file in the cache format.
    /// Returns None when the file does not exist.
    pub fn load(path: &Path, comment_size: usize) -> Result<Option<Self>> {
        let Some(contents) = read_text(path)? else {
            return Ok(None);
        };

        let records = parse_records(
            contents.lines().skip(comment_size),
            comment_size + 1,
        )?;

        let summary = records.iter().fold(Self::default(), |mut summary, record| {
            summary.additions += record.additions;
            summary.deletions += record.deletions;
            summary.my_commits += record.my_commits;
            summary.repositories += 1;
            summary
        });

        tracing::debug!(path = %path.display(), repositories = summary.repositories, "loaded archive");
        Ok(Some(summary))
    }
}
