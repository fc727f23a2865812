// Repository cache records.
// One whitespace-separated line per repository: fingerprint, commit counts, and line totals.

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};

/// Length of a hex-encoded SHA-256 digest.
pub const FINGERPRINT_LEN: usize = 64;

/// Lowercase hex SHA-256 of a string, used for repository and user identities.
pub fn fingerprint(name: &str) -> String {
    hex::encode(Sha256::digest(name.as_bytes()))
}

/// Cached line-of-code totals for one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRecord {
    /// Fingerprint of the repository's `owner/name`.
    pub fingerprint: String,
    /// Default-branch commit total when the record was last computed.
    pub commit_count: u64,
    /// Commits authored by the tracked user.
    pub my_commits: u64,
    /// Lines added by the tracked user.
    pub additions: u64,
    /// Lines deleted by the tracked user.
    pub deletions: u64,
}

impl RepositoryRecord {
    /// A record with every counter reset, for a repository that still needs a walk.
    pub fn zeroed(name_with_owner: &str) -> Self {
        Self {
            fingerprint: fingerprint(name_with_owner),
            commit_count: 0,
            my_commits: 0,
            additions: 0,
            deletions: 0,
        }
    }

    /// Whether this record belongs to the given `owner/name`.
    pub fn matches(&self, name_with_owner: &str) -> bool {
        self.fingerprint == fingerprint(name_with_owner)
    }
}

/// Reason a cache line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRecordError;

impl FromStr for RepositoryRecord {
    type Err = ParseRecordError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [fingerprint, commit_count, my_commits, additions, deletions] = fields[..] else {
            return Err(ParseRecordError);
        };

        if fingerprint.len() != FINGERPRINT_LEN
            || !fingerprint
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        {
            return Err(ParseRecordError);
        }

        let number = |s: &str| s.parse::<u64>().map_err(|_| ParseRecordError);
        Ok(Self {
            fingerprint: fingerprint.to_string(),
            commit_count: number(commit_count)?,
            my_commits: number(my_commits)?,
            additions: number(additions)?,
            deletions: number(deletions)?,
        })
    }
}

impl fmt::Display for RepositoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.fingerprint, self.commit_count, self.my_commits, self.additions, self.deletions
        )
    }
}
