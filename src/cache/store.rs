// Cache store for the per-user line-of-code file.
// Handles the comment block, record parsing, rebuilds, and atomic writes.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, StatsError};
use crate::github::RepositoryDescriptor;

use super::paths::user_cache_path;
use super::record::RepositoryRecord;

/// Default number of comment lines at the top of a cache file.
pub const DEFAULT_COMMENT_SIZE: usize = 7;

/// Text written into each comment line of a new cache file.
pub const PLACEHOLDER_COMMENT: &str =
    "This line is a comment block. Write whatever you want here.";

/// In-memory view of one user's cache file.
///
/// The file holds `comment_size` free-text lines followed by one
/// [`RepositoryRecord`] per tracked repository, in the order the repositories
/// were listed. Concurrent runs for the same user are not coordinated: the
/// last writer wins.
#[derive(Debug, Clone)]
pub struct CacheFile {
    path: PathBuf,
    comment_size: usize,
    comments: Vec<String>,
    records: Vec<RepositoryRecord>,
}

/// Contents of a cache file split into its comment block and raw record lines.
///
/// Records are left unparsed so the line count can be checked first: a file
/// whose count is off gets rebuilt even if some of its lines would not parse.
#[derive(Debug, Clone)]
pub struct CacheSnapshot {
    path: PathBuf,
    comment_size: usize,
    comments: Vec<String>,
    record_lines: Vec<String>,
}

impl CacheSnapshot {
    /// Read the cache file of `user`, creating it with a placeholder comment block if absent.
    pub fn read_or_init(dir: &Path, user: &str, comment_size: usize) -> Result<Self> {
        let path = user_cache_path(dir, user);

        let Some(contents) = read_text(&path)? else {
            let snapshot = Self {
                path,
                comment_size,
                comments: placeholder_comments(comment_size),
                record_lines: Vec::new(),
            };
            snapshot.clone().into_comments().persist()?;
            tracing::info!(path = %snapshot.path.display(), "created cache file");
            return Ok(snapshot);
        };

        let mut lines = contents.lines().map(str::to_string);
        let comments: Vec<String> = lines.by_ref().take(comment_size).collect();
        let record_lines = lines.collect();

        Ok(Self {
            path,
            comment_size,
            comments,
            record_lines,
        })
    }

    /// True when the file holds a full comment block and exactly `repo_count` record lines.
    pub fn is_valid(&self, repo_count: usize) -> bool {
        self.comments.len() == self.comment_size && self.record_lines.len() == repo_count
    }

    /// Parse every record line. A line that does not parse is fatal.
    pub fn parse(self) -> Result<CacheFile> {
        let records = parse_records(
            self.record_lines.iter().map(String::as_str),
            self.comment_size + 1,
        )?;

        Ok(CacheFile {
            path: self.path,
            comment_size: self.comment_size,
            comments: self.comments,
            records,
        })
    }

    /// Keep the comment block and drop the record lines unparsed, ahead of a rebuild.
    pub fn into_comments(self) -> CacheFile {
        CacheFile {
            path: self.path,
            comment_size: self.comment_size,
            comments: self.comments,
            records: Vec::new(),
        }
    }
}

/// Parse the record section of a cache-format file.
///
/// `first_line` is the 1-based line number of the first record, used in errors.
/// Every line must be a record; blank lines are malformed too.
pub fn parse_records<'a>(
    lines: impl IntoIterator<Item = &'a str>,
    first_line: usize,
) -> Result<Vec<RepositoryRecord>> {
    lines
        .into_iter()
        .enumerate()
        .map(|(idx, line)| {
            line.parse::<RepositoryRecord>()
                .map_err(|_| StatsError::MalformedCacheRecord {
                    line: first_line + idx,
                    content: line.to_string(),
                })
        })
        .collect()
}

impl CacheFile {
    /// Load and parse the cache file of `user`, creating it with a placeholder comment block if absent.
    pub fn load_or_init(dir: &Path, user: &str, comment_size: usize) -> Result<Self> {
        CacheSnapshot::read_or_init(dir, user, comment_size)?.parse()
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Comment block, verbatim.
    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    /// Records in file order.
    pub fn records(&self) -> &[RepositoryRecord] {
        &self.records
    }

    /// Replace the record at `index`.
    pub fn set_record(&mut self, index: usize, record: RepositoryRecord) {
        self.records[index] = record;
    }

    /// True when the comment block is complete and there is exactly one record per repository.
    pub fn is_valid(&self, repo_count: usize) -> bool {
        self.comments.len() == self.comment_size && self.records.len() == repo_count
    }

    /// True when every record sits at the position of the repository it was computed for.
    pub fn is_aligned(&self, repositories: &[RepositoryDescriptor]) -> bool {
        self.records.len() == repositories.len()
            && self
                .records
                .iter()
                .zip(repositories)
                .all(|(record, repo)| record.matches(&repo.name_with_owner))
    }

    /// Discard all records and write one zeroed record per repository, keeping the comment block.
    pub fn rebuild(&mut self, repositories: &[RepositoryDescriptor]) -> Result<()> {
        if self.comments.len() < self.comment_size {
            let missing = self.comment_size - self.comments.len();
            self.comments.extend(placeholder_comments(missing));
        }

        self.records = repositories
            .iter()
            .map(|repo| RepositoryRecord::zeroed(&repo.name_with_owner))
            .collect();

        self.persist()
    }

    /// Write the comment block and every record, replacing the file.
    pub fn persist(&self) -> Result<()> {
        write_text(&self.path, &self.render())
    }

    /// Best-effort persist ahead of a fatal error.
    /// A failure here is logged and swallowed so the triggering error is not masked.
    pub fn emergency_flush(&self) {
        match self.persist() {
            Ok(()) => tracing::warn!(
                path = %self.path.display(),
                "error while updating the cache, partial data has been saved"
            ),
            Err(e) => tracing::error!(
                path = %self.path.display(),
                error = %e,
                "emergency flush of the cache failed"
            ),
        }
    }

    /// Sum of additions and deletions across all records.
    pub fn line_totals(&self) -> (u64, u64) {
        self.records.iter().fold((0, 0), |(add, del), record| {
            (add + record.additions, del + record.deletions)
        })
    }

    /// Sum of the tracked user's commits across all records.
    pub fn commit_total(&self) -> u64 {
        self.records.iter().map(|record| record.my_commits).sum()
    }

    fn render(&self) -> String {
        let mut text = String::new();
        for line in &self.comments {
            text.push_str(line);
            text.push('\n');
        }
        for record in &self.records {
            text.push_str(&record.to_string());
            text.push('\n');
        }
        text
    }
}

fn placeholder_comments(count: usize) -> Vec<String> {
    vec![PLACEHOLDER_COMMENT.to_string(); count]
}

/// Write text to a file atomically via a temp file.
pub fn write_text(path: &Path, text: &str) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path)?;
    file.write_all(text.as_bytes())?;
    file.sync_all()?;
    fs::rename(&temp_path, path)?;

    Ok(())
}

/// Read a whole file, returning None if it does not exist.
pub fn read_text(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
