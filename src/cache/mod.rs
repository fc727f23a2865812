// Cache module for the line-of-code flat file.
// Stores per-repository commit counts and line totals between runs.

pub mod archive;
pub mod paths;
pub mod record;
pub mod store;

pub use archive::ArchiveSummary;
pub use paths::{archive_path, default_cache_dir, user_cache_path};
pub use record::{RepositoryRecord, fingerprint};
pub use store::{CacheFile, CacheSnapshot, DEFAULT_COMMENT_SIZE, PLACEHOLDER_COMMENT};
