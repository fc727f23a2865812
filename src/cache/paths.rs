// Cache path utilities.
// Locates the cache directory and derives each user's cache file from a digest of their login.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use super::record::fingerprint;

/// Directory used when no platform cache directory can be determined.
pub const FALLBACK_CACHE_DIR: &str = "cache";

/// Get the platform cache directory (~/.cache/profile-stats on Linux).
pub fn cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "profile-stats").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Cache directory to use when none is configured.
pub fn default_cache_dir() -> PathBuf {
    cache_dir().unwrap_or_else(|| PathBuf::from(FALLBACK_CACHE_DIR))
}

/// Path to the line-of-code cache file of a user.
/// Each user gets an isolated file named after the digest of their login.
pub fn user_cache_path(dir: &Path, user: &str) -> PathBuf {
    dir.join(format!("{}.txt", fingerprint(user)))
}

/// Path to the archive of deleted repositories, stored alongside the user caches.
pub fn archive_path(dir: &Path) -> PathBuf {
    dir.join("repository_archive.txt")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_cache_path() {
        let dir = Path::new("/tmp/stats");
        let path = user_cache_path(dir, "octocat");

        assert!(path.starts_with(dir));
        let file_name = path.file_name().unwrap().to_str().unwrap();
        assert_eq!(file_name, format!("{}.txt", fingerprint("octocat")));
    }

    #[test]
    fn test_users_get_distinct_files() {
        let dir = Path::new("cache");
        assert_ne!(user_cache_path(dir, "alice"), user_cache_path(dir, "bob"));
        assert_eq!(user_cache_path(dir, "alice"), user_cache_path(dir, "alice"));
    }

    #[test]
    fn test_archive_path() {
        assert!(archive_path(Path::new("cache")).ends_with("cache/repository_archive.txt"));
    }
}
