// Runtime configuration.
// Resolves credentials, the tracked user, and cache settings from flags and the environment.

use std::path::PathBuf;

use crate::cache::{DEFAULT_COMMENT_SIZE, default_cache_dir};
use crate::error::{Result, StatsError};
use crate::github::Affiliation;
use crate::github::client::GITHUB_API_BASE;
use crate::loc::CacheLocation;

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Personal access token used for every request.
    pub token: String,
    /// Login of the tracked user.
    pub user: String,
    pub api_base: String,
    pub cache_dir: PathBuf,
    /// Number of free-text lines at the top of the cache file.
    pub comment_size: usize,
    /// Affiliations whose repositories count towards lines of code.
    pub loc_affiliations: Vec<Affiliation>,
    pub force_rebuild: bool,
    pub skip_loc: bool,
    /// Optional archive of deleted repositories to add to the totals.
    pub archive: Option<PathBuf>,
}

impl Config {
    /// Build a configuration with defaults for everything but the credentials.
    pub fn new(token: Option<String>, user: Option<String>) -> Result<Self> {
        let token = token
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
            .filter(|t| !t.trim().is_empty())
            .ok_or(StatsError::MissingToken)?;
        let user = user
            .filter(|u| !u.trim().is_empty())
            .ok_or(StatsError::MissingUser)?;

        Ok(Self {
            token,
            user,
            api_base: GITHUB_API_BASE.to_string(),
            cache_dir: default_cache_dir(),
            comment_size: DEFAULT_COMMENT_SIZE,
            loc_affiliations: Affiliation::ALL.to_vec(),
            force_rebuild: false,
            skip_loc: false,
            archive: None,
        })
    }

    /// Cache file settings for the tracked user.
    pub fn cache_location(&self) -> CacheLocation {
        CacheLocation {
            dir: self.cache_dir.clone(),
            user: self.user.clone(),
            comment_size: self.comment_size,
        }
    }
}
