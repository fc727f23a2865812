// Command-line interface.
// Flag parsing, logging setup, and rendering of the collected statistics.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::cache::{DEFAULT_COMMENT_SIZE, archive_path};
use crate::config::Config;
use crate::github::{Affiliation, GitHubClient};
use crate::stats::{self, ProfileStats};

#[derive(Parser, Debug)]
#[command(name = "profile-stats")]
#[command(about = "Collect GitHub profile statistics with an incremental lines-of-code cache")]
#[command(version)]
pub struct Cli {
    #[arg(long, default_value = "info", help = "Log filter (e.g. info, profile_stats=debug)")]
    pub log_level: String,

    #[arg(long, env = "ACCESS_TOKEN", hide_env_values = true, help = "GitHub access token")]
    pub token: Option<String>,

    #[arg(long, env = "USER_NAME", help = "GitHub login to collect statistics for")]
    pub user: Option<String>,

    #[arg(long, env = "GITHUB_API_URL", help = "GitHub API base URL")]
    pub api_base: Option<String>,

    #[arg(long, env = "PROFILE_STATS_CACHE_DIR", help = "Directory holding the cache files")]
    pub cache_dir: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_COMMENT_SIZE, help = "Comment lines at the top of the cache file")]
    pub comment_size: usize,

    #[arg(
        long = "affiliation",
        value_enum,
        value_delimiter = ',',
        help = "Affiliations counted for lines of code (default: all)"
    )]
    pub affiliations: Vec<Affiliation>,

    #[arg(long, help = "Discard the cache and walk every repository again")]
    pub force_rebuild: bool,

    #[arg(long, help = "Skip the lines-of-code pass")]
    pub skip_loc: bool,

    #[arg(long, help = "Archive of deleted repositories to add to the totals (default: repository_archive.txt in the cache dir)")]
    pub archive: Option<PathBuf>,

    #[arg(long, help = "Output as JSON")]
    pub json: bool,

    #[arg(long, env = "OUTPUT_PATH", help = "Write the output to this file instead of stdout")]
    pub output: Option<PathBuf>,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Resolve flags and environment into a run configuration.
    pub fn config(&self) -> Result<Config> {
        let mut config = Config::new(self.token.clone(), self.user.clone())?;
        if let Some(api_base) = &self.api_base {
            config.api_base = api_base.clone();
        }
        if let Some(dir) = &self.cache_dir {
            config.cache_dir = dir.clone();
        }
        if !self.affiliations.is_empty() {
            config.loc_affiliations = self.affiliations.clone();
        }
        config.comment_size = self.comment_size;
        config.force_rebuild = self.force_rebuild;
        config.skip_loc = self.skip_loc;
        config.archive = Some(
            self.archive
                .clone()
                .unwrap_or_else(|| archive_path(&config.cache_dir)),
        );
        Ok(config)
    }

    pub async fn execute(self) -> Result<()> {
        let config = self.config()?;
        tracing::info!(
            user = %config.user,
            cache_dir = %config.cache_dir.display(),
            "collecting profile statistics"
        );

        let mut client = GitHubClient::with_base_url(&config.token, &config.api_base)?;
        let stats = stats::collect(&mut client, &config).await?;

        let rendered = if self.json {
            serde_json::to_string_pretty(&stats)?
        } else {
            render_text(&stats)
        };

        match &self.output {
            Some(path) => std::fs::write(path, rendered + "\n")
                .with_context(|| format!("failed to write {}", path.display()))?,
            None => println!("{}", rendered),
        }
        Ok(())
    }
}

pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

const LINE_WIDTH: usize = 40;

/// `label: ..... value`, padded to a fixed width.
fn dot_line(label: &str, value: &str) -> String {
    let used = label.len() + value.len() + 3;
    let dots = ".".repeat(LINE_WIDTH.saturating_sub(used).max(1));
    format!("{}: {} {}", label, dots, value)
}

pub fn render_text(stats: &ProfileStats) -> String {
    let mut lines = vec![
        dot_line("user", &stats.user),
        dot_line("joined", &stats.account_created_at.format("%Y-%m-%d").to_string()),
        dot_line(
            "repos",
            &format!("{} (+{})", stats.repos, stats.contributed),
        ),
        dot_line("commits", &stats.commits.to_string()),
        dot_line("contributions", &stats.contributions_last_year.to_string()),
        dot_line("stars", &stats.stars.to_string()),
        dot_line("followers", &stats.followers.to_string()),
    ];

    if let Some(loc) = &stats.loc {
        lines.push(dot_line(
            "lines of code",
            &format!("{} (+{}, -{})", loc.net, loc.additions, loc.deletions),
        ));
        lines.push(dot_line(
            "cache",
            if loc.cache_hit { "hit" } else { "rebuilt" },
        ));
    }

    lines.push(dot_line("api calls", &stats.queries.total().to_string()));
    for (name, count) in stats.queries.iter() {
        lines.push(format!("   {:<24} {:>6}", format!("{}:", name), count));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "profile-stats",
            "--token",
            "t",
            "--user",
            "octocat",
            "--cache-dir",
            "/tmp/c",
            "--affiliation",
            "owner,collaborator",
            "--force-rebuild",
            "--json",
        ])
        .unwrap();

        let config = cli.config().unwrap();
        assert_eq!(config.user, "octocat");
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/c"));
        assert_eq!(
            config.loc_affiliations,
            vec![Affiliation::Owner, Affiliation::Collaborator]
        );
        assert!(config.force_rebuild);
        assert_eq!(
            config.archive,
            Some(PathBuf::from("/tmp/c/repository_archive.txt"))
        );
        assert!(cli.json);
    }

    #[test]
    fn test_dot_line() {
        let line = dot_line("stars", "12");
        assert!(line.starts_with("stars: ."));
        assert!(line.ends_with(" 12"));
        assert_eq!(line.len(), LINE_WIDTH);
    }
}
