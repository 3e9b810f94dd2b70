use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::git::ViewSettings;

/// Gitamite - Browse a directory of git repositories in your browser
#[derive(Parser, Debug, Clone)]
#[command(name = "gitamite")]
#[command(about = "A read-only web viewer for git repositories", long_about = None)]
pub struct Config {
    /// Directory whose subdirectories are served as repositories
    #[arg(long, env = "GITAMITE_REPO_DIR", value_name = "DIR")]
    pub repo_dir: PathBuf,

    /// Address to bind
    #[arg(long, env = "GITAMITE_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to run the server on
    #[arg(short, long, env = "GITAMITE_PORT", default_value = "8000")]
    pub port: u16,

    /// Open browser automatically after starting
    #[arg(short, long)]
    pub open: bool,

    /// Maximum number of rendered artifacts kept in memory
    #[arg(long, env = "GITAMITE_CACHE_CAPACITY", default_value = "1024")]
    pub cache_capacity: usize,

    /// Commits per log page when the request doesn't say
    #[arg(long, env = "GITAMITE_PAGE_SIZE", default_value = "50")]
    pub page_size: usize,

    /// Upper bound on a requested log page size
    #[arg(long, env = "GITAMITE_MAX_PAGE_SIZE", default_value = "500")]
    pub max_page_size: usize,

    /// Deadline for a single history walk, in milliseconds
    #[arg(long, env = "GITAMITE_WALK_TIMEOUT_MS", default_value = "10000")]
    pub walk_timeout_ms: u64,

    /// Text blobs larger than this are served without highlighting
    #[arg(long, env = "GITAMITE_MAX_HIGHLIGHT_BYTES", default_value = "1048576")]
    pub max_highlight_bytes: usize,

    /// Log filter, overrides RUST_LOG (e.g. "info", "gitamite=debug")
    #[arg(long, env = "GITAMITE_LOG")]
    pub log_level: Option<String>,
}

impl Config {
    pub fn view_settings(&self) -> ViewSettings {
        ViewSettings {
            max_highlight_bytes: self.max_highlight_bytes,
            max_page_size: self.max_page_size,
        }
    }

    pub fn walk_timeout(&self) -> Duration {
        Duration::from_millis(self.walk_timeout_ms)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let config = Config::try_parse_from(["gitamite", "--repo-dir", "/srv/git"]).unwrap();
        assert_eq!(config.repo_dir, PathBuf::from("/srv/git"));
        assert_eq!(config.port, 8000);
        assert_eq!(config.page_size, 50);
        assert_eq!(config.walk_timeout(), Duration::from_secs(10));
        assert_eq!(config.bind_addr(), "127.0.0.1:8000");
    }

    #[test]
    fn view_settings_follow_flags() {
        let config = Config::try_parse_from([
            "gitamite",
            "--repo-dir",
            "/srv/git",
            "--max-highlight-bytes",
            "10",
            "--max-page-size",
            "20",
        ])
        .unwrap();
        let settings = config.view_settings();
        assert_eq!(settings.max_highlight_bytes, 10);
        assert_eq!(settings.max_page_size, 20);
    }
}
