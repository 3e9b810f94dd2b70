use git2::Repository;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::{AuthorInfo, CommitSummary, RepositoryInfo};

/// A named, opened object store. Owned by the `Registry`.
pub struct GitRepository {
    pub name: String,
    pub path: PathBuf,
    repo: Mutex<Repository>,
}

impl GitRepository {
    /// Open the repository stored exactly at `path`; parent directories are
    /// never searched.
    pub fn open<P: AsRef<Path>>(name: &str, path: P) -> Result<Self> {
        let repo = Repository::open(path.as_ref())?;

        Ok(Self {
            name: name.to_string(),
            path: path.as_ref().to_path_buf(),
            repo: Mutex::new(repo),
        })
    }

    /// Initialize a new empty bare repository at `path`.
    pub fn init_bare<P: AsRef<Path>>(name: &str, path: P) -> Result<Self> {
        let repo = Repository::init_bare(path.as_ref())?;

        Ok(Self {
            name: name.to_string(),
            path: path.as_ref().to_path_buf(),
            repo: Mutex::new(repo),
        })
    }

    pub fn info(&self) -> Result<RepositoryInfo> {
        self.with_repo(|repo| {
            let head_branch = repo.head().ok().and_then(|h| {
                if h.is_branch() {
                    h.shorthand().map(|s| s.to_string())
                } else {
                    None
                }
            });

            let head_commit = repo
                .head()
                .ok()
                .and_then(|h| h.peel_to_commit().ok().map(|c| commit_to_summary(&c)));

            Ok(RepositoryInfo {
                name: self.name.clone(),
                head_branch,
                head_commit,
                is_empty: repo.is_empty().unwrap_or(true),
            })
        })
    }

    pub fn with_repo<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Repository) -> Result<T>,
    {
        let repo = self.repo.lock().map_err(|_| AppError::lock_poisoned())?;
        f(&repo)
    }

    /// Run `f` on a freshly opened handle instead of the shared one. For
    /// walks that can take long enough to stall other requests.
    pub fn with_own_handle<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Repository) -> Result<T>,
    {
        let repo = Repository::open(&self.path)?;
        f(&repo)
    }
}

impl fmt::Debug for GitRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitRepository")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

pub fn commit_to_summary(commit: &git2::Commit) -> CommitSummary {
    let author = commit.author();
    let timestamp = commit.time().seconds();
    CommitSummary {
        id: commit.id().to_string(),
        author: AuthorInfo {
            name: author.name().unwrap_or("Unknown").to_string(),
            email: author.email().unwrap_or("").to_string(),
        },
        timestamp,
        relative_time: format_relative_time(timestamp),
        message: commit.message().unwrap_or("").trim().to_string(),
        parent_ids: commit.parent_ids().map(|id| id.to_string()).collect(),
    }
}

pub fn format_relative_time(timestamp: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let diff = now - timestamp;

    if diff < 60 {
        "just now".to_string()
    } else if diff < 3600 {
        let mins = diff / 60;
        format!("{} minute{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if diff < 86400 {
        let hours = diff / 3600;
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else if diff < 2592000 {
        let days = diff / 86400;
        format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
    } else if diff < 31536000 {
        let months = diff / 2592000;
        format!("{} month{} ago", months, if months == 1 { "" } else { "s" })
    } else {
        let years = diff / 31536000;
        format!("{} year{} ago", years, if years == 1 { "" } else { "s" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_time_buckets() {
        let now = chrono::Utc::now().timestamp();
        assert_eq!(format_relative_time(now), "just now");
        assert_eq!(format_relative_time(now - 120), "2 minutes ago");
        assert_eq!(format_relative_time(now - 3600), "1 hour ago");
        assert_eq!(format_relative_time(now - 3 * 86400), "3 days ago");
    }
}
