//! Lazy, restartable commit history walks.
//!
//! `HistoryWalk` yields commits newest first, one revwalk step at a time, so
//! a page of N commits never touches more history than it has to. Pages are
//! continued with a cursor: the id of the last commit the previous page
//! returned. Resuming replays raw ancestry (no path checks) up to the cursor,
//! which keeps pagination exact for merge-heavy histories too.
//!
//! Every step checks the caller's `Cancellation`.

use git2::{Commit, ErrorCode, Oid, Repository, Revwalk, Sort, Tree};
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::git::cancel::Cancellation;
use crate::git::repository::{GitRepository, commit_to_summary};
use crate::models::LogPage;

/// Parameters for one page of a log view.
#[derive(Debug, Clone)]
pub struct LogQuery {
    pub limit: usize,
    /// Last commit id of the previous page
    pub after: Option<Oid>,
    /// Follow only first parents instead of all ancestry
    pub first_parent: bool,
}

pub struct HistoryWalk<'r> {
    repo: &'r Repository,
    revwalk: Revwalk<'r>,
    path: Option<PathBuf>,
    first_parent: bool,
    cancel: Cancellation,
    done: bool,
}

impl<'r> HistoryWalk<'r> {
    pub fn new(
        repo: &'r Repository,
        start: Oid,
        path: &str,
        first_parent: bool,
        cancel: Cancellation,
    ) -> Result<Self> {
        let mut revwalk = repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME)?;
        revwalk.push(start)?;
        if first_parent {
            revwalk.simplify_first_parent()?;
        }

        Ok(Self {
            repo,
            revwalk,
            path: (!path.is_empty()).then(|| PathBuf::from(path)),
            first_parent,
            cancel,
            done: false,
        })
    }

    /// Advance past `cursor` without filtering. Returns false if the walk
    /// ran out before reaching it.
    pub fn skip_past(&mut self, cursor: Oid) -> Result<bool> {
        for oid in self.revwalk.by_ref() {
            self.cancel.check()?;
            if oid? == cursor {
                return Ok(true);
            }
        }
        self.done = true;
        Ok(false)
    }

    /// Whether `commit` changed the filtered path. A commit identical to any
    /// followed parent at that path is skipped, as `git log -- path` does.
    fn touches_path(&self, commit: &Commit) -> Result<bool> {
        let Some(path) = self.path.as_deref() else {
            return Ok(true);
        };

        let own = entry_id(&commit.tree()?, path)?;
        if commit.parent_count() == 0 {
            return Ok(own.is_some());
        }

        let followed = if self.first_parent { 1 } else { commit.parent_count() };
        for parent in commit.parents().take(followed) {
            if entry_id(&parent.tree()?, path)? == own {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl<'r> Iterator for HistoryWalk<'r> {
    type Item = Result<Commit<'r>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            if let Err(e) = self.cancel.check() {
                self.done = true;
                return Some(Err(e));
            }

            let oid = match self.revwalk.next()? {
                Ok(oid) => oid,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
            };

            let commit = match self.repo.find_commit(oid) {
                Ok(commit) => commit,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
            };

            match self.touches_path(&commit) {
                Ok(true) => return Some(Ok(commit)),
                Ok(false) => continue,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

fn entry_id(tree: &Tree, path: &Path) -> Result<Option<Oid>> {
    match tree.get_path(path) {
        Ok(entry) => Ok(Some(entry.id())),
        Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl GitRepository {
    /// One page of history starting at `start`, restricted to commits that
    /// touched `path` when it is non-empty.
    pub fn log_page(
        &self,
        start: Oid,
        path: &str,
        query: &LogQuery,
        cancel: &Cancellation,
    ) -> Result<LogPage> {
        let limit = query.limit.max(1);

        self.with_own_handle(|repo| {
            let mut walk = HistoryWalk::new(repo, start, path, query.first_parent, cancel.clone())?;

            if let Some(after) = query.after {
                if !walk.skip_past(after)? {
                    return Err(AppError::RevisionNotFound {
                        repo: self.name.clone(),
                        revision: after.to_string(),
                    });
                }
            }

            let mut commits = Vec::with_capacity(limit);
            let mut has_more = false;
            for commit in walk {
                let commit = commit?;
                if commits.len() == limit {
                    has_more = true;
                    break;
                }
                commits.push(commit_to_summary(&commit));
            }

            let next_cursor = if has_more {
                commits.last().map(|c| c.id.clone())
            } else {
                None
            };

            tracing::debug!(
                "Log page for {}@{} ({}): {} commits, more={}",
                self.name,
                start,
                if path.is_empty() { "(root)" } else { path },
                commits.len(),
                has_more
            );

            Ok(LogPage {
                repo: self.name.clone(),
                start: start.to_string(),
                path: path.to_string(),
                commits,
                next_cursor,
            })
        })
    }
}
