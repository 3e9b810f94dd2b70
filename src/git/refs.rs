//! Ref and object-id resolution against a single repository.
//!
//! Lookups report "no match" as `Ok(None)` so the resolver can try the next
//! strategy; only genuine store failures surface as errors.

use git2::{ErrorCode, Oid};

use crate::error::{AppError, Result};
use crate::git::repository::GitRepository;
use crate::models::{RefInfo, RefKind};

/// Shortest hex prefix accepted as an abbreviated object id.
pub const MIN_ABBREV_LEN: usize = 4;

impl GitRepository {
    /// Commit the default branch (HEAD) points at.
    pub fn default_head(&self) -> Result<Option<Oid>> {
        self.with_repo(|repo| match repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?.id())),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        })
    }

    /// Exact ref match, using git's short-name rules (`main`, `tags/v1`,
    /// `refs/heads/main`, ...). Refs that don't lead to a commit don't match.
    pub fn resolve_ref(&self, name: &str) -> Result<Option<Oid>> {
        self.with_repo(|repo| {
            let reference = match repo.resolve_reference_from_short_name(name) {
                Ok(r) => r,
                Err(e) if is_miss(&e) => return Ok(None),
                Err(e) => return Err(e.into()),
            };
            match reference.peel_to_commit() {
                Ok(commit) => Ok(Some(commit.id())),
                Err(e) if is_miss(&e) || e.code() == ErrorCode::Peel => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    /// Full or abbreviated commit id. An abbreviation matching more than one
    /// object is reported as `AmbiguousRevision`, never resolved to a guess.
    pub fn resolve_abbreviated_id(&self, prefix: &str) -> Result<Option<Oid>> {
        if prefix.len() < MIN_ABBREV_LEN
            || prefix.len() > 40
            || !prefix.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Ok(None);
        }

        self.with_repo(|repo| match repo.find_commit_by_prefix(prefix) {
            Ok(commit) => Ok(Some(commit.id())),
            Err(e) if e.code() == ErrorCode::Ambiguous => Err(AppError::AmbiguousRevision {
                repo: self.name.clone(),
                revision: prefix.to_string(),
            }),
            Err(e) if is_miss(&e) => Ok(None),
            // The prefix named an object that isn't a commit
            Err(e) if e.class() == git2::ErrorClass::Invalid => Ok(None),
            Err(e) => Err(e.into()),
        })
    }

    /// Branches, tags and remote-tracking refs, sorted by kind then name.
    pub fn list_refs(&self) -> Result<Vec<RefInfo>> {
        self.with_repo(|repo| {
            let head_name = repo
                .head()
                .ok()
                .and_then(|h| h.name().map(|n| n.to_string()));

            let mut refs = Vec::new();
            for reference in repo.references()? {
                let reference = reference?;
                let Some(full_name) = reference.name().map(|n| n.to_string()) else {
                    continue;
                };

                let kind = if reference.is_branch() {
                    RefKind::Branch
                } else if reference.is_tag() {
                    RefKind::Tag
                } else if reference.is_remote() {
                    RefKind::Remote
                } else {
                    RefKind::Other
                };

                let name = reference
                    .shorthand()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| full_name.clone());
                let target = reference.peel_to_commit().ok().map(|c| c.id().to_string());
                let is_head = head_name.as_deref() == Some(full_name.as_str());

                refs.push(RefInfo {
                    name,
                    full_name,
                    kind,
                    target,
                    is_head,
                });
            }

            refs.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.name.cmp(&b.name)));
            Ok(refs)
        })
    }
}

fn is_miss(e: &git2::Error) -> bool {
    matches!(e.code(), ErrorCode::NotFound | ErrorCode::InvalidSpec)
}
