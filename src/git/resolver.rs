//! Address resolution: `(repo, commitish, path)` → `ResolvedAddress`.
//!
//! The result always pins a full commit id, never a ref name, so a view
//! addressed through it stays the same view even after refs move. Paths are
//! normalized and checked here, before any object lookup happens.

use git2::Oid;

use crate::error::{AppError, Result};
use crate::git::registry::{Registry, SharedRepo};

/// Canonical identity of a view. `commit_id` exists in `repository`.
#[derive(Debug, Clone)]
pub struct ResolvedAddress {
    pub repository: SharedRepo,
    pub commit_id: Oid,
    /// Slash-separated, relative, empty for the root
    pub path: String,
}

impl ResolvedAddress {
    pub fn repo_name(&self) -> &str {
        &self.repository.name
    }
}

/// Resolve a navigational request. An empty commitish means the default
/// branch head; otherwise an exact ref match wins over an id match.
pub fn resolve(
    registry: &Registry,
    repo_name: &str,
    commitish: Option<&str>,
    path: &str,
) -> Result<ResolvedAddress> {
    let repository = registry
        .get(repo_name)?
        .ok_or_else(|| AppError::RepoNotFound(repo_name.to_string()))?;

    // Before touching the store
    let path = normalize_path(path)?;

    let commit_id = resolve_commitish(&repository, commitish.unwrap_or(""))?;

    tracing::debug!(
        "Resolved {}@{} to {}",
        repo_name,
        commitish.unwrap_or("HEAD"),
        commit_id
    );

    Ok(ResolvedAddress {
        repository,
        commit_id,
        path,
    })
}

/// Resolve `commitish` within one repository to a full commit id.
pub fn resolve_commitish(repository: &SharedRepo, commitish: &str) -> Result<Oid> {
    let not_found = |revision: &str| AppError::RevisionNotFound {
        repo: repository.name.clone(),
        revision: revision.to_string(),
    };

    if commitish.is_empty() {
        return repository.default_head()?.ok_or_else(|| not_found("HEAD"));
    }

    if let Some(oid) = repository.resolve_ref(commitish)? {
        return Ok(oid);
    }

    repository
        .resolve_abbreviated_id(commitish)?
        .ok_or_else(|| not_found(commitish))
}

/// Collapse empty segments and reject anything that could step outside the
/// tree: `.`/`..` segments, backslashes and NUL bytes.
pub fn normalize_path(path: &str) -> Result<String> {
    let mut segments = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" => continue,
            "." | ".." => return Err(AppError::InvalidPath(path.to_string())),
            s if s.contains('\\') || s.contains('\0') => {
                return Err(AppError::InvalidPath(path.to_string()));
            }
            s => segments.push(s),
        }
    }

    Ok(segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_redundant_slashes() {
        assert_eq!(normalize_path("").unwrap(), "");
        assert_eq!(normalize_path("/").unwrap(), "");
        assert_eq!(normalize_path("/src//lib.rs/").unwrap(), "src/lib.rs");
        assert_eq!(normalize_path("docs/a.b/c..d").unwrap(), "docs/a.b/c..d");
    }

    #[test]
    fn rejects_traversal() {
        for path in [
            "../../etc/passwd",
            "src/../../secret",
            "./src",
            "src/.",
            "..\\windows",
            "a\0b",
        ] {
            assert!(
                matches!(normalize_path(path), Err(AppError::InvalidPath(_))),
                "{path:?} should be rejected"
            );
        }
    }

    #[test]
    fn unknown_repository_is_reported_before_path_checks() {
        let registry = Registry::new("/nonexistent");
        let err = resolve(&registry, "ghost", None, "../x").unwrap_err();
        assert!(matches!(err, AppError::RepoNotFound(name) if name == "ghost"));
    }
}
