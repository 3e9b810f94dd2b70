//! Process-wide map from repository name to opened handle.
//!
//! Built once at startup by scanning a root directory, then shared by
//! reference with every component that needs lookups. `get`/`list` take a
//! read lock; `create`/`delete` hold the write lock for the whole mutation,
//! on-disk work included, so readers never see a half-applied change.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::error::{AppError, Result};
use crate::git::repository::GitRepository;
use crate::models::RepositoryInfo;

pub type SharedRepo = Arc<GitRepository>;

pub struct Registry {
    root: PathBuf,
    repos: RwLock<BTreeMap<String, SharedRepo>>,
}

impl Registry {
    /// Empty registry rooted at `root`.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            repos: RwLock::new(BTreeMap::new()),
        }
    }

    /// Scan the immediate children of `root`, opening each directory as a
    /// repository named after its basename. Entries that fail to open are
    /// logged and skipped; only an unreadable root is an error.
    pub fn load<P: Into<PathBuf>>(root: P) -> Result<Self> {
        let registry = Self::new(root);
        let mut repos = BTreeMap::new();

        for entry in fs::read_dir(&registry.root)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry in {}: {}", registry.root.display(), e);
                    continue;
                }
            };

            let path = entry.path();
            if !path.is_dir() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().to_string();
            // Hidden entries include tombstones left by a failed delete
            if name.starts_with('.') {
                continue;
            }
            match GitRepository::open(&name, &path) {
                Ok(repo) => {
                    tracing::info!("Loaded repository {} from {}", name, path.display());
                    repos.insert(name, Arc::new(repo));
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", path.display(), e);
                }
            }
        }

        *registry.repos.write().map_err(|_| AppError::lock_poisoned())? = repos;
        Ok(registry)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn get(&self, name: &str) -> Result<Option<SharedRepo>> {
        let repos = self.repos.read().map_err(|_| AppError::lock_poisoned())?;
        Ok(repos.get(name).cloned())
    }

    /// All repositories, sorted by name.
    pub fn list(&self) -> Result<Vec<RepositoryInfo>> {
        let repos: Vec<SharedRepo> = {
            let map = self.repos.read().map_err(|_| AppError::lock_poisoned())?;
            map.values().cloned().collect()
        };
        repos.iter().map(|repo| repo.info()).collect()
    }

    /// Initialize an empty bare repository under the root and register it.
    pub fn create(&self, name: &str) -> Result<SharedRepo> {
        validate_name(name)?;

        let mut repos = self.repos.write().map_err(|_| AppError::lock_poisoned())?;
        let path = self.root.join(name);
        if repos.contains_key(name) || path.exists() {
            return Err(AppError::AlreadyExists(name.to_string()));
        }

        let repo = Arc::new(GitRepository::init_bare(name, &path)?);
        repos.insert(name.to_string(), Arc::clone(&repo));
        tracing::info!("Created repository {} at {}", name, path.display());

        Ok(repo)
    }

    /// Unregister `name` and remove its directory from disk.
    ///
    /// The directory is first renamed to a hidden tombstone under the root.
    /// If that fails nothing has changed; once it succeeds the repository is
    /// gone, and a tombstone that can't be removed is only logged.
    pub fn delete(&self, name: &str) -> Result<()> {
        let mut repos = self.repos.write().map_err(|_| AppError::lock_poisoned())?;
        let repo = repos
            .get(name)
            .cloned()
            .ok_or_else(|| AppError::RepoNotFound(name.to_string()))?;

        let tombstone = self.root.join(format!(".{}.deleting", name));
        if tombstone.is_dir() {
            fs::remove_dir_all(&tombstone)?;
        }
        if let Err(e) = fs::rename(&repo.path, &tombstone) {
            tracing::error!("Failed to delete {}: {}", repo.path.display(), e);
            return Err(e.into());
        }

        // In-flight requests may still hold clones; the store closes with the last one
        repos.remove(name);
        drop(repos);

        if let Err(e) = fs::remove_dir_all(&tombstone) {
            tracing::warn!("Failed to remove {}: {}", tombstone.display(), e);
        }
        tracing::info!("Deleted repository {}", name);

        Ok(())
    }
}

/// A name must be exactly one normal path component under the root.
fn validate_name(name: &str) -> Result<()> {
    let invalid = || AppError::InvalidName(name.to_string());

    if name.is_empty() || name.starts_with('.') {
        return Err(invalid());
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(invalid());
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(invalid()),
    }
}
