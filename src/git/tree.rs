use git2::{ErrorCode, ObjectType, Oid, Repository};
use std::path::Path;

use crate::error::{AppError, Result};
use crate::git::repository::GitRepository;
use crate::models::{EntryKind, TreeEntry};

/// Raw blob content at a path.
#[derive(Debug, Clone)]
pub struct BlobData {
    pub object_id: Oid,
    pub content: Vec<u8>,
}

impl GitRepository {
    /// Children of the directory at `path` under `commit_id`, in store order.
    pub fn get_tree(&self, commit_id: Oid, path: &str) -> Result<Vec<TreeEntry>> {
        self.with_repo(|repo| {
            let (kind, oid) = self.locate(repo, commit_id, path)?;
            if kind != ObjectType::Tree {
                return Err(AppError::NotATree {
                    repo: self.name.clone(),
                    commit: commit_id.to_string(),
                    path: path.to_string(),
                });
            }

            let tree = repo.find_tree(oid)?;
            let odb = repo.odb()?;
            let mut entries = Vec::with_capacity(tree.len());

            for entry in tree.iter() {
                let name = String::from_utf8_lossy(entry.name_bytes()).into_owned();
                let entry_path = if path.is_empty() {
                    name.clone()
                } else {
                    format!("{}/{}", path, name)
                };

                let kind = match entry.kind() {
                    Some(ObjectType::Blob) => EntryKind::Blob,
                    Some(ObjectType::Tree) => EntryKind::Tree,
                    Some(ObjectType::Commit) => EntryKind::Submodule,
                    _ => continue,
                };

                let size = if kind == EntryKind::Blob {
                    odb.read_header(entry.id()).ok().map(|(size, _)| size as u64)
                } else {
                    None
                };

                entries.push(TreeEntry {
                    name,
                    path: entry_path,
                    mode: entry.filemode(),
                    object_id: entry.id().to_string(),
                    kind,
                    size,
                });
            }

            Ok(entries)
        })
    }

    /// Content of the file at `path` under `commit_id`.
    pub fn get_blob(&self, commit_id: Oid, path: &str) -> Result<BlobData> {
        self.with_repo(|repo| {
            let (kind, oid) = self.locate(repo, commit_id, path)?;
            if kind != ObjectType::Blob {
                return Err(AppError::NotABlob {
                    repo: self.name.clone(),
                    commit: commit_id.to_string(),
                    path: path.to_string(),
                });
            }

            let blob = repo.find_blob(oid)?;
            Ok(BlobData {
                object_id: oid,
                content: blob.content().to_vec(),
            })
        })
    }

    /// Kind and id of the object at `path`; the empty path is the root tree.
    fn locate(&self, repo: &Repository, commit_id: Oid, path: &str) -> Result<(ObjectType, Oid)> {
        let not_found = || AppError::NotFound {
            repo: self.name.clone(),
            commit: commit_id.to_string(),
            path: path.to_string(),
        };

        let commit = repo.find_commit(commit_id).map_err(|e| match e.code() {
            ErrorCode::NotFound => not_found(),
            _ => e.into(),
        })?;
        let tree = commit.tree()?;

        if path.is_empty() {
            return Ok((ObjectType::Tree, tree.id()));
        }

        let entry = tree.get_path(Path::new(path)).map_err(|e| match e.code() {
            ErrorCode::NotFound => not_found(),
            _ => e.into(),
        })?;

        // Submodule links point outside this store
        let kind = entry.kind().unwrap_or(ObjectType::Any);
        Ok((kind, entry.id()))
    }
}
