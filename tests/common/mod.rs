#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use git2::{Oid, Repository, Signature, Time};
use tempfile::TempDir;

use gitamite::git::{Registry, ViewBuilder, ViewSettings};
use gitamite::render::{HtmlRenderer, RenderCache};

pub const BASE_TIME: i64 = 1_700_000_000;

/// A root directory of repositories plus a registry loaded from it.
pub struct Fixture {
    pub dir: TempDir,
    pub registry: Registry,
}

impl Fixture {
    /// Build repositories with `setup`, then load the registry.
    pub fn new(setup: impl FnOnce(&Path)) -> Self {
        let dir = TempDir::new().expect("tempdir");
        setup(dir.path());
        let registry = Registry::load(dir.path()).expect("load registry");
        Self { dir, registry }
    }

    pub fn views(&self) -> ViewBuilder {
        ViewBuilder::new(
            Arc::new(RenderCache::new(64)),
            Arc::new(HtmlRenderer::new()),
            ViewSettings::default(),
        )
    }
}

pub fn init_repo(root: &Path, name: &str) -> Repository {
    Repository::init_bare(root.join(name)).expect("init repo")
}

/// Write a tree from `(path, content)` pairs, creating subtrees for
/// slash-separated paths.
pub fn write_tree(repo: &Repository, files: &[(&str, &[u8])]) -> Oid {
    let mut builder = repo.treebuilder(None).expect("treebuilder");
    let mut dirs: BTreeMap<&str, Vec<(&str, &[u8])>> = BTreeMap::new();

    for &(path, content) in files {
        match path.split_once('/') {
            Some((dir, rest)) => dirs.entry(dir).or_default().push((rest, content)),
            None => {
                let blob = repo.blob(content).expect("blob");
                builder.insert(path, blob, 0o100644).expect("insert blob");
            }
        }
    }

    for (dir, children) in dirs {
        let subtree = write_tree(repo, &children);
        builder.insert(dir, subtree, 0o040000).expect("insert tree");
    }

    builder.write().expect("write tree")
}

/// Commit `files` on top of `parents`, optionally moving `update_ref`.
pub fn commit(
    repo: &Repository,
    update_ref: Option<&str>,
    files: &[(&str, &[u8])],
    message: &str,
    parents: &[Oid],
    time: i64,
) -> Oid {
    let tree = repo.find_tree(write_tree(repo, files)).expect("tree");
    let sig = Signature::new("Test Author", "author@example.com", &Time::new(time, 0)).expect("sig");
    let parents: Vec<git2::Commit> = parents
        .iter()
        .map(|id| repo.find_commit(*id).expect("parent"))
        .collect();
    let parent_refs: Vec<&git2::Commit> = parents.iter().collect();

    repo.commit(update_ref, &sig, &sig, message, &tree, &parent_refs)
        .expect("commit")
}

/// Linear history of `count` commits on `main`, each rewriting `log.txt`;
/// returns ids oldest first.
pub fn linear_history(repo: &Repository, count: usize) -> Vec<Oid> {
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let content = format!("entry {i}\n");
        let parents: Vec<Oid> = ids.last().copied().into_iter().collect();
        let id = commit(
            repo,
            Some("refs/heads/main"),
            &[("log.txt", content.as_bytes())],
            &format!("commit {i}"),
            &parents,
            BASE_TIME + i as i64 * 60,
        );
        ids.push(id);
    }
    repo.set_head("refs/heads/main").expect("set head");
    ids
}
