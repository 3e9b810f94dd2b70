//! Tree and repository-related DTOs.
//!
//! - `TreeEntry`: Single child of a directory listing
//! - `TreeView`: Ordered listing plus an optional rendered README
//! - `RepositoryInfo`: Repo metadata for the repository index
//! - `RefInfo`: Branch or tag with the commit it names

use serde::{Deserialize, Serialize};

use super::CommitSummary;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TreeEntry {
    pub name: String,
    pub path: String,
    pub mode: i32,
    pub object_id: String,
    pub kind: EntryKind,
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Tree,
    Blob,
    Submodule,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeView {
    pub repo: String,
    pub commit_id: String,
    pub path: String,
    pub entries: Vec<TreeEntry>,
    /// Rendered README found in this directory, if any
    pub readme: Option<RenderedReadme>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedReadme {
    pub name: String,
    pub html: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub name: String,
    pub head_branch: Option<String>,
    pub head_commit: Option<CommitSummary>,
    pub is_empty: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum RefKind {
    Branch,
    Tag,
    Remote,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefInfo {
    pub name: String,
    pub full_name: String,
    pub kind: RefKind,
    /// Commit the ref resolves to (tags are peeled)
    pub target: Option<String>,
    pub is_head: bool,
}
