use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommitSummary {
    pub id: String,
    pub author: AuthorInfo,
    pub timestamp: i64,
    pub relative_time: String,
    pub message: String,
    /// First parent first
    pub parent_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorInfo {
    pub name: String,
    pub email: String,
}

/// One page of a history walk, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogPage {
    pub repo: String,
    pub start: String,
    pub path: String,
    pub commits: Vec<CommitSummary>,
    /// Pass back as `after` to continue the walk; absent once exhausted
    pub next_cursor: Option<String>,
}
