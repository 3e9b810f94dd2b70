//! Blame data transfer objects.
//!
//! Provides per-line commit attribution for file content at a specific commit.

use serde::Serialize;

/// Blame for a file at a specific commit.
#[derive(Debug, Clone, Serialize)]
pub struct BlameView {
    pub repo: String,
    /// Commit OID where blame was calculated
    pub commit_id: String,
    pub path: String,
    /// Per-line blame information, ordered by line number
    pub lines: Vec<BlameLine>,
}

/// Blame information for a single line.
#[derive(Debug, Clone, Serialize)]
pub struct BlameLine {
    /// Line number (1-indexed)
    pub line_number: usize,
    /// OID of the commit that last modified this line
    pub commit_id: String,
    pub author_name: String,
    pub author_email: String,
    /// Unix timestamp of the attributed commit
    pub timestamp: i64,
    pub content: String,
}
