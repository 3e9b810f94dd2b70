//! View-model types handed to the presentation layer.
//!
//! These structs are serialized to JSON by the route handlers.
//! - `tree`: TreeEntry, TreeView, RepositoryInfo, RefInfo
//! - `blob`: BlobView with optional highlighted and markdown HTML
//! - `commit`: CommitSummary, LogPage for paginated history
//! - `diff`: DiffView, FileDiff, DiffHunk, DiffLine
//! - `blame`: BlameView, BlameLine for per-line attribution

pub mod blame;
pub mod blob;
pub mod commit;
pub mod diff;
pub mod tree;

pub use blame::*;
pub use blob::*;
pub use commit::*;
pub use diff::*;
pub use tree::*;

use serde::Serialize;

/// One rendered view. The variant always matches the requested `ViewKind`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum ViewModel {
    Tree(TreeView),
    Blob(BlobView),
    Log(LogPage),
    Diff(DiffView),
    Blame(BlameView),
}
