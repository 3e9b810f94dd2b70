use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobView {
    pub repo: String,
    pub commit_id: String,
    pub path: String,
    pub object_id: String,
    pub size: u64,
    pub is_binary: bool,
    /// Language hint inferred from the file name
    pub language: String,
    /// Raw text, absent for binary blobs
    pub content: Option<String>,
    pub highlighted: Option<String>,
    pub markdown: Option<String>,
}
