use git2::{BlameOptions, Oid};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{AppError, Result};
use crate::git::repository::GitRepository;
use crate::models::BlameLine;

impl GitRepository {
    /// Attribute every line of `path` at `commit_id` to the commit that last
    /// changed it. `content` is the blob at that address; its lines are the
    /// ones reported.
    pub fn blame_file(&self, commit_id: Oid, path: &str, content: &[u8]) -> Result<Vec<BlameLine>> {
        self.with_own_handle(|repo| {
            let mut opts = BlameOptions::new();
            opts.newest_commit(commit_id);

            let blame = repo.blame_file(Path::new(path), Some(&mut opts))?;
            let text = String::from_utf8_lossy(content);

            let mut signatures: HashMap<Oid, (String, String, i64)> = HashMap::new();
            let mut lines = Vec::new();

            for (idx, line) in text.lines().enumerate() {
                let line_number = idx + 1;
                let hunk = blame.get_line(line_number).ok_or_else(|| {
                    AppError::Internal(format!("No blame hunk for {}:{}", path, line_number))
                })?;

                let oid = hunk.final_commit_id();
                if !signatures.contains_key(&oid) {
                    let signature = hunk.final_signature();
                    signatures.insert(
                        oid,
                        (
                            signature.name().unwrap_or("Unknown").to_string(),
                            signature.email().unwrap_or("").to_string(),
                            signature.when().seconds(),
                        ),
                    );
                }
                let (author_name, author_email, timestamp) = &signatures[&oid];

                lines.push(BlameLine {
                    line_number,
                    commit_id: oid.to_string(),
                    author_name: author_name.clone(),
                    author_email: author_email.clone(),
                    timestamp: *timestamp,
                    content: line.to_string(),
                });
            }

            Ok(lines)
        })
    }
}
