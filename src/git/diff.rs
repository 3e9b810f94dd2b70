use git2::{Delta, DiffFindOptions, DiffOptions, ErrorCode, Oid};

use crate::error::{AppError, Result};
use crate::git::repository::{GitRepository, commit_to_summary};
use crate::models::{CommitSummary, DiffHunk, DiffLine, DiffStats, DiffStatus, FileDiff, LineType};

/// Similarity (percent) above which a delete/add pair is reported as a
/// rename, and a new file as a copy.
pub const RENAME_THRESHOLD: u16 = 50;
pub const COPY_THRESHOLD: u16 = 50;

const CONTEXT_LINES: u32 = 3;

impl GitRepository {
    pub fn commit_summary(&self, commit_id: Oid) -> Result<CommitSummary> {
        self.with_repo(|repo| Ok(commit_to_summary(&repo.find_commit(commit_id)?)))
    }

    /// Per-file hunks turning `from` into `to`. `from = None` compares
    /// against the empty tree. A non-empty `path` limits the comparison to
    /// that file or directory.
    pub fn diff_trees(
        &self,
        from: Option<Oid>,
        to: Oid,
        path: &str,
    ) -> Result<(Vec<FileDiff>, DiffStats)> {
        self.with_own_handle(|repo| {
            let undefined = || AppError::NoCommonAncestor {
                repo: self.name.clone(),
                from: from.map(|oid| oid.to_string()).unwrap_or_default(),
                to: to.to_string(),
            };

            let to_tree = repo
                .find_commit(to)
                .and_then(|c| c.tree())
                .map_err(|e| match e.code() {
                    ErrorCode::NotFound => undefined(),
                    _ => e.into(),
                })?;

            let from_tree = match from {
                Some(oid) => Some(repo.find_commit(oid).and_then(|c| c.tree()).map_err(
                    |e| match e.code() {
                        ErrorCode::NotFound => undefined(),
                        _ => e.into(),
                    },
                )?),
                None => None,
            };

            let mut opts = DiffOptions::new();
            opts.context_lines(CONTEXT_LINES);
            if !path.is_empty() {
                // A literal file or directory, never a glob
                opts.pathspec(path).disable_pathspec_match(true);
            }

            let mut diff = repo.diff_tree_to_tree(from_tree.as_ref(), Some(&to_tree), Some(&mut opts))?;

            let mut find = DiffFindOptions::new();
            find.renames(true)
                .copies(true)
                .rename_threshold(RENAME_THRESHOLD)
                .copy_threshold(COPY_THRESHOLD);
            diff.find_similar(Some(&mut find))?;

            let mut files: Vec<FileDiff> = Vec::new();
            let mut stats = DiffStats::default();

            for (delta_idx, delta) in diff.deltas().enumerate() {
                let status = match delta.status() {
                    Delta::Added => DiffStatus::Added,
                    Delta::Deleted => DiffStatus::Deleted,
                    Delta::Modified => DiffStatus::Modified,
                    Delta::Renamed => DiffStatus::Renamed,
                    Delta::Copied => DiffStatus::Copied,
                    Delta::Typechange => DiffStatus::TypeChanged,
                    _ => DiffStatus::Unmodified,
                };

                let old_path = delta.old_file().path().map(|p| p.to_string_lossy().to_string());
                let new_path = delta.new_file().path().map(|p| p.to_string_lossy().to_string());

                let mut hunks: Vec<DiffHunk> = Vec::new();
                let patch = git2::Patch::from_diff(&diff, delta_idx)?;
                // Binary detection is only settled once the patch is loaded
                let is_binary = delta.flags().is_binary()
                    || patch.as_ref().is_some_and(|p| p.delta().flags().is_binary());

                if let Some(patch) = patch {
                    for hunk_idx in 0..patch.num_hunks() {
                        let (hunk, _) = patch.hunk(hunk_idx)?;

                        let mut lines: Vec<DiffLine> = Vec::new();

                        for line_idx in 0..patch.num_lines_in_hunk(hunk_idx)? {
                            let line = patch.line_in_hunk(hunk_idx, line_idx)?;

                            let line_type = match line.origin() {
                                '+' => {
                                    stats.insertions += 1;
                                    LineType::Addition
                                }
                                '-' => {
                                    stats.deletions += 1;
                                    LineType::Deletion
                                }
                                ' ' => LineType::Context,
                                _ => LineType::Header,
                            };

                            lines.push(DiffLine {
                                line_type,
                                old_lineno: line.old_lineno(),
                                new_lineno: line.new_lineno(),
                                content: String::from_utf8_lossy(line.content()).to_string(),
                            });
                        }

                        hunks.push(DiffHunk {
                            old_start: hunk.old_start(),
                            old_lines: hunk.old_lines(),
                            new_start: hunk.new_start(),
                            new_lines: hunk.new_lines(),
                            header: String::from_utf8_lossy(hunk.header()).to_string(),
                            lines,
                        });
                    }
                }

                files.push(FileDiff {
                    old_path,
                    new_path,
                    status,
                    is_binary,
                    hunks,
                });

                stats.files_changed += 1;
            }

            Ok((files, stats))
        })
    }
}
