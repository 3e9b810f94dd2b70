//! View builder: turns a `ResolvedAddress` plus a requested `ViewKind` into a
//! `ViewModel`.
//!
//! The address has already been validated by the resolver, so nothing here
//! re-checks that the commit exists. Every store failure comes back as a
//! typed `AppError`.

use git2::Oid;
use std::sync::Arc;

use crate::error::Result;
use crate::git::cancel::Cancellation;
use crate::git::history::LogQuery;
use crate::git::resolver::ResolvedAddress;
use crate::models::{
    BlameView, BlobView, DiffView, EntryKind, LogPage, RenderedReadme, TreeEntry, TreeView,
    ViewModel,
};
use crate::render::{
    CacheKey, RenderCache, RenderKind, Rendered, TextRenderer, is_markdown, language_for_path,
};

/// Bytes inspected by the binary-content heuristic.
pub const BINARY_SNIFF_LEN: usize = 8000;
/// Percentage of control bytes in the sniffed prefix above which a blob is
/// treated as binary.
pub const BINARY_CONTROL_PERCENT: usize = 30;

const README_NAMES: [&str; 3] = ["readme.md", "readme.markdown", "readme"];

/// The closed set of views. Revisions carried here are already resolved.
#[derive(Debug, Clone)]
pub enum ViewKind {
    Tree,
    Blob,
    Log(LogQuery),
    /// Compare against `against`, or the first parent when absent
    Diff { against: Option<Oid> },
    Blame,
}

#[derive(Debug, Clone)]
pub struct ViewSettings {
    pub max_highlight_bytes: usize,
    pub max_page_size: usize,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            max_highlight_bytes: 1024 * 1024,
            max_page_size: 500,
        }
    }
}

pub struct ViewBuilder {
    cache: Arc<RenderCache>,
    renderer: Arc<dyn TextRenderer>,
    settings: ViewSettings,
}

impl ViewBuilder {
    pub fn new(
        cache: Arc<RenderCache>,
        renderer: Arc<dyn TextRenderer>,
        settings: ViewSettings,
    ) -> Self {
        Self {
            cache,
            renderer,
            settings,
        }
    }

    pub fn cache(&self) -> &RenderCache {
        &self.cache
    }

    pub fn build(
        &self,
        address: &ResolvedAddress,
        kind: ViewKind,
        cancel: &Cancellation,
    ) -> Result<ViewModel> {
        match kind {
            ViewKind::Tree => self.tree_view(address).map(ViewModel::Tree),
            ViewKind::Blob => self.blob_view(address).map(ViewModel::Blob),
            ViewKind::Log(query) => self.log_view(address, query, cancel).map(ViewModel::Log),
            ViewKind::Diff { against } => self.diff_view(address, against).map(ViewModel::Diff),
            ViewKind::Blame => self.blame_view(address).map(ViewModel::Blame),
        }
    }

    pub fn tree_view(&self, address: &ResolvedAddress) -> Result<TreeView> {
        let repo = &address.repository;
        let mut entries = repo.get_tree(address.commit_id, &address.path)?;
        sort_entries(&mut entries);

        let readme = self.render_readme(address, &entries);

        Ok(TreeView {
            repo: repo.name.clone(),
            commit_id: address.commit_id.to_string(),
            path: address.path.clone(),
            entries,
            readme,
        })
    }

    pub fn blob_view(&self, address: &ResolvedAddress) -> Result<BlobView> {
        let repo = &address.repository;
        let blob = repo.get_blob(address.commit_id, &address.path)?;
        let is_binary = looks_binary(&blob.content);
        let language = language_for_path(&address.path);

        let (content, highlighted, markdown) = if is_binary {
            (None, None, None)
        } else {
            let text = String::from_utf8_lossy(&blob.content).into_owned();

            if blob.content.len() > self.settings.max_highlight_bytes {
                tracing::debug!(
                    "Skipping rendering for {} ({} bytes)",
                    address.path,
                    blob.content.len()
                );
                (Some(text), None, None)
            } else {
                let key = CacheKey::new(blob.object_id, RenderKind::Highlight(language.clone()));
                let highlighted = self
                    .cache
                    .get_or_render(key, || self.renderer.highlight(&text, &language))?;

                let markdown = if is_markdown(&language) {
                    let key = CacheKey::new(blob.object_id, RenderKind::Markdown);
                    let rendered = self
                        .cache
                        .get_or_render(key, || self.renderer.render_markdown(&text))?;
                    Some(rendered.to_string())
                } else {
                    None
                };

                (Some(text), Some(highlighted.to_string()), markdown)
            }
        };

        Ok(BlobView {
            repo: repo.name.clone(),
            commit_id: address.commit_id.to_string(),
            path: address.path.clone(),
            object_id: blob.object_id.to_string(),
            size: blob.content.len() as u64,
            is_binary,
            language,
            content,
            highlighted,
            markdown,
        })
    }

    pub fn log_view(
        &self,
        address: &ResolvedAddress,
        mut query: LogQuery,
        cancel: &Cancellation,
    ) -> Result<LogPage> {
        query.limit = query.limit.clamp(1, self.settings.max_page_size.max(1));
        address
            .repository
            .log_page(address.commit_id, &address.path, &query, cancel)
    }

    pub fn diff_view(&self, address: &ResolvedAddress, against: Option<Oid>) -> Result<DiffView> {
        let repo = &address.repository;
        let commit = repo.commit_summary(address.commit_id)?;

        let from = match against {
            Some(oid) => Some(oid),
            None => commit
                .parent_ids
                .first()
                .map(|id| Oid::from_str(id))
                .transpose()?,
        };

        let (files, stats) = repo.diff_trees(from, address.commit_id, &address.path)?;

        Ok(DiffView {
            repo: repo.name.clone(),
            from_commit: from.map(|oid| oid.to_string()),
            to_commit: address.commit_id.to_string(),
            commit,
            path: address.path.clone(),
            files,
            stats,
        })
    }

    pub fn blame_view(&self, address: &ResolvedAddress) -> Result<BlameView> {
        let repo = &address.repository;
        let blob = repo.get_blob(address.commit_id, &address.path)?;

        let lines = if looks_binary(&blob.content) {
            Vec::new()
        } else {
            repo.blame_file(address.commit_id, &address.path, &blob.content)?
        };

        Ok(BlameView {
            repo: repo.name.clone(),
            commit_id: address.commit_id.to_string(),
            path: address.path.clone(),
            lines,
        })
    }

    /// A README in the listing is rendered as markdown; failures only drop
    /// the README, never the listing. READMEs over the render limit are
    /// left out.
    fn render_readme(&self, address: &ResolvedAddress, entries: &[TreeEntry]) -> Option<RenderedReadme> {
        let entry = README_NAMES.iter().find_map(|wanted| {
            entries
                .iter()
                .find(|e| e.kind == EntryKind::Blob && e.name.eq_ignore_ascii_case(wanted))
        })?;

        if entry.size.is_none_or(|size| size > self.settings.max_highlight_bytes as u64) {
            return None;
        }

        let rendered: Result<Rendered> = Oid::from_str(&entry.object_id)
            .map_err(Into::into)
            .and_then(|object_id| {
                self.cache
                    .get_or_render(CacheKey::new(object_id, RenderKind::Markdown), || {
                        let blob = address.repository.get_blob(address.commit_id, &entry.path)?;
                        self.renderer
                            .render_markdown(&String::from_utf8_lossy(&blob.content))
                    })
            });

        match rendered {
            Ok(html) => Some(RenderedReadme {
                name: entry.name.clone(),
                html: html.to_string(),
            }),
            Err(e) => {
                tracing::warn!("Failed to render {} in {}: {}", entry.path, address.repo_name(), e);
                None
            }
        }
    }
}

/// Directories first, then everything else; byte-wise by name within each
/// group.
pub fn sort_entries(entries: &mut [TreeEntry]) {
    entries.sort_by(|a, b| {
        let a_dir = a.kind == EntryKind::Tree;
        let b_dir = b.kind == EntryKind::Tree;
        b_dir.cmp(&a_dir).then_with(|| a.name.as_bytes().cmp(b.name.as_bytes()))
    });
}

/// NUL in the sniffed prefix, or too many control bytes, means binary.
pub fn looks_binary(content: &[u8]) -> bool {
    let prefix = &content[..content.len().min(BINARY_SNIFF_LEN)];
    if prefix.is_empty() {
        return false;
    }
    if prefix.contains(&0) {
        return true;
    }

    let control = prefix
        .iter()
        .filter(|&&b| (b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r' | 0x0b | 0x0c | 0x1b)) || b == 0x7f)
        .count();

    control * 100 > prefix.len() * BINARY_CONTROL_PERCENT
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, kind: EntryKind) -> TreeEntry {
        TreeEntry {
            name: name.to_string(),
            path: name.to_string(),
            mode: if kind == EntryKind::Tree { 0o040000 } else { 0o100644 },
            object_id: "0".repeat(40),
            kind,
            size: None,
        }
    }

    #[test]
    fn directories_sort_before_files_then_bytewise() {
        let mut entries = vec![
            entry("b.txt", EntryKind::Blob),
            entry("src", EntryKind::Tree),
            entry("A.txt", EntryKind::Blob),
            entry("Docs", EntryKind::Tree),
            entry("a.txt", EntryKind::Blob),
            entry("vendor", EntryKind::Submodule),
        ];
        sort_entries(&mut entries);

        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Docs", "src", "A.txt", "a.txt", "b.txt", "vendor"]);
    }

    #[test]
    fn binary_detection() {
        assert!(!looks_binary(b""));
        assert!(!looks_binary(b"hello\nworld\r\n\ttabbed\n"));
        assert!(!looks_binary("héllo wörld\n".as_bytes()));
        assert!(looks_binary(b"PNG\x00\x01\x02"));
        assert!(looks_binary(&[0x01, 0x02, 0x03, b'a', 0x04, 0x05]));
    }

    #[test]
    fn nul_after_sniff_window_is_ignored() {
        let mut content = vec![b'a'; BINARY_SNIFF_LEN];
        content.push(0);
        assert!(!looks_binary(&content));
    }
}
