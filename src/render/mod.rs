//! Text rendering: syntax highlighting, markdown, and the render cache.
//!
//! The view builder only talks to `TextRenderer`; `HtmlRenderer` is the
//! production implementation.

pub mod cache;
pub mod highlight;
pub mod markdown;

pub use cache::{CacheKey, CacheStats, RenderCache, RenderKind, Rendered};
pub use highlight::Highlighter;

use crate::error::Result;

pub trait TextRenderer: Send + Sync {
    fn highlight(&self, source: &str, language: &str) -> Result<String>;

    /// Must escape untrusted content; output may not execute script.
    fn render_markdown(&self, source: &str) -> Result<String>;
}

#[derive(Default)]
pub struct HtmlRenderer {
    highlighter: Highlighter,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TextRenderer for HtmlRenderer {
    fn highlight(&self, source: &str, language: &str) -> Result<String> {
        self.highlighter.highlight(source, language)
    }

    fn render_markdown(&self, source: &str) -> Result<String> {
        Ok(markdown::render_markdown(source))
    }
}

/// Language hint for a path: lowercased extension, a few well-known
/// extensionless file names, else `txt`.
pub fn language_for_path(path: &str) -> String {
    let file_name = path.rsplit('/').next().unwrap_or(path);

    match file_name {
        "Makefile" | "makefile" | "GNUmakefile" => return "makefile".to_string(),
        "Dockerfile" => return "dockerfile".to_string(),
        "CMakeLists.txt" => return "cmake".to_string(),
        _ => {}
    }

    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext.to_ascii_lowercase(),
        _ => "txt".to_string(),
    }
}

pub fn is_markdown(language: &str) -> bool {
    matches!(language, "md" | "markdown" | "mdown" | "mkd")
}
