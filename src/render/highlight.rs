//! Syntax highlighting via syntect, emitting class-based HTML spans so the
//! presentation layer picks the theme.

use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::error::{AppError, Result};

pub struct Highlighter {
    syntaxes: SyntaxSet,
}

impl Highlighter {
    /// Loads the bundled syntax definitions; do this once per process.
    pub fn new() -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
        }
    }

    /// HTML for `source`. Unknown language hints fall back to plain text,
    /// which still escapes the content.
    pub fn highlight(&self, source: &str, language: &str) -> Result<String> {
        let syntax = self
            .syntaxes
            .find_syntax_by_token(language)
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text());

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntaxes, ClassStyle::Spaced);
        for line in LinesWithEndings::from(source) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .map_err(|e| AppError::Internal(format!("Highlighting failed: {}", e)))?;
        }

        Ok(generator.finalize())
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_in_source() {
        let highlighter = Highlighter::new();
        let html = highlighter
            .highlight("<script>alert(1)</script>\n", "txt")
            .unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn known_language_gets_token_classes() {
        let highlighter = Highlighter::new();
        let html = highlighter.highlight("fn main() {}\n", "rs").unwrap();
        assert!(html.contains("<span class="));
        assert!(html.contains("main"));
    }
}
