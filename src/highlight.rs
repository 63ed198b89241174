//! Highlighting pass: turns source text into the line list the annotation
//! engine works on.
//!
//! The minted backend leaves highlighting itself to LaTeX. It only wraps the
//! text in a `minted` environment with `@` as the escape delimiter, so that
//! inserted `@...@` spans reach the typesetter as raw LaTeX.

use std::collections::BTreeMap;
use std::path::Path;

/// Produces per-line renderings of a source file.
pub trait Highlighter {
    /// Wrap `text` as a line list: one opening wrapper line, the source
    /// lines (list index `i` is source line `i`), one closing wrapper line.
    ///
    /// Returns `None` for files the highlighter has no language for.
    fn highlight(&self, path: &str, text: &str) -> Option<Vec<String>>;

    /// Render a single code snippet inline, for group pages.
    fn highlight_inline(&self, path: &str, code: &str) -> Option<String>;
}

pub struct MintedHighlighter {
    lexers: BTreeMap<String, String>,
}

impl MintedHighlighter {
    /// Build from an extension → lexer map. Extensions may or may not include
    /// the leading dot.
    pub fn new(languages: &BTreeMap<String, String>) -> Self {
        let lexers = languages
            .iter()
            .map(|(ext, lexer)| (ext.trim_start_matches('.').to_string(), lexer.clone()))
            .collect();
        Self { lexers }
    }

    pub fn lexer_for(&self, path: &str) -> Option<&str> {
        let ext = Path::new(path).extension()?.to_str()?;
        self.lexers.get(ext).map(String::as_str)
    }
}

impl Highlighter for MintedHighlighter {
    fn highlight(&self, path: &str, text: &str) -> Option<Vec<String>> {
        let lexer = self.lexer_for(path)?;
        let mut lines = Vec::with_capacity(text.lines().count() + 2);
        lines.push(format!(
            "\\begin{{minted}}[escapeinside=@@, linenos]{{{}}}",
            lexer
        ));
        lines.extend(text.lines().map(str::to_string));
        lines.push("\\end{minted}".to_string());
        Some(lines)
    }

    fn highlight_inline(&self, path: &str, code: &str) -> Option<String> {
        let lexer = self.lexer_for(path)?;
        Some(format!(
            "\\mintinline[escapeinside=@@]{{{}}}{{{}}}",
            lexer, code
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn highlighter() -> MintedHighlighter {
        MintedHighlighter::new(&Config::minimal().languages)
    }

    #[test]
    fn wraps_source_lines() {
        let lines = highlighter()
            .highlight("./src/a.c", "int a;\r\nint b;\n")
            .unwrap();
        assert_eq!(
            lines,
            vec![
                "\\begin{minted}[escapeinside=@@, linenos]{c}",
                "int a;",
                "int b;",
                "\\end{minted}",
            ]
        );
    }

    #[test]
    fn line_numbers_align_with_list_indices() {
        let text = "one\ntwo\n\nfour";
        let lines = highlighter().highlight("x.py", text).unwrap();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[2], "two");
        assert_eq!(lines[4], "four");
    }

    #[test]
    fn unknown_extension() {
        assert!(highlighter().highlight("README.md", "# hi").is_none());
        assert!(highlighter().highlight("Makefile", "all:").is_none());
    }

    #[test]
    fn inline_snippet() {
        assert_eq!(
            highlighter().highlight_inline("lib/q.hpp", "int f();").unwrap(),
            "\\mintinline[escapeinside=@@]{c++}{int f();}"
        );
    }
}
