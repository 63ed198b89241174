//! Annotation engine: inserts cross-reference links into highlighted lines.
//!
//! A file's line list starts and ends with a wrapper line from the
//! highlighter; list index `i` in between is source line `i`, numbered from 1
//! exactly as the indexer numbers them.
//!
//! Each pass over a file does three things, in order:
//!
//! 1. Every source line the index knows about gets a line anchor so links can
//!    target it. Every other line is escape-only: its typesetting
//!    metacharacters are escaped and it receives nothing else.
//! 2. At each usage line, every whole-token occurrence of the symbol gets a
//!    link to its definition.
//! 3. At each declaration line, the leftmost whole-token occurrence gets a
//!    link to the symbol's usages.
//!
//! Inserted text is always wrapped in `@` sentinels. Occurrences inside an
//! existing sentinel span, or already carrying the marker being placed, are
//! left alone, so running a linking pass twice changes nothing.
//!
//! Token boundaries follow C-family identifier rules (alphanumerics and `_`).
//! Languages with other identifier characters, such as hyphenated names, can
//! produce missed or partial matches.

use crate::barrier::{barriers, carries_marker, is_protected};
use crate::error::{XrefError, XrefResult};
use crate::index::XrefIndex;
use crate::models::{FileId, LinkTarget};

/// Behaviour switches for one annotation pass.
#[derive(Debug, Clone, Copy)]
pub struct AnnotateOptions {
    /// Link declaration sites back to their usages.
    pub reverse_links: bool,
}

impl Default for AnnotateOptions {
    fn default() -> Self {
        Self {
            reverse_links: true,
        }
    }
}

/// What a pass over one file did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnotationSummary {
    pub anchored_lines: usize,
    pub escaped_lines: usize,
    pub usage_links: usize,
    pub definition_links: usize,
}

/// Outcome of placing a link at a declaration line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionSite {
    Linked,
    /// The leftmost candidate is inside a span or already carries the marker.
    AlreadyMarked,
    /// No occurrence passes the boundary test.
    NoBoundary,
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// True if `line[start..end]` is a whole identifier rather than part of one.
///
/// A match ending exactly at the end of the line always has a valid
/// trailing boundary.
pub fn is_whole_token(line: &str, start: usize, end: usize) -> bool {
    let before = line[..start].chars().next_back();
    let after = line[end..].chars().next();
    !before.is_some_and(is_ident_char) && !after.is_some_and(is_ident_char)
}

/// Start offsets of every whole-token occurrence of `symbol`, left to right.
pub fn whole_token_occurrences(line: &str, symbol: &str) -> Vec<usize> {
    let mut found = Vec::new();
    if symbol.is_empty() {
        return found;
    }
    let mut cursor = 0;
    while let Some(rel) = line[cursor..].find(symbol) {
        let start = cursor + rel;
        let end = start + symbol.len();
        if is_whole_token(line, start, end) {
            found.push(start);
        }
        cursor = end;
    }
    found
}

/// `@\hyperlink{target}{$^D$}@`, placed after a usage.
pub fn definition_link(target: &LinkTarget) -> String {
    format!("@\\hyperlink{{{}}}{{$^D$}}@", target)
}

/// `@\hyperlink{target}{$^R$}@`, placed after a declaration.
pub fn reference_link(target: &LinkTarget) -> String {
    format!("@\\hyperlink{{{}}}{{$^R$}}@", target)
}

/// `@\hypertarget{FxL}{}@`, prepended to a link-target eligible line.
pub fn line_anchor(file: FileId, line: u32) -> String {
    format!("@\\hypertarget{{{}}}{{}}@", LinkTarget::Line { file, line })
}

/// Escape the characters of an escape-only line that collide with the
/// typesetting syntax.
pub fn escape_line(line: &str) -> String {
    line.replace('\\', "\\\\")
        .replace('_', "@\\_@")
        .replace('$', "\\$")
}

/// Append `marker` after every unmarked whole-token occurrence of `symbol`.
///
/// Returns the number of markers inserted, or `None` if `symbol` does not
/// occur on the line at all.
pub fn link_usages(line: &mut String, symbol: &str, marker: &str) -> Option<usize> {
    if symbol.is_empty() || !line.contains(symbol) {
        return None;
    }

    let mut inserted = 0;
    let mut cursor = 0;
    while let Some(rel) = line[cursor..].find(symbol) {
        let start = cursor + rel;
        let end = start + symbol.len();
        cursor = end;

        if !is_whole_token(line, start, end) {
            continue;
        }
        let spans = barriers(line);
        if is_protected(&spans, start) || carries_marker(line, end, marker) {
            continue;
        }

        line.insert_str(end, marker);
        cursor = end + marker.len();
        inserted += 1;
    }
    Some(inserted)
}

/// Append `marker` after the leftmost whole-token occurrence.
///
/// Only the leftmost occurrence is considered. If it is protected or already
/// carries `marker`, the line is left as it is.
pub fn link_definition(line: &mut String, symbol: &str, marker: &str) -> DefinitionSite {
    let Some(&start) = whole_token_occurrences(line, symbol).first() else {
        return DefinitionSite::NoBoundary;
    };

    let end = start + symbol.len();
    if is_protected(&barriers(line), start) || carries_marker(line, end, marker) {
        return DefinitionSite::AlreadyMarked;
    }
    line.insert_str(end, marker);
    DefinitionSite::Linked
}

fn source_line(lines: &mut [String], file: FileId, line: u32) -> XrefResult<&mut String> {
    let available = lines.len().saturating_sub(2);
    let idx = line as usize;
    if idx == 0 || idx > available {
        return Err(XrefError::LineOutOfRange {
            file,
            line,
            available,
        });
    }
    Ok(&mut lines[idx])
}

/// Annotate one file's highlighted line list in place.
pub fn annotate_file(
    index: &XrefIndex,
    file: FileId,
    lines: &mut [String],
    options: AnnotateOptions,
) -> XrefResult<AnnotationSummary> {
    let mut summary = AnnotationSummary::default();
    if lines.len() < 2 {
        return Ok(summary);
    }

    let known = index.lines_in(file);
    let last = lines.len() - 1;
    for (i, text) in lines.iter_mut().enumerate().take(last).skip(1) {
        let line_no = i as u32;
        if known.is_some_and(|set| set.contains(&line_no)) {
            let anchor = line_anchor(file, line_no);
            if !text.starts_with(&anchor) {
                text.insert_str(0, &anchor);
            }
            summary.anchored_lines += 1;
        } else {
            *text = escape_line(text);
            summary.escaped_lines += 1;
        }
    }

    for rev in index.references_in(file) {
        let Some(target) = index.definitions_of(&rev.symbol) else {
            continue;
        };
        let marker = definition_link(&target);
        for &line_no in &rev.lines {
            let text = source_line(lines, file, line_no)?;
            match link_usages(text, &rev.symbol, &marker) {
                Some(n) => summary.usage_links += n,
                None => {
                    return Err(XrefError::MissingUsage {
                        symbol: rev.symbol.clone(),
                        file,
                        line: line_no,
                    })
                }
            }
        }
    }

    if options.reverse_links {
        for def in index.definitions_in(file) {
            let Some(target) = index.references_of(&def.symbol) else {
                continue;
            };
            let marker = reference_link(&target);
            let text = source_line(lines, file, def.line)?;
            match link_definition(text, &def.symbol, &marker) {
                DefinitionSite::Linked => summary.definition_links += 1,
                DefinitionSite::AlreadyMarked => {}
                DefinitionSite::NoBoundary => {
                    return Err(XrefError::HeuristicFailure {
                        symbol: def.symbol.clone(),
                        file,
                        line: def.line,
                    })
                }
            }
        }
    }

    Ok(summary)
}
