//! LaTeX document assembly.
//!
//! Takes the annotated line lists and the index's symbol groups and produces
//! one standalone document:
//!
//! - `Source Files`: one subsection per file, its lines inside `minted`;
//! - `Section Definition References`: a page per symbol with several
//!   definitions, each row linking to one declaration line;
//! - `Section Reverse References` (optional): a page per symbol with several
//!   usage sites, each row listing the usage lines of one file.

use crate::highlight::Highlighter;
use crate::index::XrefIndex;
use crate::models::{DefinitionRecord, FileTable, LinkTarget, ReferenceRecord};

/// Running width past which a location list wraps to a new row.
const LOCATIONS_WIDTH: usize = 60;

/// One file, ready to be typeset.
#[derive(Debug, Clone)]
pub struct RenderedFile {
    pub path: String,
    pub lines: Vec<String>,
}

pub fn latex_escape(text: &str) -> String {
    text.replace('_', "\\_")
}

/// Closest to the root first, then alphabetical.
fn depth_order(path: &str) -> (usize, &str) {
    (path.matches('/').count(), path)
}

fn fix_braces(code: &str) -> String {
    code.replace('{', "@$\\lbrace$@")
        .replace('}', "@$\\rbrace$@")
}

fn page(symbol: &str, link: &LinkTarget, body: &str) -> String {
    format!(
        "{{\\Huge \\verb|{}|}} \\hypertarget{{{}}}{{}}\n\\newline\n\\vskip 1em\n{}\n\\vskip 1em\n",
        symbol, link, body
    )
}

fn table(env: &str, columns: &str, rows: &[String]) -> String {
    let rows: Vec<String> = rows.iter().map(|r| format!("{}\\\\", r)).collect();
    format!(
        "\\begin{{{env}}}{{{columns}}}\n{}\n\\end{{{env}}}",
        rows.join("\n"),
        env = env,
        columns = columns
    )
}

/// Page listing every declaration of `symbol`.
pub fn definition_page(
    symbol: &str,
    definitions: &[&DefinitionRecord],
    files: &FileTable,
    highlighter: &dyn Highlighter,
) -> String {
    let mut sorted: Vec<(String, &DefinitionRecord)> = definitions
        .iter()
        .map(|d| (files.display_path(d.file), *d))
        .collect();
    sorted.sort_by(|a, b| depth_order(&a.0).cmp(&depth_order(&b.0)));

    let rows: Vec<String> = sorted
        .iter()
        .map(|(path, def)| {
            let link = LinkTarget::Line {
                file: def.file,
                line: def.line,
            };
            let code = highlighter
                .highlight_inline(path, &fix_braces(&def.payload))
                .unwrap_or_default();
            format!(
                "\\verb|{}|\\hyperlink{{{}}}{{$^D$}} & \\verb|{}:{}| & {{\\footnotesize {}}}",
                def.symbol, link, path, def.line, code
            )
        })
        .collect();

    page(
        symbol,
        &LinkTarget::DefinitionPage(symbol.to_string()),
        &table("tabular", "ccc", &rows),
    )
}

/// Split one file's usage links into chunks no wider than the page allows.
fn location_runs(path: &str, reference: &ReferenceRecord) -> Vec<String> {
    let mut runs = Vec::new();
    let mut current = String::new();
    let mut width = path.len();

    for &line in &reference.lines {
        let link = LinkTarget::Line {
            file: reference.file,
            line,
        };
        current.push_str(&format!(":{}\\hyperlink{{{}}}{{$^R$}}", line, link));
        width += line.to_string().len() + 1;
        if width > LOCATIONS_WIDTH {
            width = 0;
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Page listing every usage site of `symbol`, grouped by file.
pub fn reference_page(symbol: &str, references: &[&ReferenceRecord], files: &FileTable) -> String {
    let mut sorted: Vec<(String, &ReferenceRecord)> = references
        .iter()
        .map(|r| (files.display_path(r.file), *r))
        .collect();
    sorted.sort_by(|a, b| depth_order(&a.0).cmp(&depth_order(&b.0)));

    let mut rows = Vec::new();
    for (path, reference) in &sorted {
        for (i, run) in location_runs(path, reference).into_iter().enumerate() {
            if i == 0 {
                rows.push(format!(
                    "\\verb|{}| & \\verb|{}|{}",
                    reference.symbol, path, run
                ));
            } else {
                rows.push(format!(" & {}", run));
            }
        }
    }

    page(
        symbol,
        &LinkTarget::ReferencePage(symbol.to_string()),
        &table("xtabular", "cl", &rows),
    )
}

/// Assemble the full document.
pub fn render_document(
    title: &str,
    mut rendered: Vec<RenderedFile>,
    index: &XrefIndex,
    files: &FileTable,
    highlighter: &dyn Highlighter,
    reverse_links: bool,
) -> String {
    rendered.sort_by(|a, b| a.path.cmp(&b.path));

    let mut sections = vec!["\\section{Source Files}".to_string()];
    for file in &rendered {
        sections.push(format!(
            "\\subsection{{\\texttt{{{}}}}}\n{}",
            latex_escape(&file.path),
            file.lines.join("\n")
        ));
    }

    sections.push("\\section{Section Definition References}".to_string());
    for (symbol, definitions) in index.definition_groups() {
        sections.push(definition_page(symbol, &definitions, files, highlighter));
    }

    if reverse_links {
        sections.push("\\section{Section Reverse References}".to_string());
        for (symbol, references) in index.reference_groups() {
            sections.push(reference_page(symbol, &references, files));
        }
    }

    format!(
        r#"\documentclass{{article}}
\usepackage{{fontawesome}}
\usepackage{{minted}}
\usepackage{{hyperref}}
\usepackage{{xtab}}
\usepackage[margin=0.5in]{{geometry}}

\hypersetup {{
  colorlinks=true,
  urlcolor=cyan,
}}

\title{{\texttt{{{}}}}}
\author{{Generated by tagxref}}
\date{{\today}}

\begin{{document}}
\maketitle
\tableofcontents
{}
\end{{document}}
"#,
        latex_escape(title),
        sections.join("\n")
    )
}
