//! Symbol lookup.
//!
//! Lists where one symbol is declared and used, with the link targets the
//! rendered document would use for it. Used by `tagxref lookup`.

use anyhow::{bail, Result};
use serde::Serialize;

use crate::config::Config;
use crate::index::XrefIndex;
use crate::models::{FileTable, LinkTarget};
use crate::pipeline::load_index;
use crate::store::TagDatabase;

#[derive(Debug, Clone, Serialize)]
pub struct SymbolReport {
    pub symbol: String,
    /// Where usages of the symbol link to.
    pub definition_target: Option<LinkTarget>,
    /// Where the symbol's declarations link to.
    pub reference_target: Option<LinkTarget>,
    pub definitions: Vec<DefinitionSite>,
    pub references: Vec<ReferenceSite>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DefinitionSite {
    pub path: String,
    pub line: u32,
    pub text: String,
    pub anchor: LinkTarget,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReferenceSite {
    pub path: String,
    pub lines: Vec<u32>,
}

/// Collect everything the index knows about `symbol`.
pub fn lookup_symbol(index: &XrefIndex, files: &FileTable, symbol: &str) -> Option<SymbolReport> {
    let definitions: Vec<DefinitionSite> = index
        .definition_records(symbol)
        .map(|d| DefinitionSite {
            path: files.display_path(d.file),
            line: d.line,
            text: d.payload.clone(),
            anchor: LinkTarget::Line {
                file: d.file,
                line: d.line,
            },
        })
        .collect();
    let references: Vec<ReferenceSite> = index
        .reference_records(symbol)
        .map(|r| ReferenceSite {
            path: files.display_path(r.file),
            lines: r.lines.clone(),
        })
        .collect();

    if definitions.is_empty() && references.is_empty() {
        return None;
    }

    Some(SymbolReport {
        symbol: symbol.to_string(),
        definition_target: index.definitions_of(symbol),
        reference_target: index.references_of(symbol),
        definitions,
        references,
    })
}

fn join_lines(lines: &[u32]) -> String {
    lines
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// CLI entry point for `tagxref lookup`.
pub async fn run_lookup(config: &Config, symbol: &str, json: bool) -> Result<()> {
    let db = TagDatabase::open(config).await?;
    let files = db.file_table().await?;
    let index = load_index(&db).await?;

    let Some(report) = lookup_symbol(&index, &files, symbol) else {
        bail!("symbol not found: {}", symbol);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("--- {} ---", report.symbol);
    match &report.definition_target {
        Some(target) => println!("usages link to:       {}", target),
        None => println!("usages link to:       (no definition)"),
    }
    match &report.reference_target {
        Some(target) => println!("definitions link to:  {}", target),
        None => println!("definitions link to:  (no references)"),
    }
    println!();

    println!("--- Definitions ({}) ---", report.definitions.len());
    for def in &report.definitions {
        println!("{}:{}  [{}]", def.path, def.line, def.anchor);
        println!("    {}", def.text.trim());
    }
    println!();

    println!("--- References ({}) ---", report.references.len());
    for reference in &report.references {
        println!("{}:{}", reference.path, join_lines(&reference.lines));
    }

    Ok(())
}
