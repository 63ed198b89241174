//! Tag database statistics.
//!
//! Gives a quick summary of what the indexer recorded: file count, definition
//! and reference counts, how many symbols get a grouped page, and how many
//! rows the decoder skipped. Used by `tagxref stats` to check a tag directory
//! before a full render.

use anyhow::Result;
use serde::Serialize;
use std::path::Path;

use crate::config::Config;
use crate::index::XrefIndex;
use crate::models::FileTable;
use crate::pipeline::load_index;
use crate::store::TagDatabase;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub files: usize,
    pub definitions: usize,
    pub defined_symbols: usize,
    pub references: usize,
    pub referenced_symbols: usize,
    pub usage_lines: usize,
    pub definition_groups: usize,
    pub reference_groups: usize,
    pub skipped_rows: usize,
}

impl IndexStats {
    pub fn collect(files: &FileTable, index: &XrefIndex) -> Self {
        Self {
            files: files.len(),
            definitions: index.definition_count(),
            defined_symbols: index.defined_symbol_count(),
            references: index.reference_count(),
            referenced_symbols: index.referenced_symbol_count(),
            usage_lines: index.usage_line_count(),
            definition_groups: index.definition_groups().count(),
            reference_groups: index.reference_groups().count(),
            skipped_rows: index.skipped_rows(),
        }
    }
}

/// Run the stats command: load the index and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let db = TagDatabase::open(config).await?;
    let files = db.file_table().await?;
    let index = load_index(&db).await?;
    let stats = IndexStats::collect(&files, &index);

    println!("tagxref stats");
    println!("=============");
    println!();
    println!("  Tags:        {}", config.tags.dir.display());
    for path in [
        config.tags.path_db(),
        config.tags.definition_db(),
        config.tags.reference_db(),
    ] {
        println!(
            "    {:<10} {}",
            file_name(&path),
            format_bytes(std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0))
        );
    }
    println!();
    println!("  Files:       {}", stats.files);
    println!(
        "  Definitions: {} ({} symbols, {} grouped)",
        stats.definitions, stats.defined_symbols, stats.definition_groups
    );
    println!(
        "  References:  {} ({} symbols, {} grouped)",
        stats.references, stats.referenced_symbols, stats.reference_groups
    );
    println!("  Usage lines: {}", stats.usage_lines);
    println!("  Skipped:     {} rows", stats.skipped_rows);
    println!();

    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexBuilder;
    use crate::models::{DefinitionRecord, FileId, ReferenceRecord, SourceFile};

    #[test]
    fn counts_groups_and_lines() {
        let mut builder = IndexBuilder::new();
        for (file, line) in [(1, 3), (2, 8)] {
            builder.push_definition(DefinitionRecord {
                file: FileId(file),
                symbol: "init".into(),
                line,
                payload: "void init(void)".into(),
            });
        }
        builder.push_definition(DefinitionRecord {
            file: FileId(1),
            symbol: "run".into(),
            line: 10,
            payload: "int run(void)".into(),
        });
        builder.push_reference(ReferenceRecord {
            file: FileId(2),
            symbol: "run".into(),
            lines: vec![4],
        });
        builder.push_reference(ReferenceRecord {
            file: FileId(2),
            symbol: "init".into(),
            lines: vec![1, 2],
        });
        let files = FileTable::new(vec![
            SourceFile {
                path: "./a.c".into(),
                id: FileId(1),
            },
            SourceFile {
                path: "./b.c".into(),
                id: FileId(2),
            },
        ]);

        let stats = IndexStats::collect(&files, &builder.finish());
        assert_eq!(stats.files, 2);
        assert_eq!(stats.definitions, 3);
        assert_eq!(stats.defined_symbols, 2);
        assert_eq!(stats.definition_groups, 1);
        assert_eq!(stats.references, 2);
        assert_eq!(stats.usage_lines, 3);
        assert_eq!(stats.reference_groups, 1);
        assert_eq!(stats.skipped_rows, 0);
    }

    #[test]
    fn byte_sizes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
