//! Render pipeline orchestration.
//!
//! Runs strictly in phases:
//!
//! 1. read the file table and decode every tag row into the index;
//! 2. read, highlight and annotate each file in turn;
//! 3. assemble the document and write it.
//!
//! Phase 1 must finish before phase 2 starts, since any file may use symbols
//! defined in any other. Any fatal decode or consistency error aborts the run
//! before the output file is touched.

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::annotate::{annotate_file, AnnotateOptions, AnnotationSummary};
use crate::config::Config;
use crate::highlight::{Highlighter, MintedHighlighter};
use crate::index::{IndexBuilder, XrefIndex};
use crate::models::FileTable;
use crate::payload::PayloadKind;
use crate::progress::{ProgressEvent, ProgressMode, ProgressReporter};
use crate::render::{render_document, RenderedFile};
use crate::store::TagDatabase;

/// Totals over one annotation phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub rendered: usize,
    pub excluded: usize,
    pub unreadable: usize,
    pub unsupported: usize,
    pub lines: AnnotationSummary,
}

impl TreeStats {
    fn add(&mut self, summary: AnnotationSummary) {
        self.lines.anchored_lines += summary.anchored_lines;
        self.lines.escaped_lines += summary.escaped_lines;
        self.lines.usage_links += summary.usage_links;
        self.lines.definition_links += summary.definition_links;
    }

    pub fn skipped(&self) -> usize {
        self.excluded + self.unreadable + self.unsupported
    }
}

/// Decode every definition and reference row into an index.
pub async fn load_index(db: &TagDatabase) -> Result<XrefIndex> {
    let mut builder = IndexBuilder::new();

    let stores = [
        (PayloadKind::Definition, &db.definitions, "definition"),
        (PayloadKind::Reference, &db.references, "reference"),
    ];
    for (kind, store, label) in stores {
        let rows = store
            .rows()
            .await
            .with_context(|| format!("Failed to read {} store", label))?;
        for row in &rows {
            let skipped = builder
                .push_row(kind, &row.key, &row.dat)
                .with_context(|| format!("Failed to decode {} row '{}'", label, row.key))?;
            if let Some(reason) = skipped {
                debug!(key = %row.key, ?reason, "skipping {} row", label);
            }
        }
    }

    let index = builder.finish();
    info!(
        definitions = index.definition_count(),
        references = index.reference_count(),
        skipped = index.skipped_rows(),
        "index built"
    );
    Ok(index)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

fn relative(path: &str) -> &str {
    path.trim_start_matches("./")
}

/// Read, highlight and annotate every file of the table.
///
/// Files that are excluded, unreadable, or have no lexer are skipped with a
/// warning. Annotation errors are fatal.
pub fn annotate_tree(
    config: &Config,
    files: &FileTable,
    index: &XrefIndex,
    highlighter: &dyn Highlighter,
    options: AnnotateOptions,
    reporter: &dyn ProgressReporter,
) -> Result<(Vec<RenderedFile>, TreeStats)> {
    let excludes = build_globset(&config.source.exclude_globs)?;
    if files.is_empty() {
        warn!("path store lists no source files");
    }
    let mut stats = TreeStats::default();
    let mut rendered = Vec::new();
    let total = files.len() as u64;

    for (n, file) in files.files().iter().enumerate() {
        reporter.report(ProgressEvent::Annotating {
            path: file.path.clone(),
            n: n as u64 + 1,
            total,
        });

        let rel = relative(&file.path);
        if excludes.is_match(rel) {
            debug!(path = %file.path, "excluded");
            stats.excluded += 1;
            continue;
        }

        let full = config.source.root.join(rel);
        let text = match std::fs::read(&full) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                warn!(path = %full.display(), error = %e, "cannot read source file, skipping");
                stats.unreadable += 1;
                continue;
            }
        };

        let Some(mut lines) = highlighter.highlight(&file.path, &text) else {
            debug!(path = %file.path, "no lexer for file, skipping");
            stats.unsupported += 1;
            continue;
        };

        let summary = annotate_file(index, file.id, &mut lines, options).map_err(|e| {
            let hint = if e.is_consistency() {
                " (tags may be out of date, re-run `gtags --sqlite3`)"
            } else {
                ""
            };
            anyhow::Error::new(e).context(format!("Failed to annotate {}{}", file.path, hint))
        })?;
        debug!(
            path = %file.path,
            anchored = summary.anchored_lines,
            usage_links = summary.usage_links,
            definition_links = summary.definition_links,
            "annotated"
        );
        stats.add(summary);
        stats.rendered += 1;

        rendered.push(RenderedFile {
            path: file.path.clone(),
            lines,
        });
    }

    Ok((rendered, stats))
}

fn write_output(path: &Path, document: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, document)
        .with_context(|| format!("Failed to write output: {}", path.display()))
}

/// CLI entry point for `tagxref render`.
pub async fn run_render(
    config: &Config,
    output: Option<PathBuf>,
    reverse_links: Option<bool>,
    progress: ProgressMode,
) -> Result<()> {
    let reporter = progress.reporter();
    let db = TagDatabase::open(config).await?;

    let files = db.file_table().await?;
    let index = load_index(&db).await?;
    reporter.report(ProgressEvent::Indexed {
        rows: (index.definition_count() + index.reference_count() + index.skipped_rows()) as u64,
        symbols: index.defined_symbol_count() as u64,
    });

    let options = AnnotateOptions {
        reverse_links: reverse_links.unwrap_or(config.output.reverse_links),
    };
    let highlighter = MintedHighlighter::new(&config.languages);
    let (rendered, stats) =
        annotate_tree(config, &files, &index, &highlighter, options, reporter.as_ref())?;

    let document = render_document(
        &config.title(),
        rendered,
        &index,
        &files,
        &highlighter,
        options.reverse_links,
    );

    let output = output.unwrap_or_else(|| config.output.path.clone());
    reporter.report(ProgressEvent::Writing {
        path: output.display().to_string(),
    });
    write_output(&output, &document)?;

    println!("render {}", output.display());
    println!(
        "  files: {} rendered, {} skipped",
        stats.rendered,
        stats.skipped()
    );
    println!(
        "  definitions: {} ({} symbols)",
        index.definition_count(),
        index.defined_symbol_count()
    );
    println!(
        "  references: {} records, {} usage lines",
        index.reference_count(),
        index.usage_line_count()
    );
    println!(
        "  links: {} to definitions, {} to references",
        stats.lines.usage_links, stats.lines.definition_links
    );
    println!("ok");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use crate::store::{MemoryTagStore, TagRow};
    use tempfile::TempDir;

    fn fixture_db() -> TagDatabase {
        TagDatabase {
            paths: Box::new(MemoryTagStore::new(vec![
                TagRow::new(" __.VERSION", " __.VERSION 2", None),
                TagRow::new("./run.c", "1", None),
                TagRow::new("./main.c", "2", None),
                TagRow::new("./notes.txt", "3", None),
                TagRow::new("./vendor/x.c", "4", None),
            ])),
            definitions: Box::new(MemoryTagStore::new(vec![
                TagRow::new(" __.COMPRESS", " __.COMPRESS ddefine ttypedef", None),
                TagRow::new("run", "1 @n 3 int @n(void)", Some("1")),
            ])),
            references: Box::new(MemoryTagStore::new(vec![TagRow::new(
                "run",
                "2 @n 5,4",
                Some("2"),
            )])),
        }
    }

    fn write_tree(root: &Path) {
        std::fs::write(root.join("run.c"), "#include \"run.h\"\n\nint run(void)\n{\n}\n").unwrap();
        std::fs::write(
            root.join("main.c"),
            "int main(void)\n{\n\tint rc;\n\t/* run_it */\n\trc = run();\n\n\n\n\treturn run();\n}\n",
        )
        .unwrap();
        std::fs::write(root.join("notes.txt"), "not code").unwrap();
    }

    fn config_for(root: &Path) -> Config {
        let mut config = Config::minimal();
        config.source.root = root.to_path_buf();
        config.source.exclude_globs = vec!["vendor/**".to_string()];
        config
    }

    #[tokio::test]
    async fn index_from_stores() {
        let index = load_index(&fixture_db()).await.unwrap();
        assert_eq!(index.definition_count(), 1);
        assert_eq!(index.reference_count(), 1);
        assert_eq!(index.skipped_rows(), 1);
    }

    #[tokio::test]
    async fn annotates_tree_and_skips_the_rest() {
        let tmp = TempDir::new().unwrap();
        write_tree(tmp.path());
        let config = config_for(tmp.path());
        let db = fixture_db();
        let files = db.file_table().await.unwrap();
        let index = load_index(&db).await.unwrap();
        let highlighter = MintedHighlighter::new(&config.languages);

        let (rendered, stats) = annotate_tree(
            &config,
            &files,
            &index,
            &highlighter,
            AnnotateOptions::default(),
            &NoProgress,
        )
        .unwrap();

        assert_eq!(stats.rendered, 2);
        assert_eq!(stats.unsupported, 1);
        assert_eq!(stats.excluded, 1);
        assert_eq!(stats.lines.usage_links, 2);
        assert_eq!(stats.lines.definition_links, 1);

        let main = rendered.iter().find(|f| f.path == "./main.c").unwrap();
        assert_eq!(main.lines[5], "@\\hypertarget{2x5}{}@\trc = run@\\hyperlink{1x3}{$^D$}@();");
        assert_eq!(main.lines[4], "\t/* run@\\_@it */");
    }

    #[test]
    fn empty_file_table_renders_nothing() {
        let config = Config::minimal();
        let index = IndexBuilder::new().finish();
        let highlighter = MintedHighlighter::new(&config.languages);
        let (rendered, stats) = annotate_tree(
            &config,
            &FileTable::default(),
            &index,
            &highlighter,
            AnnotateOptions::default(),
            &NoProgress,
        )
        .unwrap();
        assert!(rendered.is_empty());
        assert_eq!(stats, TreeStats::default());
    }

    #[tokio::test]
    async fn consistency_errors_abort() {
        let tmp = TempDir::new().unwrap();
        write_tree(tmp.path());
        std::fs::write(tmp.path().join("main.c"), "int main(void)\n{\n}\n").unwrap();
        let config = config_for(tmp.path());
        let db = fixture_db();
        let files = db.file_table().await.unwrap();
        let index = load_index(&db).await.unwrap();
        let highlighter = MintedHighlighter::new(&config.languages);

        let err = annotate_tree(
            &config,
            &files,
            &index,
            &highlighter,
            AnnotateOptions::default(),
            &NoProgress,
        )
        .unwrap_err();
        assert!(err.to_string().contains("./main.c"));
    }
}
