//! Core data models used throughout tagxref.
//!
//! These types represent the files, definitions, and references decoded from
//! the tag database and the link targets the annotation engine writes.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Numeric identifier of a source file, as assigned by the indexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct FileId(pub u32);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of the path store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    pub path: String,
    pub id: FileId,
}

/// The path store, in store order, with lookup by id.
#[derive(Debug, Clone, Default)]
pub struct FileTable {
    files: Vec<SourceFile>,
    by_id: HashMap<FileId, usize>,
}

impl FileTable {
    pub fn new(files: Vec<SourceFile>) -> Self {
        let by_id = files.iter().enumerate().map(|(i, f)| (f.id, i)).collect();
        Self { files, by_id }
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn path_of(&self, id: FileId) -> Option<&str> {
        self.by_id.get(&id).map(|&i| self.files[i].path.as_str())
    }

    /// Path for display; files missing from the table show as `#id`.
    pub fn display_path(&self, id: FileId) -> String {
        self.path_of(id)
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{}", id))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// A declaration site: one file, one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefinitionRecord {
    pub file: FileId,
    pub symbol: String,
    pub line: u32,
    /// Source text of the declaration as stored by the indexer.
    pub payload: String,
}

/// All usage lines of one symbol within one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceRecord {
    pub file: FileId,
    pub symbol: String,
    /// Strictly ascending.
    pub lines: Vec<u32>,
}

/// Where a link inserted by the engine points.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LinkTarget {
    /// A single source line anchor.
    Line { file: FileId, line: u32 },
    /// The grouped page listing every definition of a symbol.
    DefinitionPage(String),
    /// The grouped page listing every usage of a symbol.
    ReferencePage(String),
}

impl fmt::Display for LinkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkTarget::Line { file, line } => write!(f, "{}x{}", file, line),
            LinkTarget::DefinitionPage(symbol) => write!(f, "defpage{}", symbol),
            LinkTarget::ReferencePage(symbol) => write!(f, "revpage{}", symbol),
        }
    }
}

impl Serialize for LinkTarget {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_target_names() {
        let line = LinkTarget::Line {
            file: FileId(4),
            line: 12,
        };
        assert_eq!(line.to_string(), "4x12");
        assert_eq!(
            LinkTarget::DefinitionPage("run".into()).to_string(),
            "defpagerun"
        );
        assert_eq!(
            LinkTarget::ReferencePage("run".into()).to_string(),
            "revpagerun"
        );
    }

    #[test]
    fn file_table_lookup() {
        let table = FileTable::new(vec![
            SourceFile {
                path: "./src/main.c".into(),
                id: FileId(1),
            },
            SourceFile {
                path: "./src/util.c".into(),
                id: FileId(2),
            },
        ]);
        assert_eq!(table.path_of(FileId(2)), Some("./src/util.c"));
        assert_eq!(table.display_path(FileId(5)), "#5");
        assert_eq!(table.len(), 2);
    }
}
