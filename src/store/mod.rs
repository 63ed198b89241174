//! Read access to the indexer's key/value tag stores.
//!
//! The [`TagStore`] trait is the only thing the pipeline knows about storage,
//! so the sqlite databases written by `gtags --sqlite3` and the in-memory
//! fixtures used in tests are interchangeable.
//!
//! Each store is a table of `(key, dat, extra)` rows:
//!
//! | Store | key | dat | extra |
//! |-------|-----|-----|-------|
//! | `GPATH` | file path | file id | |
//! | `GTAGS` | symbol | compressed definition | file id |
//! | `GRTAGS` | symbol | compressed line list | file id |

pub mod memory;
pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::Config;
use crate::models::{FileId, FileTable, SourceFile};

pub use memory::MemoryTagStore;
pub use sqlite::SqliteTagStore;

/// One row of a tag store, with invalid UTF-8 already replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRow {
    pub key: String,
    pub dat: String,
    pub extra: Option<String>,
}

impl TagRow {
    pub fn new(key: &str, dat: &str, extra: Option<&str>) -> Self {
        Self {
            key: key.to_string(),
            dat: dat.to_string(),
            extra: extra.map(str::to_string),
        }
    }
}

/// Decode raw column bytes, substituting U+FFFD for invalid sequences.
pub fn lossy_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Read-only key/value tag store.
#[async_trait]
pub trait TagStore: Send + Sync {
    /// Every row, in store order.
    async fn rows(&self) -> Result<Vec<TagRow>>;
}

/// The three stores of one indexed tree.
pub struct TagDatabase {
    pub paths: Box<dyn TagStore>,
    pub definitions: Box<dyn TagStore>,
    pub references: Box<dyn TagStore>,
}

impl TagDatabase {
    /// Open the sqlite stores in the configured tag directory.
    pub async fn open(config: &Config) -> Result<Self> {
        Ok(Self {
            paths: Box::new(SqliteTagStore::open(&config.tags.path_db()).await?),
            definitions: Box::new(SqliteTagStore::open(&config.tags.definition_db()).await?),
            references: Box::new(SqliteTagStore::open(&config.tags.reference_db()).await?),
        })
    }

    /// Read the file table from the path store.
    ///
    /// The path store also holds reverse (id → path) and bookkeeping rows;
    /// only rows whose value is a file id are kept.
    pub async fn file_table(&self) -> Result<FileTable> {
        let files = self
            .paths
            .rows()
            .await?
            .into_iter()
            .filter_map(|row| {
                let dat = row.dat.trim();
                if dat.is_empty() || !dat.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                let id = dat.parse().ok()?;
                Some(SourceFile {
                    path: row.key,
                    id: FileId(id),
                })
            })
            .collect();
        Ok(FileTable::new(files))
    }
}
