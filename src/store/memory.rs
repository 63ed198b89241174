//! In-memory [`TagStore`] for tests and fixtures.

use anyhow::Result;
use async_trait::async_trait;

use super::{TagRow, TagStore};

/// A fixed list of rows.
#[derive(Debug, Clone, Default)]
pub struct MemoryTagStore {
    rows: Vec<TagRow>,
}

impl MemoryTagStore {
    pub fn new(rows: Vec<TagRow>) -> Self {
        Self { rows }
    }
}

#[async_trait]
impl TagStore for MemoryTagStore {
    async fn rows(&self) -> Result<Vec<TagRow>> {
        Ok(self.rows.clone())
    }
}
