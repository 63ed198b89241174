//! [`TagStore`] over a `gtags --sqlite3` database.
//!
//! Columns are read as blobs and decoded leniently, so a path or source line
//! in a legacy encoding does not fail the whole row.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::path::Path;

use super::{lossy_text, TagRow, TagStore};
use crate::db;

pub struct SqliteTagStore {
    pool: SqlitePool,
}

impl SqliteTagStore {
    pub async fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            pool: db::connect(path).await?,
        })
    }
}

fn to_row(row: &sqlx::sqlite::SqliteRow) -> Result<TagRow> {
    let key: Option<Vec<u8>> = row.try_get("key")?;
    let dat: Option<Vec<u8>> = row.try_get("dat")?;
    let extra: Option<Vec<u8>> = row.try_get("extra")?;
    Ok(TagRow {
        key: key.as_deref().map(lossy_text).unwrap_or_default(),
        dat: dat.as_deref().map(lossy_text).unwrap_or_default(),
        extra: extra.as_deref().map(lossy_text),
    })
}

#[async_trait]
impl TagStore for SqliteTagStore {
    async fn rows(&self) -> Result<Vec<TagRow>> {
        let rows = sqlx::query(
            "SELECT CAST(key AS BLOB) AS key, CAST(dat AS BLOB) AS dat, \
             CAST(extra AS BLOB) AS extra FROM db",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(to_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use std::str::FromStr;
    use tempfile::TempDir;

    async fn write_db(path: &Path) {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))
            .unwrap()
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();
        sqlx::query("CREATE TABLE db (key TEXT, dat TEXT, extra TEXT)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO db VALUES ('run', '1 @n 3 int @n(void)', '1')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO db VALUES ('walk', '2 @n 7 void @n(void)', '2')")
            .execute(&pool)
            .await
            .unwrap();
        // Latin-1 byte in the stored source text.
        sqlx::query("INSERT INTO db VALUES ('caf', CAST(X'3220406e20392063616620e9' AS TEXT), '2')")
            .execute(&pool)
            .await
            .unwrap();
        pool.close().await;
    }

    #[tokio::test]
    async fn reads_rows_leniently() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("GTAGS");
        write_db(&path).await;

        let store = SqliteTagStore::open(&path).await.unwrap();
        let rows = store.rows().await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], TagRow::new("run", "1 @n 3 int @n(void)", Some("1")));
        assert_eq!(rows[2].dat, "2 @n 9 caf \u{fffd}");
        assert_eq!(rows[2].extra.as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn missing_database_is_an_error() {
        let tmp = TempDir::new().unwrap();
        assert!(SqliteTagStore::open(&tmp.path().join("GRTAGS")).await.is_err());
    }
}
