use anyhow::{bail, Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Open one of the indexer's sqlite tag databases for reading.
pub async fn connect(db_path: &Path) -> Result<SqlitePool> {
    if !db_path.exists() {
        bail!(
            "tag database not found: {} (run `gtags --sqlite3` first)",
            db_path.display()
        );
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
        .read_only(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open tag database: {}", db_path.display()))?;

    Ok(pool)
}
