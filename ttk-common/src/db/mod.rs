//! Database access for the two TenderTrack stores
//!
//! The raw ledger (`raw.db`) and the canonical store (`canonical.db`) are
//! independently owned SQLite databases. Pipeline stages receive this
//! context object explicitly; there is no ambient connection state.

pub mod init;
pub mod models;

use crate::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Raw ledger database file name
pub const RAW_DB_FILE: &str = "raw.db";
/// Canonical store database file name
pub const CANONICAL_DB_FILE: &str = "canonical.db";

/// Connection pools for both persisted stores
#[derive(Debug, Clone)]
pub struct Stores {
    /// Append-only raw capture ledger
    pub raw: SqlitePool,
    /// Normalized canonical store plus reference tables
    pub canonical: SqlitePool,
}

impl Stores {
    /// Open (or create) both stores under the data directory
    pub async fn open(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;

        let raw = open_pool(&data_dir.join(RAW_DB_FILE)).await?;
        init::init_raw_schema(&raw).await?;

        let canonical = open_pool(&data_dir.join(CANONICAL_DB_FILE)).await?;
        init::init_canonical_schema(&canonical).await?;

        Ok(Self { raw, canonical })
    }

    /// In-memory stores for tests
    pub async fn open_in_memory() -> Result<Self> {
        let raw = SqlitePool::connect("sqlite::memory:").await?;
        init::init_raw_schema(&raw).await?;

        let canonical = SqlitePool::connect("sqlite::memory:").await?;
        init::init_canonical_schema(&canonical).await?;

        Ok(Self { raw, canonical })
    }
}

/// Initialize one database connection pool
async fn open_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use proper SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_creates_both_database_files() {
        let dir = tempfile::tempdir().unwrap();
        let stores = Stores::open(dir.path()).await.unwrap();

        assert!(dir.path().join(RAW_DB_FILE).exists());
        assert!(dir.path().join(CANONICAL_DB_FILE).exists());

        // Schema is queryable immediately after open
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM raw_tenders")
            .fetch_one(&stores.raw)
            .await
            .unwrap();
        assert_eq!(count.0, 0);
    }
}
