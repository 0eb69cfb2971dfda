use super::snapshot::MemorySnapshot;
use super::traits::MemoryStore;
use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::future::Future;
use std::path::Path;
use std::pin::Pin;

const MEMORY_TABLE: &str = "
CREATE TABLE IF NOT EXISTS memory (
    id   INTEGER PRIMARY KEY CHECK (id = 1),
    data TEXT NOT NULL
)";

/// SQLite-backed snapshot store: one row, id pinned to 1.
pub struct SqliteMemoryStore {
    pool: SqlitePool,
}

impl SqliteMemoryStore {
    /// Create a store over an existing pool and ensure the table exists.
    pub async fn new(pool: SqlitePool) -> Result<Self> {
        sqlx::query(MEMORY_TABLE)
            .execute(&pool)
            .await
            .context("create memory table")?;
        Ok(Self { pool })
    }

    /// Open (or create) the database file at `db_path`.
    pub async fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create memory directory {}", parent.display()))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("open memory database {}", db_path.display()))?;

        Self::new(pool).await
    }

    /// Access the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl MemoryStore for SqliteMemoryStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn load(&self) -> Pin<Box<dyn Future<Output = Result<MemorySnapshot>> + Send + '_>> {
        Box::pin(async move {
            let row: Option<(String,)> = sqlx::query_as("SELECT data FROM memory WHERE id = 1")
                .fetch_optional(&self.pool)
                .await
                .context("load memory row")?;

            let Some((data,)) = row else {
                return Ok(MemorySnapshot::empty());
            };

            let value: serde_json::Value =
                serde_json::from_str(&data).context("deserialize stored memory")?;
            Ok(MemorySnapshot::from_stored(value)?)
        })
    }

    fn save<'a>(
        &'a self,
        snapshot: &'a MemorySnapshot,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            snapshot.validate()?;
            let data = serde_json::to_string(snapshot).context("serialize memory")?;
            sqlx::query(
                "INSERT INTO memory (id, data) VALUES (1, $1)
                 ON CONFLICT(id) DO UPDATE SET data = excluded.data",
            )
            .bind(data)
            .execute(&self.pool)
            .await
            .context("persist memory row")?;
            tracing::debug!(backend = "sqlite", "memory snapshot persisted");
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    async fn store() -> SqliteMemoryStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        SqliteMemoryStore::new(pool).await.unwrap()
    }

    fn sample() -> MemorySnapshot {
        MemorySnapshot {
            immutable: json!({"name": "Rafi", "email": "rafi@example.com"}),
            mutable: json!({"current_focus": "exam prep"}),
            archive: json!({"2025-Q4": "training for a 10k"}),
        }
    }

    #[tokio::test]
    async fn load_on_fresh_database_is_empty() {
        let store = store().await;
        assert_eq!(store.load().await.unwrap(), MemorySnapshot::empty());
    }

    #[tokio::test]
    async fn save_then_load_returns_same_snapshot() {
        let store = store().await;
        store.save(&sample()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), sample());
    }

    #[tokio::test]
    async fn save_keeps_a_single_row() {
        let store = store().await;
        store.save(&MemorySnapshot::empty()).await.unwrap();
        store.save(&sample()).await.unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM memory")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn legacy_empty_row_loads_as_empty_tiers() {
        let store = store().await;
        sqlx::query("INSERT INTO memory (id, data) VALUES (1, '{}')")
            .execute(store.pool())
            .await
            .unwrap();
        assert_eq!(store.load().await.unwrap(), MemorySnapshot::empty());
    }

    #[tokio::test]
    async fn open_creates_database_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("memory.db");

        let store = SqliteMemoryStore::open(&path).await.unwrap();
        store.save(&sample()).await.unwrap();

        assert!(path.exists());
        let reopened = SqliteMemoryStore::open(&path).await.unwrap();
        assert_eq!(reopened.load().await.unwrap(), sample());
    }
}
