use super::{FileMemoryStore, InMemoryStore, MemoryStore, SqliteMemoryStore};
use crate::config::MemoryConfig;
use std::path::Path;
use std::sync::Arc;

pub async fn create_memory_store(
    config: &MemoryConfig,
    workspace_dir: &Path,
) -> anyhow::Result<Arc<dyn MemoryStore>> {
    let store: Arc<dyn MemoryStore> = match config.backend.as_str() {
        "sqlite" => {
            let path = config
                .path
                .clone()
                .unwrap_or_else(|| workspace_dir.join("memory").join("memory.db"));
            Arc::new(SqliteMemoryStore::open(&path).await?)
        }
        "file" => {
            let path = config
                .path
                .clone()
                .unwrap_or_else(|| workspace_dir.join("memory").join("memory.json"));
            Arc::new(FileMemoryStore::new(path))
        }
        "none" => Arc::new(InMemoryStore::new()),
        other => {
            anyhow::bail!("Unknown memory backend '{other}'. Supported: sqlite, file, none");
        }
    };

    tracing::info!(backend = store.name(), "memory store ready");
    Ok(store)
}
