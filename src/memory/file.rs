use super::snapshot::MemorySnapshot;
use super::traits::MemoryStore;
use anyhow::{Context, Result};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

/// JSON file store. Writes go to a sibling temp file which is then renamed
/// over the target, so readers see either the old or the new document.
pub struct FileMemoryStore {
    path: PathBuf,
}

impl FileMemoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_else(|| "memory.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl MemoryStore for FileMemoryStore {
    fn name(&self) -> &str {
        "file"
    }

    fn load(&self) -> Pin<Box<dyn Future<Output = Result<MemorySnapshot>> + Send + '_>> {
        Box::pin(async move {
            let exists = tokio::fs::try_exists(&self.path)
                .await
                .with_context(|| format!("stat memory file {}", self.path.display()))?;
            if !exists {
                return Ok(MemorySnapshot::empty());
            }
            let contents = tokio::fs::read_to_string(&self.path)
                .await
                .with_context(|| format!("read memory file {}", self.path.display()))?;
            let value: serde_json::Value =
                serde_json::from_str(&contents).context("deserialize memory file")?;
            Ok(MemorySnapshot::from_stored(value)?)
        })
    }

    fn save<'a>(
        &'a self,
        snapshot: &'a MemorySnapshot,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            snapshot.validate()?;
            if let Some(parent) = self.path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            let contents = serde_json::to_string_pretty(snapshot).context("serialize memory")?;
            let temp = self.temp_path();
            tokio::fs::write(&temp, contents)
                .await
                .with_context(|| format!("write {}", temp.display()))?;
            tokio::fs::rename(&temp, &self.path)
                .await
                .with_context(|| format!("replace memory file {}", self.path.display()))?;
            tracing::debug!(
                backend = "file",
                path = %self.path.display(),
                "memory snapshot persisted"
            );
            Ok(())
        })
    }
}
