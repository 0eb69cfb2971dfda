//! Out-of-band export and seeding of the memory document.
//!
//! Seeding is the only path that may write the `immutable` tier.

use super::snapshot::MemorySnapshot;
use super::traits::MemoryStore;
use anyhow::{Context, Result};
use std::path::Path;

/// Write the current snapshot to `output` as pretty-printed JSON.
pub async fn export_to_file(store: &dyn MemoryStore, output: &Path) -> Result<()> {
    let snapshot = store.load().await.context("load memory for export")?;
    let contents = serde_json::to_string_pretty(&snapshot)?;
    tokio::fs::write(output, contents)
        .await
        .with_context(|| format!("write {}", output.display()))?;
    tracing::info!(path = %output.display(), "memory exported");
    Ok(())
}

/// Replace the stored snapshot with the document in `input`.
///
/// The file must hold exactly the three tiers, each a JSON object.
pub async fn seed_from_file(store: &dyn MemoryStore, input: &Path) -> Result<MemorySnapshot> {
    let contents = tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("read seed file {}", input.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&contents).context("seed file is not valid JSON")?;
    let snapshot = MemorySnapshot::from_value_strict(value)?;
    store.save(&snapshot).await.context("persist seeded memory")?;
    tracing::info!(path = %input.display(), "memory seeded");
    Ok(snapshot)
}
