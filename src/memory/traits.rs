use super::snapshot::MemorySnapshot;
use std::future::Future;
use std::pin::Pin;

/// Persistence contract for the single current memory snapshot.
///
/// `save` replaces the stored document wholesale; stores never patch
/// individual fields.
pub trait MemoryStore: Send + Sync {
    /// Backend name for diagnostics.
    fn name(&self) -> &str;

    /// Load the current snapshot. A store that has never been written yields
    /// [`MemorySnapshot::empty`].
    fn load(&self) -> Pin<Box<dyn Future<Output = anyhow::Result<MemorySnapshot>> + Send + '_>>;

    /// Atomically replace the stored snapshot.
    fn save<'a>(
        &'a self,
        snapshot: &'a MemorySnapshot,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;
}
