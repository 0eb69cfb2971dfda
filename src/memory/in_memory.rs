use super::snapshot::MemorySnapshot;
use super::traits::MemoryStore;
use arc_swap::ArcSwap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Process-local store. Readers never block; `save` swaps the pointer.
pub struct InMemoryStore {
    current: ArcSwap<MemorySnapshot>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_snapshot(MemorySnapshot::empty())
    }

    pub fn with_snapshot(snapshot: MemorySnapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(snapshot),
        }
    }

    /// Current snapshot without going through the async contract.
    pub fn current(&self) -> Arc<MemorySnapshot> {
        self.current.load_full()
    }
}

impl MemoryStore for InMemoryStore {
    fn name(&self) -> &str {
        "none"
    }

    fn load(&self) -> Pin<Box<dyn Future<Output = anyhow::Result<MemorySnapshot>> + Send + '_>> {
        Box::pin(async move { Ok(self.current.load().as_ref().clone()) })
    }

    fn save<'a>(
        &'a self,
        snapshot: &'a MemorySnapshot,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.current.store(Arc::new(snapshot.clone()));
            Ok(())
        })
    }
}
