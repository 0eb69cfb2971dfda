use serde_json::{Map, Value};
use std::future::Future;
use std::pin::Pin;

/// Executes one catalog command against a capability.
///
/// Handlers receive params whose required keys the dispatcher has already
/// checked. The returned value, if any, is reported as the command's produced
/// data; for fetch-class commands it is also fed back to the model.
pub trait CommandHandler: Send + Sync {
    /// Catalog name this handler serves (e.g. "calendar.fetch").
    fn name(&self) -> &str;

    fn execute<'a>(
        &'a self,
        params: &'a Map<String, Value>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<Value>>> + Send + 'a>>;
}
