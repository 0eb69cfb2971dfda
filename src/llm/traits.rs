use std::future::Future;
use std::pin::Pin;

/// A language model reachable over the network.
///
/// One call is one model turn: the whole prompt travels as a single user
/// message and the reply comes back as raw text.
pub trait Provider: Send + Sync {
    /// Provider identifier (e.g. "gemini").
    fn name(&self) -> &str;

    fn chat<'a>(
        &'a self,
        message: &'a str,
        model: &'a str,
        temperature: f64,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>>;
}
