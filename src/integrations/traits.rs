use super::types::{
    AppendReport, CalendarEvent, DocumentContent, DocumentInfo, DocumentSummary, EventPatch,
    NewEvent, OutgoingEmail, SentEmail, ShareReceipt, ShareRole,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub trait CalendarApi: Send + Sync {
    /// Events overlapping `[from, to)`, expanded and ordered by start time.
    fn list_events<'a>(
        &'a self,
        from: &'a str,
        to: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<CalendarEvent>>> + Send + 'a>>;

    fn insert_event<'a>(
        &'a self,
        event: &'a NewEvent,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<CalendarEvent>> + Send + 'a>>;

    fn patch_event<'a>(
        &'a self,
        event_id: &'a str,
        patch: &'a EventPatch,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<CalendarEvent>> + Send + 'a>>;

    fn delete_event<'a>(
        &'a self,
        event_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;
}

pub trait EmailApi: Send + Sync {
    fn send<'a>(
        &'a self,
        email: &'a OutgoingEmail,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<SentEmail>> + Send + 'a>>;
}

pub trait DocumentsApi: Send + Sync {
    /// Create a document; non-blank `content` is appended as formatted text.
    fn create<'a>(
        &'a self,
        title: &'a str,
        content: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<DocumentInfo>> + Send + 'a>>;

    fn read<'a>(
        &'a self,
        document_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<DocumentContent>> + Send + 'a>>;

    /// Most recently modified first.
    fn list(
        &self,
        max_results: u32,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<DocumentSummary>>> + Send + '_>>;

    /// Compile markdown-flavoured `content` and submit it as one batch at the
    /// end of the document.
    fn append<'a>(
        &'a self,
        document_id: &'a str,
        content: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<AppendReport>> + Send + 'a>>;

    /// Case-insensitive replace-all. Returns the number of occurrences changed.
    fn replace<'a>(
        &'a self,
        document_id: &'a str,
        search: &'a str,
        replacement: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<u64>> + Send + 'a>>;

    fn delete<'a>(
        &'a self,
        document_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;

    fn share<'a>(
        &'a self,
        document_id: &'a str,
        email: &'a str,
        role: ShareRole,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<ShareReceipt>> + Send + 'a>>;
}

/// The fixed capability set commands are dispatched against.
#[derive(Clone)]
pub struct Capabilities {
    pub calendar: Arc<dyn CalendarApi>,
    pub email: Arc<dyn EmailApi>,
    pub documents: Arc<dyn DocumentsApi>,
}
