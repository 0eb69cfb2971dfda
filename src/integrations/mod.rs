//! External capabilities the command handlers act through.
//!
//! Each capability is a trait so the orchestrator can run against fakes in
//! tests; `google` holds the REST implementations.

pub mod google;
pub mod traits;
pub mod types;

pub use traits::{CalendarApi, Capabilities, DocumentsApi, EmailApi};
pub use types::{
    AppendReport, CalendarEvent, DocumentContent, DocumentInfo, DocumentSummary, EventPatch,
    NewEvent, OutgoingEmail, SentEmail, ShareReceipt, ShareRole,
};
