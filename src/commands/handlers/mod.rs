mod calendar;
mod docs;
mod email;

pub use calendar::{CalendarAddEvent, CalendarDeleteEvent, CalendarFetch, CalendarUpdateEvent};
pub use docs::{DocsAppend, DocsCreate, DocsDelete, DocsList, DocsRead, DocsReplace, DocsShare};
pub use email::EmailSend;

use super::traits::CommandHandler;
use crate::integrations::Capabilities;
use serde_json::{Map, Value};
use std::sync::Arc;

/// One handler per built-in catalog command.
pub fn builtin_handlers(capabilities: &Capabilities) -> Vec<Arc<dyn CommandHandler>> {
    let calendar = &capabilities.calendar;
    let documents = &capabilities.documents;
    vec![
        Arc::new(CalendarFetch::new(Arc::clone(calendar))),
        Arc::new(CalendarAddEvent::new(Arc::clone(calendar))),
        Arc::new(CalendarUpdateEvent::new(Arc::clone(calendar))),
        Arc::new(CalendarDeleteEvent::new(Arc::clone(calendar))),
        Arc::new(EmailSend::new(Arc::clone(&capabilities.email))),
        Arc::new(DocsCreate::new(Arc::clone(documents))),
        Arc::new(DocsRead::new(Arc::clone(documents))),
        Arc::new(DocsList::new(Arc::clone(documents))),
        Arc::new(DocsAppend::new(Arc::clone(documents))),
        Arc::new(DocsReplace::new(Arc::clone(documents))),
        Arc::new(DocsDelete::new(Arc::clone(documents))),
        Arc::new(DocsShare::new(Arc::clone(documents))),
    ]
}

pub(crate) fn required_str<'a>(
    params: &'a Map<String, Value>,
    key: &str,
) -> anyhow::Result<&'a str> {
    optional_str(params, key)
        .ok_or_else(|| anyhow::anyhow!("param '{key}' must be a non-empty string"))
}

pub(crate) fn optional_str<'a>(params: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

pub(crate) fn to_data<T: serde::Serialize>(value: &T) -> anyhow::Result<Option<Value>> {
    Ok(Some(serde_json::to_value(value)?))
}
