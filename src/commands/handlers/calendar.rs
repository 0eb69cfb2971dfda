use super::{optional_str, required_str, to_data};
use crate::commands::traits::CommandHandler;
use crate::integrations::{CalendarApi, EventPatch, NewEvent};
use serde_json::{Map, Value, json};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub struct CalendarFetch {
    calendar: Arc<dyn CalendarApi>,
}

impl CalendarFetch {
    pub fn new(calendar: Arc<dyn CalendarApi>) -> Self {
        Self { calendar }
    }
}

impl CommandHandler for CalendarFetch {
    fn name(&self) -> &str {
        "calendar.fetch"
    }

    fn execute<'a>(
        &'a self,
        params: &'a Map<String, Value>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<Value>>> + Send + 'a>> {
        Box::pin(async move {
            let from = required_str(params, "from")?;
            let to = required_str(params, "to")?;
            let events = self.calendar.list_events(from, to).await?;
            tracing::info!(count = events.len(), "fetched calendar events");
            to_data(&events)
        })
    }
}

pub struct CalendarAddEvent {
    calendar: Arc<dyn CalendarApi>,
}

impl CalendarAddEvent {
    pub fn new(calendar: Arc<dyn CalendarApi>) -> Self {
        Self { calendar }
    }
}

impl CommandHandler for CalendarAddEvent {
    fn name(&self) -> &str {
        "calendar.add_event"
    }

    fn execute<'a>(
        &'a self,
        params: &'a Map<String, Value>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<Value>>> + Send + 'a>> {
        Box::pin(async move {
            let event = NewEvent {
                summary: required_str(params, "summary")?.to_string(),
                description: optional_str(params, "description")
                    .unwrap_or_default()
                    .to_string(),
                start: required_str(params, "start")?.to_string(),
                end: required_str(params, "end")?.to_string(),
            };
            let created = self.calendar.insert_event(&event).await?;
            tracing::info!(
                event_id = %created.id,
                summary = %created.summary,
                "added calendar event"
            );
            to_data(&created)
        })
    }
}

pub struct CalendarUpdateEvent {
    calendar: Arc<dyn CalendarApi>,
}

impl CalendarUpdateEvent {
    pub fn new(calendar: Arc<dyn CalendarApi>) -> Self {
        Self { calendar }
    }
}

impl CommandHandler for CalendarUpdateEvent {
    fn name(&self) -> &str {
        "calendar.update_event"
    }

    fn execute<'a>(
        &'a self,
        params: &'a Map<String, Value>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<Value>>> + Send + 'a>> {
        Box::pin(async move {
            let event_id = required_str(params, "eventId")?;
            let field = |key: &str| optional_str(params, key).map(str::to_string);
            let patch = EventPatch {
                summary: field("summary"),
                description: field("description"),
                start: field("start"),
                end: field("end"),
            };
            if patch.is_empty() {
                anyhow::bail!("nothing to update for event {event_id}");
            }
            let updated = self.calendar.patch_event(event_id, &patch).await?;
            tracing::info!(event_id = %updated.id, "updated calendar event");
            to_data(&updated)
        })
    }
}

pub struct CalendarDeleteEvent {
    calendar: Arc<dyn CalendarApi>,
}

impl CalendarDeleteEvent {
    pub fn new(calendar: Arc<dyn CalendarApi>) -> Self {
        Self { calendar }
    }
}

impl CommandHandler for CalendarDeleteEvent {
    fn name(&self) -> &str {
        "calendar.delete_event"
    }

    fn execute<'a>(
        &'a self,
        params: &'a Map<String, Value>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<Value>>> + Send + 'a>> {
        Box::pin(async move {
            let event_id = required_str(params, "eventId")?;
            self.calendar.delete_event(event_id).await?;
            tracing::info!(event_id, "deleted calendar event");
            Ok(Some(json!({ "deleted": event_id })))
        })
    }
}
