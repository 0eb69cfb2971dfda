use super::{GoogleHttp, endpoint};
use crate::integrations::traits::CalendarApi;
use crate::integrations::types::{CalendarEvent, EventPatch, NewEvent};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::future::Future;
use std::pin::Pin;

const SERVICE: &str = "Calendar";

pub struct GoogleCalendar {
    http: GoogleHttp,
    base_url: String,
    calendar_id: String,
}

#[derive(Debug, Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<ApiEvent>,
}

#[derive(Debug, Deserialize)]
struct ApiEvent {
    id: String,
    summary: Option<String>,
    description: Option<String>,
    start: Option<EventTime>,
    end: Option<EventTime>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventTime {
    date_time: Option<String>,
    date: Option<String>,
}

impl EventTime {
    fn into_string(self) -> Option<String> {
        self.date_time.or(self.date)
    }
}

impl From<ApiEvent> for CalendarEvent {
    fn from(event: ApiEvent) -> Self {
        Self {
            id: event.id,
            summary: event.summary.unwrap_or_default(),
            description: event.description.unwrap_or_default(),
            start: event.start.and_then(EventTime::into_string),
            end: event.end.and_then(EventTime::into_string),
        }
    }
}

impl GoogleCalendar {
    pub fn new(http: GoogleHttp, base_url: &str, calendar_id: &str) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
            calendar_id: calendar_id.to_string(),
        }
    }

    fn events_url(&self, event_id: Option<&str>) -> anyhow::Result<url::Url> {
        let mut segments = vec!["calendars", self.calendar_id.as_str(), "events"];
        segments.extend(event_id);
        endpoint(&self.base_url, &segments)
    }

    fn patch_body(patch: &EventPatch) -> Value {
        let mut body = Map::new();
        if let Some(summary) = &patch.summary {
            body.insert("summary".into(), json!(summary));
        }
        if let Some(description) = &patch.description {
            body.insert("description".into(), json!(description));
        }
        if let Some(start) = &patch.start {
            body.insert("start".into(), json!({ "dateTime": start }));
        }
        if let Some(end) = &patch.end {
            body.insert("end".into(), json!({ "dateTime": end }));
        }
        Value::Object(body)
    }
}

impl CalendarApi for GoogleCalendar {
    fn list_events<'a>(
        &'a self,
        from: &'a str,
        to: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<CalendarEvent>>> + Send + 'a>> {
        Box::pin(async move {
            let request = self.http.client().get(self.events_url(None)?).query(&[
                ("timeMin", from),
                ("timeMax", to),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
            ]);
            let list: EventList = self.http.send_json(SERVICE, request).await?;
            Ok(list.items.into_iter().map(CalendarEvent::from).collect())
        })
    }

    fn insert_event<'a>(
        &'a self,
        event: &'a NewEvent,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<CalendarEvent>> + Send + 'a>> {
        Box::pin(async move {
            let body = json!({
                "summary": event.summary,
                "description": event.description,
                "start": { "dateTime": event.start },
                "end": { "dateTime": event.end },
            });
            let request = self.http.client().post(self.events_url(None)?).json(&body);
            let created: ApiEvent = self.http.send_json(SERVICE, request).await?;
            Ok(created.into())
        })
    }

    fn patch_event<'a>(
        &'a self,
        event_id: &'a str,
        patch: &'a EventPatch,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<CalendarEvent>> + Send + 'a>> {
        Box::pin(async move {
            let request = self
                .http
                .client()
                .patch(self.events_url(Some(event_id))?)
                .json(&Self::patch_body(patch));
            let updated: ApiEvent = self.http.send_json(SERVICE, request).await?;
            Ok(updated.into())
        })
    }

    fn delete_event<'a>(
        &'a self,
        event_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let request = self.http.client().delete(self.events_url(Some(event_id))?);
            self.http.send(SERVICE, request).await?;
            Ok(())
        })
    }
}
