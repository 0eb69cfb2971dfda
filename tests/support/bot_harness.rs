#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::Result;
use serde_json::Value;

use conscia::agent::AgentProxy;
use conscia::agent::prompt::{ADDITIONAL_DATA_HEADER, USER_MEMORY_HEADER};
use conscia::bot::Orchestrator;
use conscia::commands::{CommandCatalog, CommandDispatcher, CommandRegistry};
use conscia::config::AgentConfig;
use conscia::integrations::{
    AppendReport, CalendarApi, CalendarEvent, Capabilities, DocumentContent, DocumentInfo,
    DocumentSummary, DocumentsApi, EmailApi, EventPatch, NewEvent, OutgoingEmail, SentEmail,
    ShareReceipt, ShareRole,
};
use conscia::llm::Provider;
use conscia::memory::{InMemoryStore, MemorySnapshot, MemoryStore};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

fn locked<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Model ────────────────────────────────────────────────────────

/// Replays canned model replies in order and records every request.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String>>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new<S: Into<String>>(replies: impl IntoIterator<Item = S>) -> Self {
        Self::with_results(replies.into_iter().map(|reply| Ok(reply.into())))
    }

    pub fn with_results(replies: impl IntoIterator<Item = Result<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<String> {
        locked(&self.requests).clone()
    }

    pub fn invocations(&self) -> usize {
        locked(&self.requests).len()
    }
}

impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn chat<'a>(
        &'a self,
        message: &'a str,
        _model: &'a str,
        _temperature: f64,
    ) -> BoxFuture<'a, String> {
        Box::pin(async move {
            locked(&self.requests).push(message.to_string());
            locked(&self.replies)
                .pop_front()
                .unwrap_or_else(|| Err(anyhow::anyhow!("no scripted reply left")))
        })
    }
}

/// The JSON value under the request's ADDITIONAL DATA header, if any.
pub fn additional_data(request: &str) -> Option<Value> {
    let start = request.rfind(ADDITIONAL_DATA_HEADER)? + ADDITIONAL_DATA_HEADER.len();
    serde_json::from_str(request[start..].trim()).ok()
}

/// The memory snapshot serialized into the request.
pub fn memory_block(request: &str) -> Option<Value> {
    let start = request.rfind(USER_MEMORY_HEADER)? + USER_MEMORY_HEADER.len();
    let rest = &request[start..];
    let end = rest.find(ADDITIONAL_DATA_HEADER).unwrap_or(rest.len());
    serde_json::from_str(rest[..end].trim()).ok()
}

// ── Capabilities ─────────────────────────────────────────────────

/// Calendar fake: `list_events` returns the canned events, writes are recorded.
#[derive(Default)]
pub struct RecordingCalendar {
    pub events: Vec<CalendarEvent>,
    pub list_calls: Mutex<Vec<(String, String)>>,
    pub inserted: Mutex<Vec<NewEvent>>,
    pub patched: Mutex<Vec<(String, EventPatch)>>,
    pub deleted: Mutex<Vec<String>>,
}

impl RecordingCalendar {
    pub fn with_events(events: Vec<CalendarEvent>) -> Self {
        Self {
            events,
            ..Self::default()
        }
    }

    pub fn inserted(&self) -> Vec<NewEvent> {
        locked(&self.inserted).clone()
    }

    pub fn list_calls(&self) -> Vec<(String, String)> {
        locked(&self.list_calls).clone()
    }
}

impl CalendarApi for RecordingCalendar {
    fn list_events<'a>(&'a self, from: &'a str, to: &'a str) -> BoxFuture<'a, Vec<CalendarEvent>> {
        Box::pin(async move {
            locked(&self.list_calls).push((from.to_string(), to.to_string()));
            Ok(self.events.clone())
        })
    }

    fn insert_event<'a>(&'a self, event: &'a NewEvent) -> BoxFuture<'a, CalendarEvent> {
        Box::pin(async move {
            let mut inserted = locked(&self.inserted);
            inserted.push(event.clone());
            Ok(CalendarEvent {
                id: format!("evt-{}", inserted.len()),
                summary: event.summary.clone(),
                description: event.description.clone(),
                start: Some(event.start.clone()),
                end: Some(event.end.clone()),
            })
        })
    }

    fn patch_event<'a>(
        &'a self,
        event_id: &'a str,
        patch: &'a EventPatch,
    ) -> BoxFuture<'a, CalendarEvent> {
        Box::pin(async move {
            locked(&self.patched).push((event_id.to_string(), patch.clone()));
            Ok(CalendarEvent {
                id: event_id.to_string(),
                summary: patch.summary.clone().unwrap_or_default(),
                description: patch.description.clone().unwrap_or_default(),
                start: patch.start.clone(),
                end: patch.end.clone(),
            })
        })
    }

    fn delete_event<'a>(&'a self, event_id: &'a str) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            locked(&self.deleted).push(event_id.to_string());
            Ok(())
        })
    }
}

#[derive(Default)]
pub struct RecordingEmail {
    pub sent: Mutex<Vec<OutgoingEmail>>,
    /// Simulated send latency
    pub delay: Duration,
}

impl RecordingEmail {
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        locked(&self.sent).clone()
    }
}

impl EmailApi for RecordingEmail {
    fn send<'a>(&'a self, email: &'a OutgoingEmail) -> BoxFuture<'a, SentEmail> {
        Box::pin(async move {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let mut sent = locked(&self.sent);
            sent.push(email.clone());
            Ok(SentEmail {
                id: format!("msg-{}", sent.len()),
            })
        })
    }
}

/// Documents fake: every call is logged as `"<op> <args>"`.
#[derive(Default)]
pub struct RecordingDocs {
    pub calls: Mutex<Vec<String>>,
}

impl RecordingDocs {
    pub fn calls(&self) -> Vec<String> {
        locked(&self.calls).clone()
    }

    fn log(&self, entry: String) {
        locked(&self.calls).push(entry);
    }
}

impl DocumentsApi for RecordingDocs {
    fn create<'a>(&'a self, title: &'a str, content: &'a str) -> BoxFuture<'a, DocumentInfo> {
        Box::pin(async move {
            self.log(format!("create {title} ({} bytes)", content.len()));
            Ok(DocumentInfo {
                document_id: "doc-new".into(),
                title: title.to_string(),
                web_view_link: None,
            })
        })
    }

    fn read<'a>(&'a self, document_id: &'a str) -> BoxFuture<'a, DocumentContent> {
        Box::pin(async move {
            self.log(format!("read {document_id}"));
            Ok(DocumentContent {
                document_id: document_id.to_string(),
                title: format!("Doc {document_id}"),
                content: format!("contents of {document_id}"),
            })
        })
    }

    fn list(&self, max_results: u32) -> BoxFuture<'_, Vec<DocumentSummary>> {
        Box::pin(async move {
            self.log(format!("list {max_results}"));
            Ok(vec![DocumentSummary {
                document_id: "doc-1".into(),
                title: "Groceries".into(),
                created_time: None,
                modified_time: Some("2025-12-20T10:00:00Z".into()),
                web_view_link: None,
            }])
        })
    }

    fn append<'a>(&'a self, document_id: &'a str, content: &'a str) -> BoxFuture<'a, AppendReport> {
        Box::pin(async move {
            self.log(format!("append {document_id}"));
            Ok(AppendReport {
                document_id: document_id.to_string(),
                start_index: 1,
                operations: content.lines().count(),
            })
        })
    }

    fn replace<'a>(
        &'a self,
        document_id: &'a str,
        search: &'a str,
        replacement: &'a str,
    ) -> BoxFuture<'a, u64> {
        Box::pin(async move {
            self.log(format!("replace {document_id} {search}->{replacement}"));
            Ok(1)
        })
    }

    fn delete<'a>(&'a self, document_id: &'a str) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            self.log(format!("delete {document_id}"));
            Ok(())
        })
    }

    fn share<'a>(
        &'a self,
        document_id: &'a str,
        email: &'a str,
        role: ShareRole,
    ) -> BoxFuture<'a, ShareReceipt> {
        Box::pin(async move {
            self.log(format!("share {document_id} {email} {role}"));
            Ok(ShareReceipt {
                document_id: document_id.to_string(),
                shared_with: email.to_string(),
                role,
                permission_id: "perm-1".into(),
            })
        })
    }
}

// ── Memory ───────────────────────────────────────────────────────

/// Loads fine, refuses every write.
pub struct FailingStore {
    pub snapshot: MemorySnapshot,
}

impl MemoryStore for FailingStore {
    fn name(&self) -> &str {
        "failing"
    }

    fn load(&self) -> BoxFuture<'_, MemorySnapshot> {
        Box::pin(async move { Ok(self.snapshot.clone()) })
    }

    fn save<'a>(&'a self, _snapshot: &'a MemorySnapshot) -> BoxFuture<'a, ()> {
        Box::pin(async move { anyhow::bail!("database is locked") })
    }
}

// ── Assembled pipeline ───────────────────────────────────────────

pub struct Harness {
    pub provider: Arc<ScriptedProvider>,
    pub calendar: Arc<RecordingCalendar>,
    pub email: Arc<RecordingEmail>,
    pub docs: Arc<RecordingDocs>,
    pub store: Arc<dyn MemoryStore>,
    pub orchestrator: Orchestrator,
}

pub struct HarnessBuilder {
    replies: Vec<Result<String>>,
    calendar: RecordingCalendar,
    store: Arc<dyn MemoryStore>,
    max_rounds: u32,
    email_delay: Duration,
}

impl HarnessBuilder {
    pub fn new<S: Into<String>>(replies: impl IntoIterator<Item = S>) -> Self {
        Self {
            replies: replies.into_iter().map(|reply| Ok(reply.into())).collect(),
            calendar: RecordingCalendar::default(),
            store: Arc::new(InMemoryStore::new()),
            max_rounds: 5,
            email_delay: Duration::ZERO,
        }
    }

    pub fn with_results(replies: Vec<Result<String>>) -> Self {
        Self {
            replies,
            ..Self::new(Vec::<String>::new())
        }
    }

    pub fn calendar_events(mut self, events: Vec<CalendarEvent>) -> Self {
        self.calendar = RecordingCalendar::with_events(events);
        self
    }

    pub fn memory(mut self, snapshot: MemorySnapshot) -> Self {
        self.store = Arc::new(InMemoryStore::with_snapshot(snapshot));
        self
    }

    pub fn store(mut self, store: Arc<dyn MemoryStore>) -> Self {
        self.store = store;
        self
    }

    pub fn max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn email_delay(mut self, delay: Duration) -> Self {
        self.email_delay = delay;
        self
    }

    pub fn build(self) -> Harness {
        let provider = Arc::new(ScriptedProvider::with_results(self.replies));
        let calendar = Arc::new(self.calendar);
        let email = Arc::new(RecordingEmail {
            delay: self.email_delay,
            ..RecordingEmail::default()
        });
        let docs = Arc::new(RecordingDocs::default());
        let capabilities = Capabilities {
            calendar: calendar.clone(),
            email: email.clone(),
            documents: docs.clone(),
        };

        let catalog = Arc::new(CommandCatalog::builtin());
        let agent = AgentProxy::new(provider.clone(), &catalog, &AgentConfig::default());
        let dispatcher = CommandDispatcher::new(
            Arc::clone(&catalog),
            CommandRegistry::with_capabilities(&capabilities),
            Duration::from_secs(5),
        )
        .expect("built-in registry matches the catalog");

        let orchestrator =
            Orchestrator::new(agent, dispatcher, Arc::clone(&self.store), self.max_rounds);

        Harness {
            provider,
            calendar,
            email,
            docs,
            store: self.store,
            orchestrator,
        }
    }
}

pub fn sample_memory() -> MemorySnapshot {
    MemorySnapshot {
        immutable: serde_json::json!({"name": "Rafi", "email": "rafi@example.com"}),
        mutable: serde_json::json!({"current_focus": "exam prep"}),
        archive: serde_json::json!({}),
    }
}

pub fn event(id: &str, summary: &str, start: &str) -> CalendarEvent {
    CalendarEvent {
        id: id.to_string(),
        summary: summary.to_string(),
        description: String::new(),
        start: Some(start.to_string()),
        end: None,
    }
}
