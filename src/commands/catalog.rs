//! The static set of commands the model may emit.

use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;

pub const BUCKET_CALENDAR_EVENTS: &str = "calendar_events";
pub const BUCKET_DOCUMENTS: &str = "documents";
pub const BUCKET_DOCUMENT_LIST: &str = "document_list";

/// Whether a command only reads data for the next round or acts on the user's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandClass {
    /// Read-only; results are merged under `bucket` and fed back to the model.
    Fetch { bucket: &'static str },
    Action,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

impl ParamSpec {
    const fn required(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            required: true,
        }
    }

    const fn optional(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            required: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub class: CommandClass,
    pub params: Vec<ParamSpec>,
    pub example: Value,
}

impl CommandSpec {
    pub fn is_fetch(&self) -> bool {
        matches!(self.class, CommandClass::Fetch { .. })
    }

    pub fn bucket(&self) -> Option<&'static str> {
        match self.class {
            CommandClass::Fetch { bucket } => Some(bucket),
            CommandClass::Action => None,
        }
    }

    pub fn required_params(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.params.iter().filter(|p| p.required).map(|p| p.name)
    }
}

/// Wire shape of one catalog entry inside the model payload.
#[derive(Serialize)]
struct CatalogEntry<'a> {
    command: &'a str,
    description: &'a str,
    params: BTreeMap<&'a str, String>,
    example: &'a Value,
}

impl<'a> From<&'a CommandSpec> for CatalogEntry<'a> {
    fn from(spec: &'a CommandSpec) -> Self {
        let params = spec
            .params
            .iter()
            .map(|p| {
                let description = if p.required {
                    p.description.to_string()
                } else {
                    format!("{} (optional)", p.description)
                };
                (p.name, description)
            })
            .collect();
        Self {
            command: spec.name,
            description: spec.description,
            params,
            example: &spec.example,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandCatalog {
    specs: Vec<CommandSpec>,
}

impl CommandCatalog {
    pub fn new(specs: Vec<CommandSpec>) -> Self {
        Self { specs }
    }

    pub fn get(&self, name: &str) -> Option<&CommandSpec> {
        self.specs.iter().find(|spec| spec.name == name)
    }

    pub fn is_fetch(&self, name: &str) -> bool {
        self.get(name).is_some_and(CommandSpec::is_fetch)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandSpec> {
        self.specs.iter()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.specs.iter().map(|spec| spec.name).collect()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Catalog as the JSON array embedded in the model request.
    pub fn to_metadata(&self) -> Value {
        let entries: Vec<CatalogEntry<'_>> = self.specs.iter().map(CatalogEntry::from).collect();
        serde_json::to_value(entries).unwrap_or(Value::Null)
    }

    /// Calendar, email and document commands backed by Google services.
    pub fn builtin() -> Self {
        Self::new(vec![
            CommandSpec {
                name: "calendar.fetch",
                description: "Fetches calendar events within a date range. Datetimes MUST carry a timezone offset.",
                class: CommandClass::Fetch {
                    bucket: BUCKET_CALENDAR_EVENTS,
                },
                params: vec![
                    ParamSpec::required("from", "ISO 8601 datetime with offset, e.g. 2025-12-22T00:00:00+06:00"),
                    ParamSpec::required("to", "ISO 8601 datetime with offset, e.g. 2025-12-23T00:00:00+06:00"),
                ],
                example: json!({
                    "command": "calendar.fetch",
                    "params": {"from": "2025-12-22T00:00:00+06:00", "to": "2025-12-23T23:59:59+06:00"}
                }),
            },
            CommandSpec {
                name: "calendar.add_event",
                description: "Adds a calendar event. Start and end MUST carry a timezone offset.",
                class: CommandClass::Action,
                params: vec![
                    ParamSpec::required("summary", "Title of the event"),
                    ParamSpec::optional("description", "Longer description"),
                    ParamSpec::required("start", "ISO 8601 datetime with offset"),
                    ParamSpec::required("end", "ISO 8601 datetime with offset"),
                ],
                example: json!({
                    "command": "calendar.add_event",
                    "params": {
                        "summary": "Morning Walk",
                        "description": "Morning walk with a friend",
                        "start": "2025-12-22T08:00:00+06:00",
                        "end": "2025-12-22T08:30:00+06:00"
                    }
                }),
            },
            CommandSpec {
                name: "calendar.update_event",
                description: "Updates fields of an existing event. Only provided fields change.",
                class: CommandClass::Action,
                params: vec![
                    ParamSpec::required("eventId", "ID of the event to update"),
                    ParamSpec::optional("summary", "New title"),
                    ParamSpec::optional("description", "New description"),
                    ParamSpec::optional("start", "ISO 8601 datetime with offset"),
                    ParamSpec::optional("end", "ISO 8601 datetime with offset"),
                ],
                example: json!({
                    "command": "calendar.update_event",
                    "params": {
                        "eventId": "ui8nd7gb17v2fvrp1gdtfffa8s",
                        "start": "2025-12-22T09:00:00+06:00",
                        "end": "2025-12-22T09:30:00+06:00"
                    }
                }),
            },
            CommandSpec {
                name: "calendar.delete_event",
                description: "Deletes a calendar event.",
                class: CommandClass::Action,
                params: vec![ParamSpec::required("eventId", "ID of the event to delete")],
                example: json!({
                    "command": "calendar.delete_event",
                    "params": {"eventId": "ui8nd7gb17v2fvrp1gdtfffa8s"}
                }),
            },
            CommandSpec {
                name: "email.send",
                description: "Sends a plain-text email.",
                class: CommandClass::Action,
                params: vec![
                    ParamSpec::required("to", "Recipient email address"),
                    ParamSpec::required("subject", "Email subject"),
                    ParamSpec::required("body", "Email body text"),
                ],
                example: json!({
                    "command": "email.send",
                    "params": {
                        "to": "friend@example.com",
                        "subject": "Morning Walk",
                        "body": "Want to join me for a walk tomorrow at 8 AM?"
                    }
                }),
            },
            CommandSpec {
                name: "docs.create",
                description: "Creates a document. Content supports # headings, - bullets and **bold**.",
                class: CommandClass::Action,
                params: vec![
                    ParamSpec::required("title", "Document title"),
                    ParamSpec::optional("content", "Initial markdown-formatted content"),
                ],
                example: json!({
                    "command": "docs.create",
                    "params": {"title": "Weekly Plan", "content": "# Goals\n- Run 5k\n**Focus** on sleep"}
                }),
            },
            CommandSpec {
                name: "docs.read",
                description: "Reads the plain text of a document.",
                class: CommandClass::Fetch {
                    bucket: BUCKET_DOCUMENTS,
                },
                params: vec![ParamSpec::required("documentId", "ID of the document")],
                example: json!({
                    "command": "docs.read",
                    "params": {"documentId": "1AbCdEf"}
                }),
            },
            CommandSpec {
                name: "docs.list",
                description: "Lists documents, most recently modified first.",
                class: CommandClass::Fetch {
                    bucket: BUCKET_DOCUMENT_LIST,
                },
                params: vec![ParamSpec::optional(
                    "maxResults",
                    "How many documents to return, default 10",
                )],
                example: json!({
                    "command": "docs.list",
                    "params": {"maxResults": 10}
                }),
            },
            CommandSpec {
                name: "docs.append",
                description: "Appends markdown-formatted content to the end of a document.",
                class: CommandClass::Action,
                params: vec![
                    ParamSpec::required("documentId", "ID of the document"),
                    ParamSpec::required("content", "Markdown-formatted content"),
                ],
                example: json!({
                    "command": "docs.append",
                    "params": {"documentId": "1AbCdEf", "content": "## Update\n- Finished chapter 3"}
                }),
            },
            CommandSpec {
                name: "docs.replace",
                description: "Replaces every case-insensitive occurrence of a text.",
                class: CommandClass::Action,
                params: vec![
                    ParamSpec::required("documentId", "ID of the document"),
                    ParamSpec::required("searchText", "Text to find"),
                    ParamSpec::required("replacementText", "Text to put in its place"),
                ],
                example: json!({
                    "command": "docs.replace",
                    "params": {"documentId": "1AbCdEf", "searchText": "draft", "replacementText": "final"}
                }),
            },
            CommandSpec {
                name: "docs.delete",
                description: "Deletes a document.",
                class: CommandClass::Action,
                params: vec![ParamSpec::required("documentId", "ID of the document")],
                example: json!({
                    "command": "docs.delete",
                    "params": {"documentId": "1AbCdEf"}
                }),
            },
            CommandSpec {
                name: "docs.share",
                description: "Shares a document with someone by email.",
                class: CommandClass::Action,
                params: vec![
                    ParamSpec::required("documentId", "ID of the document"),
                    ParamSpec::required("email", "Email address to share with"),
                    ParamSpec::optional("role", "reader, commenter or writer; default reader"),
                ],
                example: json!({
                    "command": "docs.share",
                    "params": {"documentId": "1AbCdEf", "email": "friend@example.com", "role": "writer"}
                }),
            },
        ])
    }
}

impl Default for CommandCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
