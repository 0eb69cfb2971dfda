//! Assembly of the single text payload sent to the model each round.

use crate::memory::MemorySnapshot;
use chrono::{DateTime, FixedOffset, Local, Utc};
use serde_json::Value;
use std::fmt::Write;

pub const TIME_CONTEXT_HEADER: &str = "=== TIME CONTEXT (IMPORTANT) ===";
pub const COMMANDS_HEADER: &str = "=== BOT COMMANDS METADATA ===";
pub const USER_PROMPT_HEADER: &str = "=== USER PROMPT ===";
pub const USER_MEMORY_HEADER: &str = "=== USER MEMORY ===";
pub const ADDITIONAL_DATA_HEADER: &str = "=== ADDITIONAL DATA ===";

pub const SYSTEM_INSTRUCTIONS: &str = r#"You are Conscia, a personal assistant. Read the user's request, plan the actions needed, and answer with a JSON object only.

Output keys:
- "user_reply" (required): a short, friendly reply to the user.
- "commands" (optional): ordered list of {"command": <name>, "params": {...}} drawn only from BOT COMMANDS METADATA. Never call any API yourself.
- "updated_memory" (optional): the complete new memory document. Omit it when nothing worth remembering was learned.
No other keys are allowed. Do not wrap the JSON in prose.

Memory has exactly three top-level keys, always present: "immutable", "mutable", "archive".
- immutable: identity and core facts. Read-only. Copy it back unchanged.
- mutable: the user's current state, goals, habits and preferences. Restructure freely, but do not drop information unless it is obsolete or summarised.
- archive: long-term compressed memory. Store patterns and summaries, never raw conversation text or detailed logs.
Do not invent memories or infer sensitive attributes. Avoid needless restructuring.

Fetching data: when you need calendar events or document contents before acting, emit only fetch commands (calendar.fetch, docs.read, docs.list). Their results come back in an ADDITIONAL DATA section of the next request; action commands emitted alongside a fetch are discarded, so issue them again once you have the data.

All datetimes must be ISO 8601 with an explicit UTC offset, resolved against the TIME CONTEXT below."#;

/// Clock reading embedded in every request so relative dates resolve correctly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeContext {
    pub instant: DateTime<Utc>,
    pub local: DateTime<FixedOffset>,
    pub timezone: String,
}

impl TimeContext {
    pub fn now(timezone: &str) -> Self {
        let local = Local::now();
        Self {
            instant: local.with_timezone(&Utc),
            local: local.fixed_offset(),
            timezone: timezone.to_string(),
        }
    }

    pub fn at(local: DateTime<FixedOffset>, timezone: &str) -> Self {
        Self {
            instant: local.with_timezone(&Utc),
            local,
            timezone: timezone.to_string(),
        }
    }

    pub fn render(&self) -> String {
        let offset_minutes = self.local.offset().local_minus_utc() / 60;
        format!(
            "Current local time context:\n\
             - ISO datetime: {}\n\
             - Local date: {}\n\
             - Local time: {}\n\
             - UTC offset (minutes): {offset_minutes:+}\n\
             - Timezone: {}",
            self.instant.to_rfc3339(),
            self.local.format("%a %b %d %Y"),
            self.local.format("%H:%M:%S %:z"),
            self.timezone
        )
    }
}

fn pretty(value: &impl serde::Serialize) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string())
}

/// Concatenate the request sections in their fixed order. The additional
/// data block is present only on fetch-continuation rounds.
pub fn build_payload(
    instructions: &str,
    time: &TimeContext,
    catalog_metadata: &Value,
    user_prompt: &str,
    memory: &MemorySnapshot,
    additional_data: Option<&Value>,
) -> String {
    let mut payload = String::from(instructions);
    let mut section = |header: &str, body: &str| {
        let _ = write!(payload, "\n\n{header}\n{body}");
    };

    section(TIME_CONTEXT_HEADER, &time.render());
    section(COMMANDS_HEADER, &pretty(catalog_metadata));
    section(USER_PROMPT_HEADER, user_prompt);
    section(USER_MEMORY_HEADER, &pretty(memory));
    if let Some(data) = additional_data {
        section(ADDITIONAL_DATA_HEADER, &pretty(data));
    }

    payload
}
