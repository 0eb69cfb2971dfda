use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Half-open `[start, end)` span in a document's linear index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexRange {
    pub start: usize,
    pub end: usize,
}

impl IndexRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Named paragraph styles emitted by the compiler.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
pub enum NamedStyle {
    #[serde(rename = "HEADING_1")]
    #[strum(serialize = "HEADING_1")]
    Heading1,
    #[serde(rename = "HEADING_2")]
    #[strum(serialize = "HEADING_2")]
    Heading2,
    #[serde(rename = "HEADING_3")]
    #[strum(serialize = "HEADING_3")]
    Heading3,
    #[serde(rename = "HEADING_4")]
    #[strum(serialize = "HEADING_4")]
    Heading4,
}

impl NamedStyle {
    /// Heading style for a run of `#` markers; anything deeper than four
    /// collapses to level four.
    pub fn heading(markers: usize) -> Self {
        match markers {
            0 | 1 => Self::Heading1,
            2 => Self::Heading2,
            3 => Self::Heading3,
            _ => Self::Heading4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TextStyle {
    pub bold: bool,
}

impl TextStyle {
    pub fn bold() -> Self {
        Self { bold: true }
    }
}

/// One positional instruction against a remote rich document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditOperation {
    InsertText { at: usize, text: String },
    SetParagraphStyle { range: IndexRange, style: NamedStyle },
    SetTextStyle { range: IndexRange, style: TextStyle },
}

impl EditOperation {
    /// Index the operation starts at.
    pub fn start(&self) -> usize {
        match self {
            Self::InsertText { at, .. } => *at,
            Self::SetParagraphStyle { range, .. } | Self::SetTextStyle { range, .. } => {
                range.start
            }
        }
    }

    /// Number of index positions this operation adds to the document.
    pub fn inserted_len(&self) -> usize {
        match self {
            Self::InsertText { text, .. } => utf16_len(text),
            Self::SetParagraphStyle { .. } | Self::SetTextStyle { .. } => 0,
        }
    }

    /// Render as one request object of the document backend's batch update.
    pub fn to_request(&self) -> Value {
        match self {
            Self::InsertText { at, text } => json!({
                "insertText": {
                    "location": { "index": at },
                    "text": text,
                }
            }),
            Self::SetParagraphStyle { range, style } => json!({
                "updateParagraphStyle": {
                    "range": range_json(*range),
                    "paragraphStyle": { "namedStyleType": style.to_string() },
                    "fields": "namedStyleType",
                }
            }),
            Self::SetTextStyle { range, style } => json!({
                "updateTextStyle": {
                    "range": range_json(*range),
                    "textStyle": { "bold": style.bold },
                    "fields": "bold",
                }
            }),
        }
    }
}

/// Render a whole compiled block as the `requests` array of one batch update.
pub fn to_batch_requests(operations: &[EditOperation]) -> Vec<Value> {
    operations.iter().map(EditOperation::to_request).collect()
}

/// Length in UTF-16 code units, the unit the document index space counts in.
pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

fn range_json(range: IndexRange) -> Value {
    json!({ "startIndex": range.start, "endIndex": range.end })
}
