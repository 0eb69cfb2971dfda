use crate::error::{CommandError, ErrorKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One command as emitted by the model: `{"command": ..., "params": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    #[serde(rename = "command")]
    pub name: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl Command {
    pub fn new(name: impl Into<String>, params: Value) -> Self {
        Self {
            name: name.into(),
            params: match params {
                Value::Object(map) => map,
                _ => Map::new(),
            },
        }
    }

    /// A parameter counts as present when it is neither absent, null, nor an empty string.
    pub fn has_param(&self, key: &str) -> bool {
        match self.params.get(key) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        }
    }
}

/// Structured reason a single command did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandFailure {
    pub kind: ErrorKind,
    pub message: String,
    pub retryable: bool,
}

impl From<&CommandError> for CommandFailure {
    fn from(err: &CommandError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            retryable: err.is_retryable(),
        }
    }
}

/// What happened to one command of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOutcome {
    pub command: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub produced_data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandFailure>,
}

impl CommandOutcome {
    pub fn succeeded(command: &str, produced_data: Option<Value>) -> Self {
        Self {
            command: command.to_string(),
            success: true,
            produced_data,
            error: None,
        }
    }

    pub fn failed(command: &str, err: &CommandError) -> Self {
        Self {
            command: command.to_string(),
            success: false,
            produced_data: None,
            error: Some(err.into()),
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}
