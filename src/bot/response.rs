use crate::commands::Command;
use crate::error::MemoryError;
use crate::memory::MemorySnapshot;
use serde::Deserialize;
use thiserror::Error;

/// The JSON object the model must answer with.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelResponse {
    /// Full replacement of the memory document, when the model changed it.
    #[serde(default)]
    pub updated_memory: Option<MemorySnapshot>,
    #[serde(default)]
    pub commands: Option<Vec<Command>>,
    pub user_reply: String,
}

#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("reply does not match the response contract: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("updated_memory rejected: {0}")]
    Memory(#[from] MemoryError),
}

impl ModelResponse {
    /// Parse cleaned model text. Any deviation from the contract is an error;
    /// nothing from a malformed reply is ever applied.
    pub fn parse(raw: &str) -> Result<Self, ResponseError> {
        let response: Self = serde_json::from_str(raw)?;
        if let Some(memory) = &response.updated_memory {
            memory.validate()?;
        }
        Ok(response)
    }

    pub fn commands(&self) -> &[Command] {
        self.commands.as_deref().unwrap_or_default()
    }
}
