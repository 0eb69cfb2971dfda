use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `conscia`.
///
/// Only failures that must abort a turn or the process surface here. Failures
/// the orchestrator recovers from (a malformed model reply, a single failing
/// command) are reported as values carrying an [`ErrorKind`] instead.
#[derive(Debug, Error)]
pub enum ConsciaError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Language model ───────────────────────────────────────────────────
    #[error("upstream: {0}")]
    Upstream(#[from] UpstreamError),

    // ── Memory ───────────────────────────────────────────────────────────
    #[error("memory: {0}")]
    Memory(#[from] MemoryError),

    // ── Commands ─────────────────────────────────────────────────────────
    #[error("command: {0}")]
    Command(#[from] CommandError),

    // ── Gateway ──────────────────────────────────────────────────────────
    #[error("gateway: {0}")]
    Gateway(String),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Error taxonomy ──────────────────────────────────────────────────────────

/// Failure classes reported to callers alongside partial results.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    UpstreamError,
    ParseError,
    RoundLimitExceeded,
    CommandError,
    UnknownCommand,
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Upstream (language model) errors ────────────────────────────────────────

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("provider {provider} request failed: {message}")]
    Request { provider: String, message: String },

    #[error("provider {provider} did not answer within {secs}s")]
    Timeout { provider: String, secs: u64 },
}

impl UpstreamError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::UpstreamError
    }

    /// Timeouts are worth retrying; a rejected request usually is not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

// ─── Memory errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("load failed: {0}")]
    Load(String),

    #[error("persist failed: {0}")]
    Persist(String),

    #[error("invalid memory document: {0}")]
    Invalid(String),
}

// ─── Command errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unknown command {name}")]
    Unknown { name: String },

    #[error("command {name} is missing required params: {}", missing.join(", "))]
    MissingParams { name: String, missing: Vec<String> },

    #[error("command {name} failed: {message}")]
    Execution { name: String, message: String },

    #[error("command {name} did not finish within {secs}s")]
    Timeout { name: String, secs: u64 },

    #[error("command registry mismatch: {0}")]
    Registry(String),
}

impl CommandError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unknown { .. } => ErrorKind::UnknownCommand,
            Self::MissingParams { .. }
            | Self::Execution { .. }
            | Self::Timeout { .. }
            | Self::Registry(_) => ErrorKind::CommandError,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, ConsciaError>;
