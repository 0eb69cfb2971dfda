//! The agent proxy: one model round trip per call.

pub mod prompt;
pub mod proxy;

pub use prompt::{TimeContext, build_payload};
pub use proxy::{AgentProxy, strip_code_fences};
