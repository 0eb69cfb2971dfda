//! The bot loop: one user turn from prompt to executed commands.

pub mod orchestrator;
pub mod response;

pub use orchestrator::{
    APOLOGY_REPLY, BotReply, Orchestrator, TurnFailure, TurnOutcome, TurnState,
};
pub use response::{ModelResponse, ResponseError};
