#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::unnecessary_literal_bound,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod agent;
pub mod app;
pub mod bot;
pub mod commands;
pub mod config;
pub mod docedit;
pub mod error;
pub mod gateway;
pub mod integrations;
pub mod llm;
pub mod memory;

pub use bot::{BotReply, Orchestrator, TurnOutcome};
pub use config::Config;
pub use error::{ConsciaError, ErrorKind};
