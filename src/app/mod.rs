//! Start-up wiring shared by the CLI subcommands.

pub mod dispatch;

pub use dispatch::{build_orchestrator, export_memory, run_chat, run_gateway, seed_memory};
