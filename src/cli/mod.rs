use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `Conscia` - a personal assistant for calendar, email and documents.
#[derive(Parser, Debug)]
#[command(name = "conscia")]
#[command(version)]
#[command(about = "Turn natural-language requests into calendar, email and document actions.", long_about = None)]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a single turn and print the reply
    Chat {
        /// The request, e.g. "schedule a walk tomorrow 8am for 30 minutes"
        #[arg(short, long)]
        message: String,
    },

    /// Start the HTTP gateway
    Gateway {
        /// Port to listen on (use 0 for random available port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
    },

    /// Inspect or seed the stored memory document
    Memory {
        #[command(subcommand)]
        memory_command: MemoryCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum MemoryCommands {
    /// Write the current snapshot as JSON
    Export {
        /// Output file (default: <workspace>/memory-export.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace the snapshot with a JSON file holding exactly the three tiers
    Seed {
        /// JSON file with `immutable`, `mutable` and `archive`
        file: PathBuf,
    },
}
