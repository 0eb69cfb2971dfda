#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

use anyhow::Result;
use clap::Parser;
use conscia::Config;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod cli;

use cli::{Cli, Commands, MemoryCommands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let mut config = Config::load_or_init()?;
    config.apply_env_overrides();
    config.validate()?;

    match cli.command {
        Commands::Chat { message } => conscia::app::run_chat(&config, &message).await,
        Commands::Gateway { port, host } => {
            conscia::app::run_gateway(&config, host.as_deref(), port).await
        }
        Commands::Memory { memory_command } => match memory_command {
            MemoryCommands::Export { output } => {
                conscia::app::export_memory(&config, output.as_deref()).await
            }
            MemoryCommands::Seed { file } => conscia::app::seed_memory(&config, &file).await,
        },
    }
}
