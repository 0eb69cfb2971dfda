use crate::agent::AgentProxy;
use crate::bot::Orchestrator;
use crate::commands::{CommandCatalog, CommandDispatcher, CommandRegistry};
use crate::config::Config;
use crate::integrations::google;
use crate::llm::{GeminiProvider, Provider, build_provider_client_with_timeout};
use crate::memory::{self, MemoryStore};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Build the full turn pipeline from configuration.
///
/// 1. Gemini provider behind the agent proxy.
/// 2. Google capabilities bound into the command registry.
/// 3. Dispatcher over the built-in catalog (registry validated here).
/// 4. Memory store from `[memory]`.
pub async fn build_orchestrator(config: &Config) -> Result<Orchestrator> {
    let client = build_provider_client_with_timeout(config.agent.timeout_secs);
    let provider: Arc<dyn Provider> = Arc::new(GeminiProvider::with_client(
        config.agent.api_key.as_deref(),
        &config.agent.base_url,
        client,
    ));

    let catalog = Arc::new(CommandCatalog::builtin());
    let agent = AgentProxy::new(provider, &catalog, &config.agent);

    let capabilities = google::capabilities(&config.google, config.commands.timeout_secs);
    let registry = CommandRegistry::with_capabilities(&capabilities);
    let dispatcher = CommandDispatcher::new(
        Arc::clone(&catalog),
        registry,
        Duration::from_secs(config.commands.timeout_secs),
    )
    .context("command registry does not match the catalog")?;

    let store = open_store(config).await?;

    info!(
        model = %config.agent.model,
        commands = catalog.len(),
        memory = store.name(),
        max_rounds = config.orchestrator.max_rounds,
        "orchestrator ready"
    );

    Ok(Orchestrator::new(
        agent,
        dispatcher,
        store,
        config.orchestrator.max_rounds,
    ))
}

async fn open_store(config: &Config) -> Result<Arc<dyn MemoryStore>> {
    memory::create_memory_store(&config.memory, &config.workspace_dir).await
}

/// Run a single turn and print the reply.
pub async fn run_chat(config: &Config, message: &str) -> Result<()> {
    let orchestrator = build_orchestrator(config).await?;
    let outcome = orchestrator.handle(message).await?;

    println!("{}", outcome.reply.user_reply);

    for result in outcome.outcomes.iter().filter(|o| !o.success) {
        if let Some(error) = &result.error {
            eprintln!("! {} skipped: {}", result.command, error.message);
        }
    }
    info!(
        turn_id = %outcome.turn_id,
        rounds = outcome.rounds,
        commands = outcome.reply.commands.len(),
        "chat turn complete"
    );
    Ok(())
}

/// Serve the HTTP entry point.
pub async fn run_gateway(config: &Config, host: Option<&str>, port: Option<u16>) -> Result<()> {
    let host = host.unwrap_or(config.gateway.host.as_str());
    let port = port.unwrap_or(config.gateway.port);
    let orchestrator = build_orchestrator(config).await?;
    let timeout = crate::gateway::request_timeout(config);
    crate::gateway::run_gateway(host, port, orchestrator, timeout).await
}

/// Write the current snapshot to `output`, or to `memory-export.json` in the
/// workspace.
pub async fn export_memory(config: &Config, output: Option<&Path>) -> Result<()> {
    let store = open_store(config).await?;
    let default_path = config.workspace_dir.join("memory-export.json");
    let output = output.unwrap_or(&default_path);
    memory::export_to_file(store.as_ref(), output).await?;
    println!("✓ Memory exported to {}", output.display());
    Ok(())
}

/// Replace the stored snapshot with the document in `input`.
pub async fn seed_memory(config: &Config, input: &Path) -> Result<()> {
    let store = open_store(config).await?;
    memory::seed_from_file(store.as_ref(), input).await?;
    println!("✓ Memory seeded from {}", input.display());
    Ok(())
}
