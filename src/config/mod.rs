pub mod schema;

pub use schema::{
    AgentConfig, CommandsConfig, Config, GatewayConfig, GoogleConfig, MemoryConfig,
    OrchestratorConfig,
};
