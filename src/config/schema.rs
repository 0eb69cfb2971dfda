use crate::error::ConfigError;
use anyhow::{Context, Result};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Workspace directory - computed from home, not serialized
    #[serde(skip)]
    pub workspace_dir: PathBuf,
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub agent: AgentConfig,

    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    #[serde(default)]
    pub commands: CommandsConfig,

    #[serde(default)]
    pub memory: MemoryConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub google: GoogleConfig,
}

// ── Agent (language model) ───────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Gemini API key. Usually supplied through `GEMINI_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Deadline for one model invocation
    #[serde(default = "default_agent_timeout_secs")]
    pub timeout_secs: u64,
    /// Timezone label placed in the time-context block
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_model() -> String {
    "gemini-2.0-flash".into()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_agent_timeout_secs() -> u64 {
    60
}

fn default_timezone() -> String {
    "Asia/Dhaka".into()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_gemini_base_url(),
            temperature: default_temperature(),
            timeout_secs: default_agent_timeout_secs(),
            timezone: default_timezone(),
        }
    }
}

// ── Orchestrator ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Maximum model invocations per user turn (>= 1)
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
}

fn default_max_rounds() -> u32 {
    5
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_rounds: default_max_rounds(),
        }
    }
}

// ── Command execution ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandsConfig {
    /// Deadline for a single command handler
    #[serde(default = "default_command_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_command_timeout_secs() -> u64 {
    30
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_command_timeout_secs(),
        }
    }
}

// ── Memory ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// "sqlite" (default), "file", or "none"
    #[serde(default = "default_memory_backend")]
    pub backend: String,
    /// Override for the database or JSON file location
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_memory_backend() -> String {
    "sqlite".into()
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            backend: default_memory_backend(),
            path: None,
        }
    }
}

// ── Gateway ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway host (default: 127.0.0.1)
    #[serde(default = "default_gateway_host")]
    pub host: String,
    /// Gateway port (default: 3000)
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

fn default_gateway_host() -> String {
    "127.0.0.1".into()
}

fn default_gateway_port() -> u16 {
    3000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

// ── Google APIs ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// OAuth bearer token. Acquiring and refreshing it happens elsewhere.
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
    #[serde(default = "default_calendar_base_url")]
    pub calendar_base_url: String,
    #[serde(default = "default_gmail_base_url")]
    pub gmail_base_url: String,
    #[serde(default = "default_docs_base_url")]
    pub docs_base_url: String,
    #[serde(default = "default_drive_base_url")]
    pub drive_base_url: String,
}

fn default_calendar_id() -> String {
    "primary".into()
}

fn default_calendar_base_url() -> String {
    "https://www.googleapis.com/calendar/v3".into()
}

fn default_gmail_base_url() -> String {
    "https://gmail.googleapis.com/gmail/v1".into()
}

fn default_docs_base_url() -> String {
    "https://docs.googleapis.com/v1".into()
}

fn default_drive_base_url() -> String {
    "https://www.googleapis.com/drive/v3".into()
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            calendar_id: default_calendar_id(),
            calendar_base_url: default_calendar_base_url(),
            gmail_base_url: default_gmail_base_url(),
            docs_base_url: default_docs_base_url(),
            drive_base_url: default_drive_base_url(),
        }
    }
}

// ── Loading, overrides, validation ───────────────────────────────

impl Config {
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        Self::load_or_init_in(&home.join(".conscia"))
    }

    /// Load `config.toml` from `conscia_dir`, writing defaults on first run.
    pub fn load_or_init_in(conscia_dir: &Path) -> Result<Self> {
        let config_path = conscia_dir.join("config.toml");
        let workspace_dir = conscia_dir.join("workspace");

        if !workspace_dir.exists() {
            fs::create_dir_all(&workspace_dir).context("Failed to create workspace directory")?;
        }

        if config_path.exists() {
            let contents =
                fs::read_to_string(&config_path).context("Failed to read config file")?;
            let mut config: Config = toml::from_str(&contents)
                .map_err(|e| ConfigError::Load(e.to_string()))
                .context("Failed to parse config file")?;
            config.config_path = config_path;
            config.workspace_dir = workspace_dir;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self {
                config_path,
                workspace_dir,
                ..Self::default()
            };
            config.validate()?;
            config.save()?;
            Ok(config)
        }
    }

    /// Apply `CONSCIA_*` environment overrides, falling back to the
    /// unprefixed names the deployment environment already exports.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |primary: &str, fallback: Option<&str>| {
            lookup(primary)
                .or_else(|| fallback.and_then(&lookup))
                .filter(|v| !v.is_empty())
        };

        if let Some(key) = var("CONSCIA_API_KEY", Some("GEMINI_API_KEY")) {
            self.agent.api_key = Some(key);
        }
        if let Some(model) = var("CONSCIA_MODEL", Some("GEMINI_MODEL")) {
            self.agent.model = model;
        }
        if let Some(base_url) = var("CONSCIA_BASE_URL", Some("GEMINI_BASE_URL")) {
            self.agent.base_url = base_url;
        }
        if let Some(timezone) = var("CONSCIA_TIMEZONE", None) {
            self.agent.timezone = timezone;
        }
        if let Some(rounds) = var("CONSCIA_MAX_ROUNDS", None) {
            match rounds.parse() {
                Ok(rounds) => self.orchestrator.max_rounds = rounds,
                Err(_) => tracing::warn!(value = %rounds, "ignoring invalid CONSCIA_MAX_ROUNDS"),
            }
        }
        if let Some(backend) = var("CONSCIA_MEMORY_BACKEND", None) {
            self.memory.backend = backend;
        }
        if let Some(token) = var("CONSCIA_GOOGLE_TOKEN", Some("GOOGLE_ACCESS_TOKEN")) {
            self.google.access_token = Some(token);
        }
        if let Some(host) = var("CONSCIA_HOST", None) {
            self.gateway.host = host;
        }
        if let Some(port) = var("CONSCIA_PORT", Some("PORT")) {
            match port.parse() {
                Ok(port) => self.gateway.port = port,
                Err(_) => tracing::warn!(value = %port, "ignoring invalid gateway port override"),
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.orchestrator.max_rounds == 0 {
            return Err(ConfigError::Validation(
                "orchestrator.max_rounds must be >= 1".into(),
            ));
        }
        if self.agent.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "agent.timeout_secs must be >= 1".into(),
            ));
        }
        if self.commands.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "commands.timeout_secs must be >= 1".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.agent.temperature) {
            return Err(ConfigError::Validation(
                "agent.temperature must be in [0.0, 2.0]".into(),
            ));
        }
        for (label, value) in [
            ("agent.base_url", &self.agent.base_url),
            ("google.calendar_base_url", &self.google.calendar_base_url),
            ("google.gmail_base_url", &self.google.gmail_base_url),
            ("google.docs_base_url", &self.google.docs_base_url),
            ("google.drive_base_url", &self.google.drive_base_url),
        ] {
            url::Url::parse(value)
                .map_err(|e| ConfigError::Validation(format!("{label} is not a valid URL: {e}")))?;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }
}
