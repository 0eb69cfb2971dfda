use super::prompt::{SYSTEM_INSTRUCTIONS, TimeContext, build_payload};
use crate::commands::CommandCatalog;
use crate::config::AgentConfig;
use crate::error::UpstreamError;
use crate::llm::{Provider, sanitize_api_error};
use crate::memory::MemorySnapshot;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Builds one request per round, sends it to the model and returns the
/// cleaned reply text. Does not interpret the reply.
pub struct AgentProxy {
    provider: Arc<dyn Provider>,
    catalog_metadata: Value,
    model: String,
    temperature: f64,
    timeout: Duration,
    timezone: String,
}

impl AgentProxy {
    pub fn new(
        provider: Arc<dyn Provider>,
        catalog: &CommandCatalog,
        config: &AgentConfig,
    ) -> Self {
        Self {
            provider,
            catalog_metadata: catalog.to_metadata(),
            model: config.model.clone(),
            temperature: config.temperature,
            timeout: Duration::from_secs(config.timeout_secs),
            timezone: config.timezone.clone(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build_request(
        &self,
        user_prompt: &str,
        memory: &MemorySnapshot,
        additional_data: Option<&Value>,
        time: &TimeContext,
    ) -> String {
        build_payload(
            SYSTEM_INSTRUCTIONS,
            time,
            &self.catalog_metadata,
            user_prompt,
            memory,
            additional_data,
        )
    }

    pub async fn invoke(
        &self,
        user_prompt: &str,
        memory: &MemorySnapshot,
        additional_data: Option<&Value>,
    ) -> Result<String, UpstreamError> {
        let time = TimeContext::now(&self.timezone);
        let request = self.build_request(user_prompt, memory, additional_data, &time);
        let provider = self.provider.name().to_string();

        tracing::debug!(
            provider = %provider,
            model = %self.model,
            bytes = request.len(),
            with_additional_data = additional_data.is_some(),
            "invoking model"
        );

        let reply = tokio::time::timeout(
            self.timeout,
            self.provider.chat(&request, &self.model, self.temperature),
        )
        .await
        .map_err(|_| UpstreamError::Timeout {
            provider: provider.clone(),
            secs: self.timeout.as_secs(),
        })?
        .map_err(|e| UpstreamError::Request {
            provider: provider.clone(),
            message: sanitize_api_error(&format!("{e:#}")),
        })?;

        Ok(strip_code_fences(&reply))
    }
}

/// Remove markdown code-fence markers the model tends to wrap JSON in.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}
