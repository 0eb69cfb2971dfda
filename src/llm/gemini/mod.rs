//! Google Gemini provider over the `generateContent` REST endpoint.

use crate::llm::{build_provider_client, sanitize_api_error, traits::Provider};
use anyhow::Context;
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;

mod types;
use types::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part};

const MAX_OUTPUT_TOKENS: u32 = 8192;

pub struct GeminiProvider {
    api_key: Option<String>,
    base_url: String,
    client: Client,
}

impl GeminiProvider {
    pub fn new(api_key: Option<&str>, base_url: &str) -> Self {
        Self::with_client(api_key, base_url, build_provider_client())
    }

    pub fn with_client(api_key: Option<&str>, base_url: &str, client: Client) -> Self {
        Self {
            api_key: api_key.map(String::from).filter(|k| !k.is_empty()),
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn build_request(message: &str, temperature: f64) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: message.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        }
    }

    fn model_name(model: &str) -> String {
        if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        }
    }

    fn api_key(&self) -> anyhow::Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "Gemini API key not found. Set GEMINI_API_KEY or agent.api_key in config.toml"
            )
        })
    }

    async fn call_api(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> anyhow::Result<GenerateContentResponse> {
        let api_key = self.api_key()?;
        let url = format!(
            "{}/{}:generateContent?key={api_key}",
            self.base_url,
            Self::model_name(model)
        );

        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                anyhow::anyhow!("Gemini request failed: {}", sanitize_api_error(&e.to_string()))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("read Gemini response body")?;

        // An error object wins over the status code: it carries the useful message.
        if let Ok(result) = serde_json::from_str::<GenerateContentResponse>(&body) {
            if let Some(err) = result.error.as_ref() {
                anyhow::bail!("Gemini API error ({status}): {}", sanitize_api_error(&err.message));
            }
            if status.is_success() {
                return Ok(result);
            }
        }

        if !status.is_success() {
            anyhow::bail!("Gemini API error ({status}): {}", sanitize_api_error(&body));
        }
        anyhow::bail!("Gemini returned an unreadable response body")
    }

    fn extract_text(result: &GenerateContentResponse) -> anyhow::Result<String> {
        let text = result
            .candidates
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default();

        if text.is_empty() {
            anyhow::bail!("No response from Gemini");
        }

        Ok(text)
    }
}

impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn chat<'a>(
        &'a self,
        message: &'a str,
        model: &'a str,
        temperature: f64,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let request = Self::build_request(message, temperature);
            let result = self.call_api(model, &request).await?;
            Self::extract_text(&result)
        })
    }
}
