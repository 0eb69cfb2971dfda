//! Google Calendar, Gmail, Docs and Drive over plain REST.
//!
//! Every request carries the configured OAuth bearer token. Obtaining or
//! refreshing that token is not handled here.

mod calendar;
mod docs;
mod gmail;

pub use calendar::GoogleCalendar;
pub use docs::GoogleDocs;
pub use gmail::Gmail;

use super::traits::Capabilities;
use crate::config::GoogleConfig;
use crate::llm::{api_error, build_provider_client_with_timeout, sanitize_api_error};
use anyhow::Context;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use url::Url;

/// Shared HTTP client plus bearer token for every Google service.
#[derive(Clone)]
pub struct GoogleHttp {
    client: Client,
    access_token: Option<Arc<str>>,
}

impl GoogleHttp {
    pub fn new(access_token: Option<&str>, client: Client) -> Self {
        Self {
            client,
            access_token: access_token.filter(|t| !t.is_empty()).map(Arc::from),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    fn token(&self) -> anyhow::Result<&str> {
        self.access_token.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "Google access token not configured. Set GOOGLE_ACCESS_TOKEN or google.access_token"
            )
        })
    }

    /// Send with bearer auth; non-2xx responses become sanitized errors.
    pub async fn send(&self, service: &str, request: RequestBuilder) -> anyhow::Result<Response> {
        let token = self.token()?;
        let response = request.bearer_auth(token).send().await.map_err(|e| {
            anyhow::anyhow!("{service} request failed: {}", sanitize_api_error(&e.to_string()))
        })?;

        if !response.status().is_success() {
            return Err(api_error(service, response).await);
        }
        Ok(response)
    }

    pub async fn send_json<T: DeserializeOwned>(
        &self,
        service: &str,
        request: RequestBuilder,
    ) -> anyhow::Result<T> {
        self.send(service, request)
            .await?
            .json::<T>()
            .await
            .with_context(|| format!("decode {service} response"))
    }
}

/// `base` with `segments` appended, each percent-encoded as one path segment.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> anyhow::Result<Url> {
    let mut url = Url::parse(base).with_context(|| format!("invalid API base URL {base}"))?;
    url.path_segments_mut()
        .map_err(|()| anyhow::anyhow!("API base URL {base} cannot carry a path"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Build the Google-backed capability set from configuration.
pub fn capabilities(config: &GoogleConfig, timeout_secs: u64) -> Capabilities {
    let http = GoogleHttp::new(
        config.access_token.as_deref(),
        build_provider_client_with_timeout(timeout_secs),
    );
    Capabilities {
        calendar: Arc::new(GoogleCalendar::new(
            http.clone(),
            &config.calendar_base_url,
            &config.calendar_id,
        )),
        email: Arc::new(Gmail::new(http.clone(), &config.gmail_base_url)),
        documents: Arc::new(GoogleDocs::new(
            http,
            &config.docs_base_url,
            &config.drive_base_url,
        )),
    }
}
