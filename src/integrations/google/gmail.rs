use super::{GoogleHttp, endpoint};
use crate::integrations::traits::EmailApi;
use crate::integrations::types::{OutgoingEmail, SentEmail};
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use serde::Deserialize;
use serde_json::json;
use std::future::Future;
use std::pin::Pin;

const SERVICE: &str = "Gmail";

pub struct Gmail {
    http: GoogleHttp,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

impl Gmail {
    pub fn new(http: GoogleHttp, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
        }
    }
}

/// Header values must stay on one line.
fn header_value(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

/// RFC 2047 encoded-word for non-ASCII header text.
fn encode_header(value: &str) -> String {
    let value = header_value(value);
    if value.is_ascii() {
        value
    } else {
        format!("=?UTF-8?B?{}?=", STANDARD.encode(value))
    }
}

/// Plain-text RFC 822 message, base64url without padding as Gmail expects.
pub(crate) fn raw_message(email: &OutgoingEmail) -> String {
    let message = [
        format!("To: {}", header_value(&email.to)),
        "Content-Type: text/plain; charset=utf-8".to_string(),
        "MIME-Version: 1.0".to_string(),
        format!("Subject: {}", encode_header(&email.subject)),
        String::new(),
        email.body.clone(),
    ]
    .join("\r\n");
    URL_SAFE_NO_PAD.encode(message)
}

impl EmailApi for Gmail {
    fn send<'a>(
        &'a self,
        email: &'a OutgoingEmail,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<SentEmail>> + Send + 'a>> {
        Box::pin(async move {
            let url = endpoint(&self.base_url, &["users", "me", "messages", "send"])?;
            let request = self
                .http
                .client()
                .post(url)
                .json(&json!({ "raw": raw_message(email) }));
            let sent: SendResponse = self.http.send_json(SERVICE, request).await?;
            Ok(SentEmail { id: sent.id })
        })
    }
}
