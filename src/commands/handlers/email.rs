use super::{required_str, to_data};
use crate::commands::traits::CommandHandler;
use crate::integrations::{EmailApi, OutgoingEmail};
use serde_json::{Map, Value};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub struct EmailSend {
    email: Arc<dyn EmailApi>,
}

impl EmailSend {
    pub fn new(email: Arc<dyn EmailApi>) -> Self {
        Self { email }
    }
}

impl CommandHandler for EmailSend {
    fn name(&self) -> &str {
        "email.send"
    }

    fn execute<'a>(
        &'a self,
        params: &'a Map<String, Value>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<Value>>> + Send + 'a>> {
        Box::pin(async move {
            let message = OutgoingEmail {
                to: required_str(params, "to")?.to_string(),
                subject: required_str(params, "subject")?.to_string(),
                body: required_str(params, "body")?.to_string(),
            };
            let sent = self.email.send(&message).await?;
            tracing::info!(message_id = %sent.id, to = %message.to, "email sent");
            to_data(&sent)
        })
    }
}
