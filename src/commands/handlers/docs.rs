use super::{optional_str, required_str, to_data};
use crate::commands::traits::CommandHandler;
use crate::integrations::{DocumentsApi, ShareRole};
use serde_json::{Map, Value, json};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

const DEFAULT_LIST_SIZE: u32 = 10;
const MAX_LIST_SIZE: u32 = 100;

macro_rules! documents_handler {
    ($name:ident) => {
        pub struct $name {
            documents: Arc<dyn DocumentsApi>,
        }

        impl $name {
            pub fn new(documents: Arc<dyn DocumentsApi>) -> Self {
                Self { documents }
            }
        }
    };
}

documents_handler!(DocsCreate);
documents_handler!(DocsRead);
documents_handler!(DocsList);
documents_handler!(DocsAppend);
documents_handler!(DocsReplace);
documents_handler!(DocsDelete);
documents_handler!(DocsShare);

impl CommandHandler for DocsCreate {
    fn name(&self) -> &str {
        "docs.create"
    }

    fn execute<'a>(
        &'a self,
        params: &'a Map<String, Value>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<Value>>> + Send + 'a>> {
        Box::pin(async move {
            let title = required_str(params, "title")?;
            let content = optional_str(params, "content").unwrap_or_default();
            let info = self.documents.create(title, content).await?;
            tracing::info!(document_id = %info.document_id, title, "created document");
            to_data(&info)
        })
    }
}

impl CommandHandler for DocsRead {
    fn name(&self) -> &str {
        "docs.read"
    }

    fn execute<'a>(
        &'a self,
        params: &'a Map<String, Value>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<Value>>> + Send + 'a>> {
        Box::pin(async move {
            let document_id = required_str(params, "documentId")?;
            let document = self.documents.read(document_id).await?;
            tracing::info!(document_id, chars = document.content.len(), "read document");
            to_data(&document)
        })
    }
}

impl CommandHandler for DocsList {
    fn name(&self) -> &str {
        "docs.list"
    }

    fn execute<'a>(
        &'a self,
        params: &'a Map<String, Value>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<Value>>> + Send + 'a>> {
        Box::pin(async move {
            let max_results = params
                .get("maxResults")
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(DEFAULT_LIST_SIZE)
                .clamp(1, MAX_LIST_SIZE);
            let documents = self.documents.list(max_results).await?;
            tracing::info!(count = documents.len(), "listed documents");
            to_data(&documents)
        })
    }
}

impl CommandHandler for DocsAppend {
    fn name(&self) -> &str {
        "docs.append"
    }

    fn execute<'a>(
        &'a self,
        params: &'a Map<String, Value>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<Value>>> + Send + 'a>> {
        Box::pin(async move {
            let document_id = required_str(params, "documentId")?;
            let content = required_str(params, "content")?;
            let report = self.documents.append(document_id, content).await?;
            tracing::info!(document_id, operations = report.operations, "appended to document");
            to_data(&report)
        })
    }
}

impl CommandHandler for DocsReplace {
    fn name(&self) -> &str {
        "docs.replace"
    }

    fn execute<'a>(
        &'a self,
        params: &'a Map<String, Value>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<Value>>> + Send + 'a>> {
        Box::pin(async move {
            let document_id = required_str(params, "documentId")?;
            let search = required_str(params, "searchText")?;
            let replacement = required_str(params, "replacementText")?;
            let replaced = self
                .documents
                .replace(document_id, search, replacement)
                .await?;
            tracing::info!(document_id, replaced, "replaced document text");
            Ok(Some(json!({ "documentId": document_id, "replaceCount": replaced })))
        })
    }
}

impl CommandHandler for DocsDelete {
    fn name(&self) -> &str {
        "docs.delete"
    }

    fn execute<'a>(
        &'a self,
        params: &'a Map<String, Value>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<Value>>> + Send + 'a>> {
        Box::pin(async move {
            let document_id = required_str(params, "documentId")?;
            self.documents.delete(document_id).await?;
            tracing::info!(document_id, "deleted document");
            Ok(Some(json!({ "deleted": document_id })))
        })
    }
}

impl CommandHandler for DocsShare {
    fn name(&self) -> &str {
        "docs.share"
    }

    fn execute<'a>(
        &'a self,
        params: &'a Map<String, Value>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<Value>>> + Send + 'a>> {
        Box::pin(async move {
            let document_id = required_str(params, "documentId")?;
            let email = required_str(params, "email")?;
            let role = match optional_str(params, "role") {
                Some(role) => role
                    .to_ascii_lowercase()
                    .parse::<ShareRole>()
                    .map_err(|_| anyhow::anyhow!("unsupported share role '{role}'"))?,
                None => ShareRole::default(),
            };
            let receipt = self.documents.share(document_id, email, role).await?;
            tracing::info!(document_id, %role, "shared document");
            to_data(&receipt)
        })
    }
}
