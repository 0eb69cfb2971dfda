use super::{GoogleHttp, endpoint};
use crate::docedit::{compile_block, to_batch_requests};
use crate::integrations::traits::DocumentsApi;
use crate::integrations::types::{
    AppendReport, DocumentContent, DocumentInfo, DocumentSummary, ShareReceipt, ShareRole,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::future::Future;
use std::pin::Pin;

const DOCS: &str = "Docs";
const DRIVE: &str = "Drive";
const DOCUMENT_MIME_QUERY: &str =
    "mimeType='application/vnd.google-apps.document' and trashed=false";

/// First insertable index of an empty document body.
const BODY_START: usize = 1;

pub struct GoogleDocs {
    http: GoogleHttp,
    docs_base_url: String,
    drive_base_url: String,
}

// ── Docs API document model (only what we read) ──────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    document_id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    body: Body,
}

#[derive(Debug, Default, Deserialize)]
struct Body {
    #[serde(default)]
    content: Vec<StructuralElement>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StructuralElement {
    end_index: Option<usize>,
    paragraph: Option<Paragraph>,
    table: Option<Table>,
}

#[derive(Debug, Default, Deserialize)]
struct Paragraph {
    #[serde(default)]
    elements: Vec<ParagraphElement>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParagraphElement {
    text_run: Option<TextRun>,
}

#[derive(Debug, Default, Deserialize)]
struct TextRun {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Table {
    #[serde(default)]
    table_rows: Vec<TableRow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableRow {
    #[serde(default)]
    table_cells: Vec<TableCell>,
}

#[derive(Debug, Default, Deserialize)]
struct TableCell {
    #[serde(default)]
    content: Vec<StructuralElement>,
}

impl Document {
    /// Where appended text goes: just before the body's final line break.
    fn append_anchor(&self) -> usize {
        self.body
            .content
            .last()
            .and_then(|element| element.end_index)
            .map_or(BODY_START, |end| end.saturating_sub(1).max(BODY_START))
    }

    fn plain_text(&self) -> String {
        let mut text = String::new();
        for element in &self.body.content {
            push_element_text(element, &mut text);
        }
        text.trim().to_string()
    }
}

fn push_paragraph_text(paragraph: &Paragraph, out: &mut String) {
    for run in paragraph.elements.iter().filter_map(|e| e.text_run.as_ref()) {
        out.push_str(&run.content);
    }
}

fn push_element_text(element: &StructuralElement, out: &mut String) {
    if let Some(paragraph) = &element.paragraph {
        push_paragraph_text(paragraph, out);
    }
    if let Some(table) = &element.table {
        for row in &table.table_rows {
            let cells: Vec<String> = row
                .table_cells
                .iter()
                .map(|cell| {
                    let mut cell_text = String::new();
                    for paragraph in cell.content.iter().filter_map(|c| c.paragraph.as_ref()) {
                        push_paragraph_text(paragraph, &mut cell_text);
                    }
                    cell_text.trim().to_string()
                })
                .collect();
            out.push_str(&cells.join("\t"));
            out.push('\n');
        }
    }
}

// ── Drive responses ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: Option<String>,
    #[serde(default)]
    name: String,
    created_time: Option<String>,
    modified_time: Option<String>,
    web_view_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct Permission {
    id: String,
}

#[derive(Debug, Default, Deserialize)]
struct BatchUpdateResponse {
    #[serde(default)]
    replies: Vec<Value>,
}

impl GoogleDocs {
    pub fn new(http: GoogleHttp, docs_base_url: &str, drive_base_url: &str) -> Self {
        Self {
            http,
            docs_base_url: docs_base_url.to_string(),
            drive_base_url: drive_base_url.to_string(),
        }
    }

    async fn get_document(&self, document_id: &str) -> anyhow::Result<Document> {
        let url = endpoint(&self.docs_base_url, &["documents", document_id])?;
        self.http.send_json(DOCS, self.http.client().get(url)).await
    }

    async fn batch_update(
        &self,
        document_id: &str,
        requests: Vec<Value>,
    ) -> anyhow::Result<BatchUpdateResponse> {
        let url = endpoint(
            &self.docs_base_url,
            &["documents", &format!("{document_id}:batchUpdate")],
        )?;
        let request = self
            .http
            .client()
            .post(url)
            .json(&json!({ "requests": requests }));
        self.http.send_json(DOCS, request).await
    }

    async fn append_markdown(
        &self,
        document_id: &str,
        content: &str,
    ) -> anyhow::Result<AppendReport> {
        let document = self.get_document(document_id).await?;
        let block = compile_block(content, document.append_anchor());

        if !block.is_empty() {
            self.batch_update(document_id, to_batch_requests(&block.operations))
                .await?;
        }
        tracing::debug!(
            document_id,
            start_index = block.start_index,
            end_index = block.end_index,
            operations = block.operations.len(),
            "appended formatted content"
        );

        Ok(AppendReport {
            document_id: document_id.to_string(),
            start_index: block.start_index,
            operations: block.operations.len(),
        })
    }
}

impl DocumentsApi for GoogleDocs {
    fn create<'a>(
        &'a self,
        title: &'a str,
        content: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<DocumentInfo>> + Send + 'a>> {
        Box::pin(async move {
            let url = endpoint(&self.docs_base_url, &["documents"])?;
            let request = self.http.client().post(url).json(&json!({ "title": title }));
            let created: Document = self.http.send_json(DOCS, request).await?;

            if !content.trim().is_empty() {
                self.append_markdown(&created.document_id, content).await?;
            }

            let url = endpoint(&self.drive_base_url, &["files", &created.document_id])?;
            let request = self
                .http
                .client()
                .get(url)
                .query(&[("fields", "webViewLink,name")]);
            let file: DriveFile = self.http.send_json(DRIVE, request).await?;

            Ok(DocumentInfo {
                title: if file.name.is_empty() {
                    created.title
                } else {
                    file.name
                },
                document_id: created.document_id,
                web_view_link: file.web_view_link,
            })
        })
    }

    fn read<'a>(
        &'a self,
        document_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<DocumentContent>> + Send + 'a>> {
        Box::pin(async move {
            let document = self.get_document(document_id).await?;
            Ok(DocumentContent {
                content: document.plain_text(),
                document_id: document.document_id,
                title: document.title,
            })
        })
    }

    fn list(
        &self,
        max_results: u32,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<DocumentSummary>>> + Send + '_>> {
        Box::pin(async move {
            let url = endpoint(&self.drive_base_url, &["files"])?;
            let page_size = max_results.to_string();
            let request = self.http.client().get(url).query(&[
                ("q", DOCUMENT_MIME_QUERY),
                ("spaces", "drive"),
                (
                    "fields",
                    "files(id,name,createdTime,modifiedTime,webViewLink)",
                ),
                ("pageSize", page_size.as_str()),
                ("orderBy", "modifiedTime desc"),
            ]);
            let list: DriveFileList = self.http.send_json(DRIVE, request).await?;

            Ok(list
                .files
                .into_iter()
                .filter_map(|file| {
                    Some(DocumentSummary {
                        document_id: file.id?,
                        title: file.name,
                        created_time: file.created_time,
                        modified_time: file.modified_time,
                        web_view_link: file.web_view_link,
                    })
                })
                .collect())
        })
    }

    fn append<'a>(
        &'a self,
        document_id: &'a str,
        content: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<AppendReport>> + Send + 'a>> {
        Box::pin(self.append_markdown(document_id, content))
    }

    fn replace<'a>(
        &'a self,
        document_id: &'a str,
        search: &'a str,
        replacement: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<u64>> + Send + 'a>> {
        Box::pin(async move {
            let requests = vec![json!({
                "replaceAllText": {
                    "containsText": { "text": search, "matchCase": false },
                    "replaceText": replacement,
                }
            })];
            let response = self.batch_update(document_id, requests).await?;
            Ok(response
                .replies
                .first()
                .and_then(|reply| reply["replaceAllText"]["occurrencesChanged"].as_u64())
                .unwrap_or(0))
        })
    }

    fn delete<'a>(
        &'a self,
        document_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let url = endpoint(&self.drive_base_url, &["files", document_id])?;
            self.http.send(DRIVE, self.http.client().delete(url)).await?;
            Ok(())
        })
    }

    fn share<'a>(
        &'a self,
        document_id: &'a str,
        email: &'a str,
        role: ShareRole,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<ShareReceipt>> + Send + 'a>> {
        Box::pin(async move {
            let url = endpoint(&self.drive_base_url, &["files", document_id, "permissions"])?;
            let request = self
                .http
                .client()
                .post(url)
                .query(&[("fields", "id")])
                .json(&json!({
                    "role": role,
                    "type": "user",
                    "emailAddress": email,
                }));
            let permission: Permission = self.http.send_json(DRIVE, request).await?;
            Ok(ShareReceipt {
                document_id: document_id.to_string(),
                shared_with: email.to_string(),
                role,
                permission_id: permission.id,
            })
        })
    }
}
