//! HTTP client for the audit-knowledge backend.
//!
//! Four independent operations, one request/response each, no retries.
//! Any non-success status surfaces the raw response body as the failure
//! detail; the panes decide how to display it.

pub mod models;

use std::path::Path;

use reqwest::{multipart, Client, StatusCode};
use thiserror::Error;

use models::{
    AgentMode, AgentRequest, AgentResponse, ChatRequest, ChatResponse, DocumentItem,
    DraftRequest, IngestResponse,
};

/// Uniform failure signal for all backend operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-success status; `body` is the raw response text.
    #[error("backend returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    /// Connection failure or undecodable response body.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    /// The selected upload file could not be read.
    #[error("cannot read {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Client for the fixed backend contract. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /api/ingest` - multipart upload of one document.
    ///
    /// `file` is mandatory and read from disk here; the metadata fields
    /// are attached only when non-empty. `year` and `tags` are forwarded
    /// verbatim, validation belongs to the backend.
    #[tracing::instrument(skip_all, fields(file = %file.display()))]
    pub async fn ingest_document(
        &self,
        file: &Path,
        source_unit: &str,
        year: &str,
        tags: &str,
    ) -> Result<IngestResponse> {
        let bytes = tokio::fs::read(file).await.map_err(|source| ApiError::FileRead {
            path: file.display().to_string(),
            source,
        })?;

        let filename = file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
            .to_string();

        let part = multipart::Part::bytes(bytes)
            .file_name(filename)
            .mime_str(mime_for(file))?;

        let mut form = multipart::Form::new().part("file", part);
        if !source_unit.is_empty() {
            form = form.text("source_unit", source_unit.to_string());
        }
        if !year.is_empty() {
            form = form.text("year", year.to_string());
        }
        if !tags.is_empty() {
            form = form.text("tags", tags.to_string());
        }

        let response = self
            .http
            .post(format!("{}/api/ingest", self.base_url))
            .multipart(form)
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }

    /// `GET /api/documents` - full metadata listing, no pagination.
    #[tracing::instrument(skip(self))]
    pub async fn list_documents(&self) -> Result<Vec<DocumentItem>> {
        let response = self
            .http
            .get(format!("{}/api/documents", self.base_url))
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }

    /// `POST /api/chat` - retrieval-augmented question answering.
    #[tracing::instrument(skip_all, fields(user = %user, query_len = query.len()))]
    pub async fn ask_chat(&self, user: &str, query: &str) -> Result<ChatResponse> {
        let body = ChatRequest {
            user: user.to_string(),
            query: query.to_string(),
        };

        let response = self
            .http
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }

    /// `POST /api/agent/run` - generated draft for an engagement payload.
    #[tracing::instrument(skip_all, fields(mode = ?mode, user = %user))]
    pub async fn run_agent(
        &self,
        mode: AgentMode,
        user: &str,
        payload: DraftRequest,
    ) -> Result<AgentResponse> {
        let body = AgentRequest {
            mode,
            user: user.to_string(),
            payload,
        };

        let response = self
            .http
            .post(format!("{}/api/agent/run", self.base_url))
            .json(&body)
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }
}

/// Map a non-success status to `ApiError::Status` carrying the body text.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status { status, body })
}

/// Content type for the upload part, by file extension.
fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use wiremock::matchers::{body_json_string, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_mime_for_extensions() {
        assert_eq!(mime_for(Path::new("a.pdf")), "application/pdf");
        assert_eq!(mime_for(Path::new("a.PDF")), "application/pdf");
        assert!(mime_for(Path::new("a.docx")).contains("wordprocessingml"));
        assert_eq!(mime_for(Path::new("a.bin")), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_list_documents_decodes_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/documents"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"[{"id":1,"filename":"sop.pdf","type":"pdf",
                     "uploaded_at":"2024-03-01T09:30:00","source_unit":"Procurement","year":2024}]"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri());
        let docs = client.list_documents().await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].filename, "sop.pdf");
        assert_eq!(docs[0].year, Some(2024));
    }

    #[tokio::test]
    async fn test_list_documents_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/documents"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("[]", "application/json"))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri());
        assert!(client.list_documents().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_success_surfaces_raw_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(500).set_body_string("embedding service down"))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri());
        let err = client.ask_chat("demo", "anything").await.unwrap_err();
        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status.as_u16(), 500);
                assert_eq!(body, "embedding service down");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_ask_chat_sends_user_and_query() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_json_string(
                r#"{"user":"demo","query":"Apa objective audit procurement?"}"#,
            ))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"answer":"...","citations":[{"filename":"a.pdf","page":2,"snippet":"..."}]}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri());
        let resp = client
            .ask_chat("demo", "Apa objective audit procurement?")
            .await
            .unwrap();
        assert_eq!(resp.citations.len(), 1);
        assert_eq!(resp.citations[0].page_label(), "2");
    }

    #[tokio::test]
    async fn test_run_agent_sends_fixed_mode_literal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/agent/run"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"content":"draft text","citations":[]}"#,
                "application/json",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri());
        let resp = client
            .run_agent(AgentMode::DraftAuditPlan, "demo", DraftRequest::default())
            .await
            .unwrap();
        assert_eq!(resp.content, "draft text");
        assert!(resp.citations.is_empty());
    }

    #[tokio::test]
    async fn test_ingest_uploads_multipart_and_decodes_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/ingest"))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_raw(r#"{"document_id":42}"#, "application/json"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.write_all(b"%PDF-1.4 test").unwrap();

        let client = ApiClient::new(server.uri());
        let resp = client
            .ingest_document(file.path(), "Internal Audit", "2024", r#"{"process":"audit"}"#)
            .await
            .unwrap();
        assert_eq!(resp.document_id, 42);
    }

    #[tokio::test]
    async fn test_ingest_missing_file_fails_before_network() {
        // No mock server mounted - a network attempt would error differently
        let client = ApiClient::new("http://127.0.0.1:1");
        let err = client
            .ingest_document(Path::new("/nonexistent/report.pdf"), "", "", "")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::FileRead { .. }));
    }
}
