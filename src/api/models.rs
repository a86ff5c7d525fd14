//! Wire types for the backend HTTP contract.
//!
//! Everything here is a passive snapshot of what the backend sends or
//! expects; the client never mutates backend-owned data. Optional fields
//! the backend may omit (`citations`, `page`, `tags`) default so that
//! rendering code never distinguishes "missing" from "empty".

use serde::{Deserialize, Serialize};

/// Placeholder glyph for absent optional display values.
const PLACEHOLDER: &str = "-";

/// One stored document's metadata, as returned by `GET /api/documents`.
///
/// Created by the backend on successful ingest; read-only on this side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentItem {
    pub id: i64,
    pub filename: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    /// Backend-generated timestamp, forwarded as a string.
    pub uploaded_at: String,
    #[serde(default)]
    pub source_unit: Option<String>,
    #[serde(default)]
    pub year: Option<i64>,
    /// Opaque tag payload; stored by the backend, not rendered here.
    #[serde(default)]
    pub tags: Option<serde_json::Value>,
}

impl DocumentItem {
    pub fn source_unit_label(&self) -> &str {
        self.source_unit.as_deref().unwrap_or(PLACEHOLDER)
    }

    pub fn year_label(&self) -> String {
        self.year
            .map(|y| y.to_string())
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }

    /// Human-readable upload timestamp. Falls back to the raw string when
    /// the backend sends something chrono cannot parse.
    pub fn uploaded_label(&self) -> String {
        chrono::DateTime::parse_from_rfc3339(&self.uploaded_at)
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .or_else(|_| {
                chrono::NaiveDateTime::parse_from_str(&self.uploaded_at, "%Y-%m-%dT%H:%M:%S%.f")
                    .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            })
            .unwrap_or_else(|_| self.uploaded_at.clone())
    }
}

/// A pointer from a generated answer back to a source document location.
///
/// Produced only inside chat and agent responses. Backend ordering is
/// preserved as-is; there is no sorting or dedup on this side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    pub filename: String,
    #[serde(default)]
    pub page: Option<i64>,
    pub snippet: String,
    #[serde(default)]
    pub document_id: Option<i64>,
    #[serde(default)]
    pub chunk_id: Option<i64>,
}

impl Citation {
    /// Page number for display; `?` when the backend omitted it.
    pub fn page_label(&self) -> String {
        self.page
            .map(|p| p.to_string())
            .unwrap_or_else(|| "?".to_string())
    }
}

/// Success payload of `POST /api/ingest`.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestResponse {
    pub document_id: i64,
}

/// Request body of `POST /api/chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub user: String,
    pub query: String,
}

/// Response body of `POST /api/chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
    /// Backend session bookkeeping; accepted but unused.
    #[serde(default)]
    pub session_id: Option<i64>,
}

/// Server-side generation strategies accepted by `POST /api/agent/run`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentMode {
    DraftAuditPlan,
    DraftFollowupActions,
    SummarizeAuditReport,
}

impl AgentMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::DraftAuditPlan => "Draft Audit Plan",
            Self::DraftFollowupActions => "Draft Follow-up Actions",
            Self::SummarizeAuditReport => "Summarize Audit Report",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::DraftAuditPlan => Self::DraftFollowupActions,
            Self::DraftFollowupActions => Self::SummarizeAuditReport,
            Self::SummarizeAuditReport => Self::DraftAuditPlan,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::DraftAuditPlan => Self::SummarizeAuditReport,
            Self::DraftFollowupActions => Self::DraftAuditPlan,
            Self::SummarizeAuditReport => Self::DraftFollowupActions,
        }
    }
}

/// Four free-text fields describing an audit engagement.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DraftRequest {
    pub scope: String,
    pub criteria: String,
    pub period: String,
    pub risk: String,
}

/// Request body of `POST /api/agent/run`.
#[derive(Debug, Clone, Serialize)]
pub struct AgentRequest {
    pub mode: AgentMode,
    pub user: String,
    pub payload: DraftRequest,
}

/// Response body of `POST /api/agent/run`.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentResponse {
    pub content: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
}
