use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};
use uuid::Uuid;

use crate::{
    application::{
        dto::document_dto::DocumentDTO,
        view_model::{DocumentStats, ViewState},
    },
    domain::models::document::{format_file_size, Document},
};

impl FromRow<'_, PgRow> for DocumentDTO {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(DocumentDTO {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            file_name: row.try_get("file_name")?,
            file_path: row.try_get("file_path")?,
            category: row.try_get("category")?,
            file_size: row.try_get("file_size")?,
            content_type: row.try_get("content_type")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct ListQuery {
    pub search: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PendingDeleteRequest {
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub id: Uuid,
    #[serde(rename = "fileName")]
    pub file_name: String,
    pub category: String,
    #[serde(rename = "sizeBytes")]
    pub size_bytes: Option<u64>,
    #[serde(rename = "sizeLabel")]
    pub size_label: String,
    #[serde(rename = "contentType")]
    pub content_type: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<Document> for DocumentResponse {
    fn from(document: Document) -> Self {
        Self {
            id: document.id,
            file_name: document.file_name,
            category: document.category.to_string(),
            size_bytes: document.size_bytes,
            size_label: format_file_size(document.size_bytes),
            content_type: document.content_type,
            created_at: document.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total: usize,
    #[serde(rename = "totalSize")]
    pub total_size: u64,
    pub summary: String,
}

impl From<DocumentStats> for StatsResponse {
    fn from(stats: DocumentStats) -> Self {
        Self {
            total: stats.total,
            total_size: stats.total_size,
            summary: stats.summary(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DocumentListResponse {
    pub documents: Vec<DocumentResponse>,
    pub loading: bool,
    /// Whether the unfiltered list is empty, as opposed to the filters hiding everything.
    #[serde(rename = "vaultEmpty")]
    pub vault_empty: bool,
    #[serde(rename = "pendingDelete")]
    pub pending_delete: Option<DocumentResponse>,
    pub stats: StatsResponse,
}

impl From<ViewState> for DocumentListResponse {
    fn from(state: ViewState) -> Self {
        Self {
            documents: state.visible.into_iter().map(DocumentResponse::from).collect(),
            loading: state.loading,
            vault_empty: state.documents.is_empty(),
            pending_delete: state.pending_delete.map(DocumentResponse::from),
            stats: state.stats.into(),
        }
    }
}
