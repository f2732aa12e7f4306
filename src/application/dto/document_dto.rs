use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::domain::models::document::{Category, Document};

/// A `documents` row as the metadata store returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentDTO {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    pub file_path: String,
    pub category: String,
    pub file_size: Option<i64>,
    pub content_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Attributes written when a row is inserted. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewDocumentDTO {
    pub user_id: Uuid,
    pub file_name: String,
    pub file_path: String,
    pub category: Category,
    pub file_size: Option<u64>,
    pub content_type: String,
}

impl NewDocumentDTO {
    pub fn sanitize(&mut self) {
        if let Some(size) = self.file_size {
            self.file_size = Some(std::cmp::min(size, i64::MAX as u64));
        }
    }
}

impl From<DocumentDTO> for Document {
    fn from(value: DocumentDTO) -> Self {
        let category = value.category.parse().unwrap_or_else(|_| {
            warn!(
                document_id = %value.id,
                category = %value.category,
                "Unknown category on stored document, showing it as Other"
            );
            Category::Other
        });

        Document {
            id: value.id,
            owner: value.user_id,
            file_name: value.file_name,
            storage_path: value.file_path,
            category,
            size_bytes: value.file_size.and_then(|s| u64::try_from(s).ok()),
            content_type: value.content_type.unwrap_or_default(),
            created_at: value.created_at,
        }
    }
}
