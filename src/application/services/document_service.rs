use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    application::{
        dto::document_dto::NewDocumentDTO,
        error::{ApplicationError, VaultError},
        repositories::document_repository::DocumentRepository,
        services::storage_service::{Disposition, StorageService},
    },
    domain::models::{
        document::{Category, Document},
        file::{FileData, UploadPolicy},
        session::Session,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPurpose {
    View,
    Download,
}

/// Short-lived URL granting read access to one stored document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessReference {
    pub document_id: Uuid,
    pub url: String,
    #[serde(rename = "expiresAt")]
    pub expires_at: DateTime<Utc>,
    pub download: bool,
}

/// Remote side of the vault: the two-step writes against object storage and the
/// metadata store, plus listing and access references.
pub struct DocumentService {
    repository: Arc<dyn DocumentRepository>,
    storage: Arc<dyn StorageService>,
    policy: UploadPolicy,
    access_ttl_secs: u64,
}

impl DocumentService {
    pub fn new(
        repository: Arc<dyn DocumentRepository>,
        storage: Arc<dyn StorageService>,
        policy: UploadPolicy,
        access_ttl_secs: u64,
    ) -> Self {
        Self {
            repository,
            storage,
            policy,
            access_ttl_secs,
        }
    }

    pub async fn list(&self, session: &Session) -> Result<Vec<Document>, VaultError> {
        self.repository.list_documents(session).await.map_err(|e| {
            error!(user_id = %session.user_id, error = %e, "Listing documents failed");
            match e {
                ApplicationError::Unauthorized => VaultError::Unauthorized,
                other => VaultError::FetchFailed(other.to_string()),
            }
        })
    }

    pub async fn access_reference(
        &self,
        session: &Session,
        document: &Document,
        purpose: AccessPurpose,
    ) -> Result<AccessReference, VaultError> {
        let disposition = match purpose {
            AccessPurpose::View => Disposition::Inline,
            AccessPurpose::Download => Disposition::Attachment(document.file_name.clone()),
        };

        let expires_at = i64::try_from(self.access_ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| {
                warn!(ttl_secs = self.access_ttl_secs, "Access reference lifetime out of range");
                VaultError::AccessReferenceFailed(format!(
                    "invalid link lifetime of {} seconds",
                    self.access_ttl_secs
                ))
            })?;

        let url = self
            .storage
            .create_signed_url(
                session,
                &document.storage_path,
                self.access_ttl_secs,
                disposition,
            )
            .await
            .map_err(|e| {
                warn!(
                    document_id = %document.id,
                    path = %document.storage_path,
                    error = %e,
                    "Could not create access reference"
                );
                VaultError::AccessReferenceFailed(e.to_string())
            })?;

        Ok(AccessReference {
            document_id: document.id,
            url,
            expires_at,
            download: purpose == AccessPurpose::Download,
        })
    }

    /// Stores the bytes, then writes the row. A failed row write leaves the stored
    /// object in place and reports `UploadMetadataFailed`.
    pub async fn upload(
        &self,
        session: &Session,
        file_data: FileData,
        category: Category,
    ) -> Result<Document, VaultError> {
        self.validate(&file_data)?;

        let path = storage_path(session.user_id, Utc::now(), &file_data.filename);

        self.storage
            .upload(session, &path, &file_data)
            .await
            .map_err(|e| {
                error!(path = %path, error = %e, "Storage upload failed");
                VaultError::UploadStorageFailed(e.to_string())
            })?;

        info!(path = %path, size_bytes = file_data.size(), "Object stored");

        let mut row = NewDocumentDTO {
            user_id: session.user_id,
            file_name: file_data.filename,
            file_path: path.clone(),
            category,
            file_size: Some(file_data.content.len() as u64),
            content_type: file_data.mime_type,
        };
        row.sanitize();

        let document = self
            .repository
            .insert_document(session, row)
            .await
            .map_err(|e| {
                error!(
                    path = %path,
                    error = %e,
                    "Metadata insert failed after storage upload, object is orphaned"
                );
                VaultError::UploadMetadataFailed {
                    storage_path: path.clone(),
                    reason: e.to_string(),
                }
            })?;

        info!(document_id = %document.id, path = %path, "Document uploaded");
        Ok(document)
    }

    /// Removes the object, then the row. The row is only touched once the object
    /// is gone.
    pub async fn delete(&self, session: &Session, document: &Document) -> Result<(), VaultError> {
        self.storage
            .remove(session, &document.storage_path)
            .await
            .map_err(|e| {
                error!(
                    document_id = %document.id,
                    path = %document.storage_path,
                    error = %e,
                    "Storage removal failed, row kept"
                );
                VaultError::DeleteStorageFailed(e.to_string())
            })?;

        self.repository
            .delete_document(session, document.id)
            .await
            .map_err(|e| {
                error!(
                    document_id = %document.id,
                    path = %document.storage_path,
                    error = %e,
                    "Metadata delete failed after storage removal, row is dangling"
                );
                VaultError::DeleteMetadataFailed {
                    document_id: document.id,
                    reason: e.to_string(),
                }
            })?;

        info!(document_id = %document.id, "Document deleted");
        Ok(())
    }

    fn validate(&self, file_data: &FileData) -> Result<(), VaultError> {
        if !self.policy.allows_mime(&file_data.mime_type) {
            warn!(mime_type = %file_data.mime_type, "Rejected upload with unsupported type");
            return Err(VaultError::InvalidFile(
                "Please upload PDF or image files only.".to_string(),
            ));
        }
        if !file_data.validate_size(self.policy.max_size) {
            warn!(size_bytes = file_data.size(), "Rejected oversized upload");
            return Err(VaultError::InvalidFile(format!(
                "Maximum file size is {}MB.",
                self.policy.max_size / (1024 * 1024)
            )));
        }
        Ok(())
    }
}

/// `{owner}/{millis}_{name}`: owner-prefixed so storage policies can isolate users,
/// timestamped so repeated uploads of the same name do not collide.
pub fn storage_path(owner: Uuid, uploaded_at: DateTime<Utc>, filename: &str) -> String {
    let safe_filename = filename
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>();

    format!("{}/{}_{}", owner, uploaded_at.timestamp_millis(), safe_filename)
}
