use thiserror::Error;
use uuid::Uuid;

/// Failure reported by a remote collaborator (metadata store, object storage,
/// identity provider).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApplicationError {
    #[error("Resource not found")]
    NotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Outcome of a failed vault operation, as surfaced to the dashboard.
///
/// Every variant carries a human-readable message; none of them leave the
/// document list unusable.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum VaultError {
    #[error("Error loading documents: {0}")]
    FetchFailed(String),

    #[error("Could not access document: {0}")]
    AccessReferenceFailed(String),

    #[error("Upload failed: {0}")]
    UploadStorageFailed(String),

    /// The object was stored but its row was not written; the object stays orphaned.
    #[error("Upload failed: {reason}")]
    UploadMetadataFailed { storage_path: String, reason: String },

    #[error("Delete failed: {0}")]
    DeleteStorageFailed(String),

    /// The object was removed but its row survived and now points at nothing.
    #[error("Delete failed: {reason}")]
    DeleteMetadataFailed { document_id: Uuid, reason: String },

    #[error("Invalid file: {0}")]
    InvalidFile(String),

    #[error("Document {0} not found")]
    NotFound(Uuid),

    #[error("No document is pending deletion")]
    NoPendingDelete,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Document list is unavailable")]
    Unavailable,
}

impl VaultError {
    /// True when a remote write partially succeeded and left storage and metadata
    /// out of step.
    pub fn is_inconsistent(&self) -> bool {
        matches!(
            self,
            VaultError::UploadMetadataFailed { .. } | VaultError::DeleteMetadataFailed { .. }
        )
    }
}
