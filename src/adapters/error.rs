use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

use crate::application::error::{ApplicationError, VaultError};

/// Error returned by the HTTP handlers.
#[derive(Debug)]
pub enum ApiError {
    Request(ApplicationError),
    Vault(VaultError),
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        ApiError::Request(error)
    }
}

impl From<VaultError> for ApiError {
    fn from(error: VaultError) -> Self {
        ApiError::Vault(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Request(e) => e.into_response(),
            ApiError::Vault(e) => e.into_response(),
        }
    }
}

impl IntoResponse for ApplicationError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApplicationError::NotFound => {
                warn!("Resource not found");
                (StatusCode::NOT_FOUND, "Resource not found".to_string())
            }
            ApplicationError::BadRequest(ref msg) => {
                warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            ApplicationError::Unauthorized => {
                warn!("Unauthorized access attempt");
                (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
            }
            ApplicationError::InternalError(ref msg) | ApplicationError::DatabaseError(ref msg) => {
                error!("Internal server error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": error_message }))).into_response()
    }
}

impl IntoResponse for VaultError {
    fn into_response(self) -> Response {
        let status = match &self {
            VaultError::NotFound(id) => {
                warn!(document_id = %id, "Document not in the current list");
                StatusCode::NOT_FOUND
            }
            VaultError::Unauthorized => {
                warn!("Vault operation rejected as unauthorized");
                StatusCode::UNAUTHORIZED
            }
            VaultError::InvalidFile(reason) => {
                warn!("Upload rejected: {}", reason);
                StatusCode::BAD_REQUEST
            }
            VaultError::NoPendingDelete => {
                warn!("Delete confirmed without a pending target");
                StatusCode::CONFLICT
            }
            VaultError::UploadMetadataFailed {
                storage_path,
                reason,
            } => {
                error!(%storage_path, "Stored object has no metadata row: {}", reason);
                StatusCode::BAD_GATEWAY
            }
            VaultError::DeleteMetadataFailed {
                document_id,
                reason,
            } => {
                error!(%document_id, "Metadata row outlived its object: {}", reason);
                StatusCode::BAD_GATEWAY
            }
            VaultError::FetchFailed(reason)
            | VaultError::AccessReferenceFailed(reason)
            | VaultError::UploadStorageFailed(reason)
            | VaultError::DeleteStorageFailed(reason) => {
                error!("Remote operation failed: {}", reason);
                StatusCode::BAD_GATEWAY
            }
            VaultError::Unavailable => {
                error!("Document list task is gone");
                StatusCode::SERVICE_UNAVAILABLE
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
