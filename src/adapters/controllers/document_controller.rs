use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    adapters::{
        dto::document_dto::{
            DocumentListResponse, DocumentResponse, ListQuery, PendingDeleteRequest,
            StatsResponse,
        },
        error::ApiError,
        view_model_registry::ViewModelRegistry,
    },
    application::{error::ApplicationError, services::document_service::AccessReference},
    domain::models::{
        document::{Category, CategoryFilter},
        file::FileData,
        session::Session,
    },
};

pub struct DocumentController;

impl DocumentController {
    /// GET /api/v1/documents?search=&category=
    /// Query parameters replace the stored filters; omitted ones keep their value.
    pub async fn list_documents(
        State(view_models): State<ViewModelRegistry>,
        Extension(session): Extension<Session>,
        Query(query): Query<ListQuery>,
    ) -> Result<Json<DocumentListResponse>, ApiError> {
        let documents = view_models.get(&session).await;

        if let Some(category) = query.category {
            let filter: CategoryFilter = category.parse().map_err(|_| {
                ApplicationError::BadRequest(format!("Unknown category '{}'", category))
            })?;
            documents.set_category(filter).await?;
        }
        if let Some(search) = query.search {
            documents.set_search(search).await?;
        }

        Ok(Json(documents.state().await?.into()))
    }

    /// POST /api/v1/documents/refresh
    pub async fn refresh(
        State(view_models): State<ViewModelRegistry>,
        Extension(session): Extension<Session>,
    ) -> Result<Json<DocumentListResponse>, ApiError> {
        let documents = view_models.get(&session).await;
        documents.refresh(&session).await?;

        Ok(Json(documents.state().await?.into()))
    }

    /// POST /api/v1/documents
    /// Multipart fields: `file` (with filename and content type) and `category`.
    pub async fn upload(
        State(view_models): State<ViewModelRegistry>,
        Extension(session): Extension<Session>,
        mut multipart: Multipart,
    ) -> Result<(StatusCode, Json<DocumentResponse>), ApiError> {
        let mut file: Option<FileData> = None;
        let mut category = Category::default();

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            warn!("Invalid multipart data: {}", e);
            ApplicationError::BadRequest("Invalid request format".to_string())
        })? {
            match field.name().unwrap_or("") {
                "file" => {
                    let filename = field.file_name().unwrap_or("").to_string();
                    let mime_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field.bytes().await.map_err(|e| {
                        warn!("Cannot read file bytes: {}", e);
                        ApplicationError::BadRequest("Invalid file data".to_string())
                    })?;
                    file = Some(FileData::new(bytes.to_vec(), filename, mime_type));
                }
                "category" => {
                    let raw = field.text().await.map_err(|e| {
                        warn!("Invalid category field: {}", e);
                        ApplicationError::BadRequest("Invalid request data".to_string())
                    })?;
                    category = raw.parse().map_err(|_| {
                        ApplicationError::BadRequest(format!("Unknown category '{}'", raw))
                    })?;
                }
                _ => {}
            }
        }

        let file = file.ok_or_else(|| {
            warn!("Missing required 'file' field in upload");
            ApplicationError::BadRequest("Missing required field".to_string())
        })?;

        let document = view_models
            .get(&session)
            .await
            .upload(&session, file, category)
            .await?;

        info!(document_id = %document.id, user_id = %session.user_id, "Document uploaded");
        Ok((StatusCode::CREATED, Json(document.into())))
    }

    /// GET /api/v1/documents/{id}/view
    pub async fn view(
        State(view_models): State<ViewModelRegistry>,
        Extension(session): Extension<Session>,
        Path(id): Path<Uuid>,
    ) -> Result<Json<AccessReference>, ApiError> {
        let reference = view_models
            .get(&session)
            .await
            .request_view(&session, id)
            .await?;
        Ok(Json(reference))
    }

    /// GET /api/v1/documents/{id}/download
    pub async fn download(
        State(view_models): State<ViewModelRegistry>,
        Extension(session): Extension<Session>,
        Path(id): Path<Uuid>,
    ) -> Result<Json<AccessReference>, ApiError> {
        let reference = view_models
            .get(&session)
            .await
            .request_download(&session, id)
            .await?;
        Ok(Json(reference))
    }

    /// DELETE /api/v1/documents/{id}
    pub async fn delete(
        State(view_models): State<ViewModelRegistry>,
        Extension(session): Extension<Session>,
        Path(id): Path<Uuid>,
    ) -> Result<StatusCode, ApiError> {
        view_models
            .get(&session)
            .await
            .delete(&session, id)
            .await?;

        info!(document_id = %id, user_id = %session.user_id, "Document deleted");
        Ok(StatusCode::NO_CONTENT)
    }

    /// PUT /api/v1/documents/pending-delete
    pub async fn request_delete(
        State(view_models): State<ViewModelRegistry>,
        Extension(session): Extension<Session>,
        Json(body): Json<PendingDeleteRequest>,
    ) -> Result<Json<DocumentResponse>, ApiError> {
        let target = view_models
            .get(&session)
            .await
            .request_delete(body.id)
            .await?;
        Ok(Json(target.into()))
    }

    /// DELETE /api/v1/documents/pending-delete
    pub async fn cancel_delete(
        State(view_models): State<ViewModelRegistry>,
        Extension(session): Extension<Session>,
    ) -> Result<StatusCode, ApiError> {
        view_models.get(&session).await.cancel_delete().await?;
        Ok(StatusCode::NO_CONTENT)
    }

    /// POST /api/v1/documents/pending-delete/confirm
    pub async fn confirm_delete(
        State(view_models): State<ViewModelRegistry>,
        Extension(session): Extension<Session>,
    ) -> Result<Json<DocumentResponse>, ApiError> {
        let deleted = view_models
            .get(&session)
            .await
            .confirm_delete(&session)
            .await?;

        info!(document_id = %deleted.id, user_id = %session.user_id, "Document deleted");
        Ok(Json(deleted.into()))
    }

    /// GET /api/v1/stats
    pub async fn stats(
        State(view_models): State<ViewModelRegistry>,
        Extension(session): Extension<Session>,
    ) -> Result<Json<StatsResponse>, ApiError> {
        let state = view_models.get(&session).await.state().await?;
        Ok(Json(state.stats.into()))
    }
}
