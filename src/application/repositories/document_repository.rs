use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    application::{dto::document_dto::NewDocumentDTO, error::ApplicationError},
    domain::models::{document::Document, session::Session},
};

/// Row store for document metadata. Each call succeeds or fails as a whole.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// All rows owned by the session user, newest first.
    async fn list_documents(&self, session: &Session) -> Result<Vec<Document>, ApplicationError>;
    async fn insert_document(
        &self,
        session: &Session,
        document: NewDocumentDTO,
    ) -> Result<Document, ApplicationError>;
    async fn delete_document(&self, session: &Session, id: Uuid) -> Result<(), ApplicationError>;
}
