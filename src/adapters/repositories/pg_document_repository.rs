use async_trait::async_trait;
use sqlx::query_as;
use uuid::Uuid;

use crate::{
    application::{
        dto::document_dto::{DocumentDTO, NewDocumentDTO},
        error::ApplicationError,
        repositories::document_repository::DocumentRepository,
    },
    domain::models::{document::Document, session::Session},
};

/// Metadata store reached directly over Postgres. Ownership is enforced in the
/// queries since row-level security does not apply to this connection.
pub struct PgDocumentRepository {
    pool: sqlx::PgPool,
    table: String,
}

impl PgDocumentRepository {
    pub fn new(pool: sqlx::PgPool, table: impl Into<String>) -> Self {
        Self {
            pool,
            table: table.into(),
        }
    }
}

/// `file_size` is a signed BIGINT; sizes beyond it are refused rather than wrapped.
fn size_column(size: Option<u64>) -> Result<Option<i64>, ApplicationError> {
    size.map(i64::try_from)
        .transpose()
        .map_err(|_| ApplicationError::BadRequest("File size out of range".to_string()))
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    async fn list_documents(&self, session: &Session) -> Result<Vec<Document>, ApplicationError> {
        let query = format!(
            "SELECT * FROM {} WHERE user_id = $1 ORDER BY created_at DESC",
            self.table
        );

        let rows: Vec<DocumentDTO> = query_as::<_, DocumentDTO>(&query)
            .bind(session.user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(|dto| dto.into()).collect())
    }

    async fn insert_document(
        &self,
        session: &Session,
        document: NewDocumentDTO,
    ) -> Result<Document, ApplicationError> {
        if document.user_id != session.user_id {
            return Err(ApplicationError::Unauthorized);
        }

        let query = format!(
            r#"
            INSERT INTO {} (user_id, file_name, file_path, category, file_size, content_type)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
            self.table
        );

        let created: DocumentDTO = query_as::<_, DocumentDTO>(&query)
            .bind(document.user_id)
            .bind(&document.file_name)
            .bind(&document.file_path)
            .bind(document.category.as_str())
            .bind(size_column(document.file_size)?)
            .bind(&document.content_type)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;

        Ok(created.into())
    }

    async fn delete_document(&self, session: &Session, id: Uuid) -> Result<(), ApplicationError> {
        let query = format!("DELETE FROM {} WHERE id = $1 AND user_id = $2", self.table);

        sqlx::query(&query)
            .bind(id)
            .bind(session.user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}
