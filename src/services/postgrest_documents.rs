use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::{
    application::{
        dto::document_dto::{DocumentDTO, NewDocumentDTO},
        error::ApplicationError,
        repositories::document_repository::DocumentRepository,
    },
    domain::{
        config::vault::SupabaseSettings,
        models::{document::Document, session::Session},
    },
};

#[derive(Debug, Deserialize)]
struct PostgRestError {
    message: String,
}

/// Metadata store backed by the Supabase REST (PostgREST) endpoint.
pub struct PostgRestDocumentRepository {
    client: Client,
    table_url: String,
    api_key: String,
}

impl PostgRestDocumentRepository {
    pub fn new(settings: &SupabaseSettings) -> Self {
        Self::with_client(Client::new(), settings)
    }

    pub fn with_client(client: Client, settings: &SupabaseSettings) -> Self {
        Self {
            client,
            table_url: format!(
                "{}/rest/v1/{}",
                settings.url.trim_end_matches('/'),
                settings.table_name
            ),
            api_key: settings.anon_key.clone(),
        }
    }

    async fn check(response: Response) -> Result<Response, ApplicationError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<PostgRestError>(&body)
            .map(|e| e.message)
            .unwrap_or(body);

        Err(match status.as_u16() {
            401 | 403 => ApplicationError::Unauthorized,
            404 => ApplicationError::NotFound,
            _ => ApplicationError::DatabaseError(format!("{} ({})", message, status)),
        })
    }
}

fn transport_error(error: reqwest::Error) -> ApplicationError {
    ApplicationError::DatabaseError(error.to_string())
}

#[async_trait]
impl DocumentRepository for PostgRestDocumentRepository {
    async fn list_documents(&self, session: &Session) -> Result<Vec<Document>, ApplicationError> {
        let owner_filter = format!("eq.{}", session.user_id);

        let response = self
            .client
            .get(&self.table_url)
            .bearer_auth(&session.access_token)
            .header("apikey", &self.api_key)
            .query(&[
                ("select", "*"),
                ("user_id", owner_filter.as_str()),
                ("order", "created_at.desc"),
            ])
            .send()
            .await
            .map_err(transport_error)?;

        let rows: Vec<DocumentDTO> = Self::check(response)
            .await?
            .json()
            .await
            .map_err(transport_error)?;

        debug!(user_id = %session.user_id, count = rows.len(), "Fetched document rows");
        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn insert_document(
        &self,
        session: &Session,
        document: NewDocumentDTO,
    ) -> Result<Document, ApplicationError> {
        let response = self
            .client
            .post(&self.table_url)
            .bearer_auth(&session.access_token)
            .header("apikey", &self.api_key)
            .header("Prefer", "return=representation")
            .json(&document)
            .send()
            .await
            .map_err(transport_error)?;

        let mut rows: Vec<DocumentDTO> = Self::check(response)
            .await?
            .json()
            .await
            .map_err(transport_error)?;

        if rows.is_empty() {
            return Err(ApplicationError::DatabaseError(
                "Insert returned no row".to_string(),
            ));
        }
        Ok(rows.swap_remove(0).into())
    }

    async fn delete_document(&self, session: &Session, id: Uuid) -> Result<(), ApplicationError> {
        let id_filter = format!("eq.{}", id);
        let owner_filter = format!("eq.{}", session.user_id);

        let response = self
            .client
            .delete(&self.table_url)
            .bearer_auth(&session.access_token)
            .header("apikey", &self.api_key)
            .query(&[("id", id_filter.as_str()), ("user_id", owner_filter.as_str())])
            .send()
            .await
            .map_err(transport_error)?;

        Self::check(response).await?;
        Ok(())
    }
}
