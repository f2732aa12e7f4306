use async_trait::async_trait;

use crate::{
    application::error::ApplicationError,
    domain::models::{file::FileData, session::Session},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    Inline,
    /// Ask the browser to save the object under the given name.
    Attachment(String),
}

#[async_trait]
pub trait StorageService: Send + Sync {
    async fn upload(
        &self,
        session: &Session,
        path: &str,
        file_data: &FileData,
    ) -> Result<(), ApplicationError>;
    /// Mints a URL granting read access to `path` for `expires_in_secs` seconds.
    async fn create_signed_url(
        &self,
        session: &Session,
        path: &str,
        expires_in_secs: u64,
        disposition: Disposition,
    ) -> Result<String, ApplicationError>;
    async fn remove(&self, session: &Session, path: &str) -> Result<(), ApplicationError>;
}
