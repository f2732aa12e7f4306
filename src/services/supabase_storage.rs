use async_trait::async_trait;
use reqwest::{multipart, Client, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    application::{
        error::ApplicationError,
        services::storage_service::{Disposition, StorageService},
    },
    domain::{
        config::vault::SupabaseSettings,
        models::{file::FileData, session::Session},
    },
    services::error::StorageError,
};

#[derive(Debug, Serialize)]
struct SignRequest {
    #[serde(rename = "expiresIn")]
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct SignResponse {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

#[derive(Debug, Serialize)]
struct RemoveRequest<'a> {
    prefixes: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
struct RemovedObject {
    name: String,
}

/// Supabase Storage REST client. Requests carry the user's access token so bucket
/// policies apply to the signed-in user.
pub struct SupabaseStorageService {
    client: Client,
    storage_url: String,
    api_key: String,
    bucket_name: String,
}

impl SupabaseStorageService {
    pub fn new(settings: &SupabaseSettings) -> Self {
        Self::with_client(Client::new(), settings)
    }

    pub fn with_client(client: Client, settings: &SupabaseSettings) -> Self {
        Self {
            client,
            storage_url: format!("{}/storage/v1", settings.url.trim_end_matches('/')),
            api_key: settings.anon_key.clone(),
            bucket_name: settings.bucket_name.clone(),
        }
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/object/{}/{}", self.storage_url, self.bucket_name, path)
    }

    fn signed_url(
        &self,
        signed_path: &str,
        disposition: &Disposition,
    ) -> Result<String, StorageError> {
        let raw = format!("{}{}", self.storage_url, signed_path);
        let mut url = Url::parse(&raw)
            .map_err(|e| StorageError::ProviderError(format!("Invalid signed URL: {}", e)))?;

        if let Disposition::Attachment(filename) = disposition {
            url.query_pairs_mut().append_pair("download", filename);
        }
        Ok(url.to_string())
    }
}

#[async_trait]
impl StorageService for SupabaseStorageService {
    async fn upload(
        &self,
        session: &Session,
        path: &str,
        file_data: &FileData,
    ) -> Result<(), ApplicationError> {
        let file_part = multipart::Part::bytes(file_data.content.clone())
            .file_name(file_data.filename.clone())
            .mime_str(&file_data.mime_type)
            .map_err(|e| StorageError::InternalError(e.to_string()))?;

        let form = multipart::Form::new()
            .text("cacheControl", "3600")
            .part("file", file_part);

        let response = self
            .client
            .post(self.object_url(path))
            .bearer_auth(&session.access_token)
            .header("apikey", &self.api_key)
            .header("x-upsert", "false")
            .multipart(form)
            .send()
            .await
            .map_err(StorageError::from)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(StorageError::from_status(status, "Upload", error_text).into());
        }

        info!(
            bucket = %self.bucket_name,
            path = %path,
            size_bytes = file_data.size(),
            "Supabase upload successful"
        );
        Ok(())
    }

    async fn create_signed_url(
        &self,
        session: &Session,
        path: &str,
        expires_in_secs: u64,
        disposition: Disposition,
    ) -> Result<String, ApplicationError> {
        let url = format!(
            "{}/object/sign/{}/{}",
            self.storage_url, self.bucket_name, path
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&session.access_token)
            .header("apikey", &self.api_key)
            .json(&SignRequest {
                expires_in: expires_in_secs,
            })
            .send()
            .await
            .map_err(StorageError::from)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(StorageError::from_status(status, "Sign", error_text).into());
        }

        let signed: SignResponse = response
            .json()
            .await
            .map_err(|e| StorageError::ProviderError(e.to_string()))?;

        Ok(self.signed_url(&signed.signed_url, &disposition)?)
    }

    async fn remove(&self, session: &Session, path: &str) -> Result<(), ApplicationError> {
        let url = format!("{}/object/{}", self.storage_url, self.bucket_name);

        let response = self
            .client
            .delete(&url)
            .bearer_auth(&session.access_token)
            .header("apikey", &self.api_key)
            .json(&RemoveRequest { prefixes: [path] })
            .send()
            .await
            .map_err(StorageError::from)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(StorageError::from_status(status, "Delete", error_text).into());
        }

        let removed: Vec<RemovedObject> = response.json().await.unwrap_or_default();
        if removed.iter().all(|o| o.name != path) {
            debug!(path = %path, "Storage reported no object removed at path");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;
    use wiremock::{
        matchers::{body_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;

    fn settings(url: &str) -> SupabaseSettings {
        SupabaseSettings {
            url: url.to_string(),
            anon_key: "anon-key".to_string(),
            jwt_secret: "secret".to_string(),
            bucket_name: "documents".to_string(),
            table_name: "documents".to_string(),
        }
    }

    fn session() -> Session {
        Session::new(Uuid::nil(), "user-token")
    }

    #[tokio::test]
    async fn upload_posts_object_with_user_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/storage/v1/object/documents/owner/1_cv.pdf"))
            .and(header("authorization", "Bearer user-token"))
            .and(header("apikey", "anon-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Key": "documents/owner/1_cv.pdf"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let storage = SupabaseStorageService::new(&settings(&server.uri()));
        let file = FileData::new(b"%PDF".to_vec(), "cv.pdf".into(), "application/pdf".into());

        storage
            .upload(&session(), "owner/1_cv.pdf", &file)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn upload_rejection_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400).set_body_string("The resource already exists"),
            )
            .mount(&server)
            .await;

        let storage = SupabaseStorageService::new(&settings(&server.uri()));
        let file = FileData::new(vec![1], "a.png".into(), "image/png".into());

        let err = storage
            .upload(&session(), "owner/1_a.png", &file)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::InternalError(msg) if msg.contains("already exists")
        ));
    }

    #[tokio::test]
    async fn signed_url_is_absolute_and_flags_download() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/storage/v1/object/sign/documents/owner/1_cv.pdf"))
            .and(body_json(serde_json::json!({ "expiresIn": 60 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "signedURL": "/object/sign/documents/owner/1_cv.pdf?token=abc"
            })))
            .mount(&server)
            .await;

        let storage = SupabaseStorageService::new(&settings(&server.uri()));

        let inline = storage
            .create_signed_url(&session(), "owner/1_cv.pdf", 60, Disposition::Inline)
            .await
            .unwrap();
        assert_eq!(
            inline,
            format!(
                "{}/storage/v1/object/sign/documents/owner/1_cv.pdf?token=abc",
                server.uri()
            )
        );

        let attachment = storage
            .create_signed_url(
                &session(),
                "owner/1_cv.pdf",
                60,
                Disposition::Attachment("my cv.pdf".to_string()),
            )
            .await
            .unwrap();
        assert!(attachment.ends_with("token=abc&download=my+cv.pdf"));
    }

    #[tokio::test]
    async fn signing_a_missing_object_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let storage = SupabaseStorageService::new(&settings(&server.uri()));
        let err = storage
            .create_signed_url(&session(), "owner/missing.pdf", 60, Disposition::Inline)
            .await
            .unwrap_err();
        assert_eq!(err, ApplicationError::NotFound);
    }

    #[tokio::test]
    async fn remove_sends_path_as_prefix() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/storage/v1/object/documents"))
            .and(body_json(serde_json::json!({ "prefixes": ["owner/1_cv.pdf"] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "name": "owner/1_cv.pdf" }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let storage = SupabaseStorageService::new(&settings(&server.uri()));
        storage.remove(&session(), "owner/1_cv.pdf").await.unwrap();
    }
}
