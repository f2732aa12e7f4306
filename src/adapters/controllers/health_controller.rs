use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::info;

use crate::domain::config::vault::{MetadataBackend, VaultConfig};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub bucket: String,
    #[serde(rename = "metadataBackend")]
    pub metadata_backend: MetadataBackend,
    pub config: HealthConfigInfo,
}

#[derive(Debug, Serialize)]
pub struct HealthConfigInfo {
    #[serde(rename = "maxSize")]
    pub max_size: u64,
    #[serde(rename = "accessReferenceTtl")]
    pub access_reference_ttl: u64,
    #[serde(rename = "allowedMimeTypes")]
    pub allowed_mime_types: Vec<String>,
}

pub struct HealthController;

impl HealthController {
    /// GET /api/v1/health
    pub async fn health_check(State(config): State<Arc<VaultConfig>>) -> Json<HealthResponse> {
        info!("Health check requested");

        Json(HealthResponse {
            status: "healthy".to_string(),
            bucket: config.supabase.bucket_name.clone(),
            metadata_backend: config.metadata_backend,
            config: HealthConfigInfo {
                max_size: config.upload_policy.max_size,
                access_reference_ttl: config.access_reference_ttl_secs,
                allowed_mime_types: config.upload_policy.allowed_mime_types.clone(),
            },
        })
    }
}
