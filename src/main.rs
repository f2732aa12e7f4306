use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use vault_service::{
    adapters::{
        repositories::PgDocumentRepository, router::build_router, state::AppState,
        view_model_registry::ViewModelRegistry,
    },
    application::{
        repositories::document_repository::DocumentRepository,
        services::{document_service::DocumentService, StorageService},
    },
    domain::config::vault::{MetadataBackend, VaultConfig},
    services::{JwtSessionVerifier, PostgRestDocumentRepository, SupabaseStorageService},
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = VaultConfig::from_env().unwrap_or_else(|e| panic!("ERROR: {}", e));

    tracing::info!(
        bucket = %config.supabase.bucket_name,
        backend = ?config.metadata_backend,
        "Starting vault-service"
    );

    let repository: Arc<dyn DocumentRepository> = match config.metadata_backend {
        MetadataBackend::PostgRest => {
            Arc::new(PostgRestDocumentRepository::new(&config.supabase))
        }
        MetadataBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .expect("ERROR: DATABASE_URL environment variable must be set");

            tracing::info!("Connecting to database...");
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(5)
                .acquire_timeout(std::time::Duration::from_secs(30))
                .connect(database_url)
                .await
                .expect("ERROR: Failed to connect to PostgreSQL database. Check DATABASE_URL and network connectivity.");
            tracing::info!("Database connection established");

            Arc::new(PgDocumentRepository::new(
                pool,
                config.supabase.table_name.clone(),
            ))
        }
    };

    let storage: Arc<dyn StorageService> = Arc::new(SupabaseStorageService::new(&config.supabase));

    let service = Arc::new(DocumentService::new(
        repository,
        storage,
        config.upload_policy.clone(),
        config.access_reference_ttl_secs,
    ));

    let port = config.port;
    let app_state = AppState {
        verifier: Arc::new(JwtSessionVerifier::new(&config.supabase.jwt_secret)),
        view_models: ViewModelRegistry::new(service),
        config: Arc::new(config),
    };

    let router = build_router(app_state);

    // Start the server
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .expect("Failed to bind to port");

    tracing::info!("Server listening on 0.0.0.0:{}", port);

    axum::serve(listener, router)
        .await
        .expect("Failed to start server");
}
