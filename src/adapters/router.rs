use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::adapters::{
    controllers::{document_controller::DocumentController, health_controller::HealthController},
    middleware::require_session,
    state::AppState,
};

// Room for the multipart envelope around a maximum-size file.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn build_router(app_state: AppState) -> Router {
    let cors = match &app_state.config.cors_allowed_origins {
        Some(allowed_origins) => {
            let origins: Vec<_> = allowed_origins
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                        None
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
        // Allow all origins if not specified (only for development)
        None => CorsLayer::permissive(),
    };

    let body_limit = app_state.config.upload_policy.max_size as usize + MULTIPART_OVERHEAD;

    // Routes that act on the signed-in user's vault
    let protected_routes = Router::new()
        .route(
            "/api/v1/documents",
            get(DocumentController::list_documents).post(DocumentController::upload),
        )
        .route("/api/v1/documents/refresh", post(DocumentController::refresh))
        .route(
            "/api/v1/documents/pending-delete",
            put(DocumentController::request_delete).delete(DocumentController::cancel_delete),
        )
        .route(
            "/api/v1/documents/pending-delete/confirm",
            post(DocumentController::confirm_delete),
        )
        .route("/api/v1/documents/{id}/view", get(DocumentController::view))
        .route(
            "/api/v1/documents/{id}/download",
            get(DocumentController::download),
        )
        .route(
            "/api/v1/documents/{id}",
            delete(DocumentController::delete),
        )
        .route("/api/v1/stats", get(DocumentController::stats))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            require_session,
        ));

    let public_routes = Router::new().route("/api/v1/health", get(HealthController::health_check));

    Router::new()
        .merge(protected_routes)
        .merge(public_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(app_state)
}
