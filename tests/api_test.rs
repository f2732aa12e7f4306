mod common;

use std::{collections::HashMap, sync::Arc};

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use common::{fixture, Fixture};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value;
use tower::ServiceExt;
use vault_service::{
    adapters::{router::build_router, state::AppState, view_model_registry::ViewModelRegistry},
    domain::{config::vault::VaultConfig, models::document::Category},
    services::{AccessClaims, JwtSessionVerifier},
};

const JWT_SECRET: &str = "super-secret-jwt-token-with-at-least-32-characters";
const BOUNDARY: &str = "vault-test-boundary";

fn app(fx: &Fixture) -> Router {
    let env: HashMap<&str, &str> = HashMap::from([
        ("SUPABASE_URL", "http://supabase.test"),
        ("SUPABASE_ANON_KEY", "anon-key"),
        ("SUPABASE_JWT_SECRET", JWT_SECRET),
    ]);
    let config = VaultConfig::from_lookup(|key: &str| env.get(key).map(|v| v.to_string())).unwrap();

    build_router(AppState {
        config: Arc::new(config),
        verifier: Arc::new(JwtSessionVerifier::new(JWT_SECRET)),
        view_models: ViewModelRegistry::new(fx.service.clone()),
    })
}

fn bearer(fx: &Fixture) -> String {
    let claims = AccessClaims {
        sub: fx.session.user_id.to_string(),
        aud: "authenticated".to_string(),
        exp: (chrono::Utc::now().timestamp() + 3600) as u64,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap();
    format!("Bearer {}", token)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(fx: &Fixture, uri: &str) -> Request<Body> {
    Request::get(uri)
        .header(header::AUTHORIZATION, bearer(fx))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let fx = fixture();
    let (status, body) = send(
        &app(&fx),
        Request::get("/api/v1/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["metadataBackend"], "postgrest");
    assert_eq!(body["config"]["maxSize"], 10 * 1024 * 1024);
}

#[tokio::test]
async fn documents_require_a_valid_token() {
    let fx = fixture();
    let app = app(&fx);

    let (status, _) = send(
        &app,
        Request::get("/api/v1/documents").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        Request::get("/api/v1/documents")
            .header(header::AUTHORIZATION, "Bearer not-a-jwt")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn list_applies_query_filters_and_reports_stats() {
    let fx = fixture();
    fx.stored("resume.pdf", Category::Resume, Some(1_048_576));
    fx.stored("passport.pdf", Category::Id, Some(2_097_152));
    let app = app(&fx);

    let (status, body) = send(&app, get(&fx, "/api/v1/documents?category=ID")).await;

    assert_eq!(status, StatusCode::OK);
    let documents = body["documents"].as_array().unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0]["fileName"], "passport.pdf");
    assert_eq!(documents[0]["sizeLabel"], "2.0 MB");
    assert_eq!(body["vaultEmpty"], false);
    assert_eq!(body["stats"]["total"], 2);
    assert_eq!(body["stats"]["summary"], "2 documents · 3.0 MB");

    // The category filter sticks until replaced.
    let (_, body) = send(&app, get(&fx, "/api/v1/documents")).await;
    assert_eq!(body["documents"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, get(&fx, "/api/v1/documents?category=Receipts")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_then_download_reference() {
    let fx = fixture();
    let app = app(&fx);

    let body = format!(
        "--{b}\r\n\
         Content-Disposition: form-data; name=\"category\"\r\n\r\n\
         Resume\r\n\
         --{b}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"cv.pdf\"\r\n\
         Content-Type: application/pdf\r\n\r\n\
         %PDF-1.7 test\r\n\
         --{b}--\r\n",
        b = BOUNDARY
    );
    let request = Request::post("/api/v1/documents")
        .header(header::AUTHORIZATION, bearer(&fx))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();

    let (status, created) = send(&app, request).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["fileName"], "cv.pdf");
    assert_eq!(created["category"], "Resume");

    let (status, listed) = send(
        &app,
        Request::post("/api/v1/documents/refresh")
            .header(header::AUTHORIZATION, bearer(&fx))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["documents"][0]["fileName"], "cv.pdf");

    let id = created["id"].as_str().unwrap().to_string();
    let (status, reference) =
        send(&app, get(&fx, &format!("/api/v1/documents/{}/download", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reference["download"], true);
    assert!(reference["url"].as_str().unwrap().ends_with("download=cv.pdf"));
}

#[tokio::test]
async fn pending_delete_flow() {
    let fx = fixture();
    let doc = fx.stored("resume.pdf", Category::Resume, None);
    let app = app(&fx);

    let (status, _) = send(
        &app,
        Request::post("/api/v1/documents/pending-delete/confirm")
            .header(header::AUTHORIZATION, bearer(&fx))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, target) = send(
        &app,
        Request::put("/api/v1/documents/pending-delete")
            .header(header::AUTHORIZATION, bearer(&fx))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(format!("{{\"id\":\"{}\"}}", doc.id)))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(target["fileName"], "resume.pdf");

    let (status, deleted) = send(
        &app,
        Request::post("/api/v1/documents/pending-delete/confirm")
            .header(header::AUTHORIZATION, bearer(&fx))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["id"], doc.id.to_string());
    assert!(fx.repository.rows().is_empty());
}

#[tokio::test]
async fn unknown_document_is_404() {
    let fx = fixture();
    let app = app(&fx);

    let (status, body) = send(
        &app,
        Request::delete(format!("/api/v1/documents/{}", uuid::Uuid::new_v4()))
            .header(header::AUTHORIZATION, bearer(&fx))
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not found"));
}
