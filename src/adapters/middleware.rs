use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::{application::error::ApplicationError, services::JwtSessionVerifier};

/// Resolves the `Authorization: Bearer` header into a [`Session`] request
/// extension. Requests without a valid Supabase access token are rejected.
///
/// [`Session`]: crate::domain::models::session::Session
pub async fn require_session(
    State(verifier): State<Arc<JwtSessionVerifier>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = match request.headers().get(header::AUTHORIZATION) {
        Some(value) => match value.to_str() {
            Ok(raw) => raw.strip_prefix("Bearer ").map(str::trim),
            Err(_) => {
                warn!("Authorization header contains invalid UTF-8");
                return ApplicationError::BadRequest("Bad request".to_string()).into_response();
            }
        },
        None => None,
    };

    let Some(token) = token.filter(|t| !t.is_empty()) else {
        warn!("Bearer token is missing");
        return ApplicationError::Unauthorized.into_response();
    };

    match verifier.verify(token) {
        Ok(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}
