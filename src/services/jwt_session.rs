use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::{application::error::ApplicationError, domain::models::session::Session};

const SUPABASE_AUDIENCE: &str = "authenticated";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub aud: String,
    pub exp: u64,
}

/// Turns a Supabase access token into a [`Session`] by checking its HS256
/// signature against the project JWT secret.
pub struct JwtSessionVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtSessionVerifier {
    pub fn new(jwt_secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[SUPABASE_AUDIENCE]);

        Self {
            key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, access_token: &str) -> Result<Session, ApplicationError> {
        let data = decode::<AccessClaims>(access_token, &self.key, &self.validation)
            .map_err(|e| {
                warn!("Rejected access token: {}", e);
                ApplicationError::Unauthorized
            })?;

        let user_id = Uuid::parse_str(&data.claims.sub).map_err(|_| {
            warn!("Access token subject is not a user id: {}", data.claims.sub);
            ApplicationError::Unauthorized
        })?;

        Ok(Session::new(user_id, access_token))
    }
}
