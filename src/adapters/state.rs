use axum::extract::FromRef;
use std::sync::Arc;

use crate::{
    adapters::view_model_registry::ViewModelRegistry, domain::config::vault::VaultConfig,
    services::JwtSessionVerifier,
};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub config: Arc<VaultConfig>,
    pub verifier: Arc<JwtSessionVerifier>,
    pub view_models: ViewModelRegistry,
}
