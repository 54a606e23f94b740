//! Service banner and health endpoints.
//!
//! Endpoints:
//! - GET /        - Banner with storage mode and model id
//! - GET /health  - Liveness check

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

const BANNER: &str = "AI Digital Twin API (Bedrock)";

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub memory: &'static str,
    pub model: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model: String,
    pub use_s3: bool,
    pub version: &'static str,
}

/// GET / - Service banner.
pub async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        message: BANNER,
        memory: state.config.storage.label(),
        model: state.config.model.model_id.clone(),
    })
}

/// GET /health - Liveness check. Does not touch storage or the model.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model: state.config.model.model_id.clone(),
        use_s3: state.config.storage.is_remote(),
        version: env!("CARGO_PKG_VERSION"),
    })
}
