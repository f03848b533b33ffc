use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use supportai_core::{PipelineStatus, SanitizedConfig};

use crate::metrics::encode_metrics;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

/// Current pipeline counters
pub async fn pipeline_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PipelineStatus>, impl IntoResponse> {
    match state.pipeline() {
        Some(pipeline) => Ok(Json(pipeline.status())),
        None => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: "pipeline not running in this process".to_string(),
            }),
        )),
    }
}

/// Prometheus text exposition
pub async fn metrics() -> impl IntoResponse {
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        encode_metrics(),
    )
}
