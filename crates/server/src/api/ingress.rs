//! Ingress: accepts complaints over HTTP and publishes them to the raw subject.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use super::handlers::ErrorResponse;
use crate::metrics::INGRESS_MESSAGES_TOTAL;
use crate::state::AppState;

/// Request body for submitting a complaint
#[derive(Debug, Deserialize)]
pub struct SendMessageBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// Response after the complaint was handed to the bus
#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub status: String,
    pub message: String,
}

fn reject(status: StatusCode, result: &str, error: &str) -> (StatusCode, Json<ErrorResponse>) {
    INGRESS_MESSAGES_TOTAL.with_label_values(&[result]).inc();
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

/// Publish a raw complaint. Enrichment happens asynchronously; the caller
/// never learns its outcome.
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SendMessageBody>, JsonRejection>,
) -> Result<Json<SendMessageResponse>, impl IntoResponse> {
    let Ok(Json(body)) = body else {
        return Err(reject(StatusCode::BAD_REQUEST, "invalid_body", "invalid body"));
    };

    let message = match body.message {
        Some(message) if !message.is_empty() => message,
        _ => {
            return Err(reject(
                StatusCode::BAD_REQUEST,
                "empty_message",
                "message is required",
            ))
        }
    };

    let subject = state.raw_subject();
    if let Err(e) = state
        .bus()
        .publish(subject, Bytes::from(message.clone()))
        .await
    {
        error!(error = %e, subject, "Failed to publish raw message");
        return Err(reject(
            StatusCode::INTERNAL_SERVER_ERROR,
            "publish_failed",
            "failed to publish message",
        ));
    }

    INGRESS_MESSAGES_TOTAL.with_label_values(&["sent"]).inc();
    info!(subject, message = %message, "Sent raw message");

    Ok(Json(SendMessageResponse {
        status: "sent".to_string(),
        message,
    }))
}
