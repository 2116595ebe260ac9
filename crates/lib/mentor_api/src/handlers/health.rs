//! Health endpoint.

use axum::Json;

use crate::models::{HealthResponse, timestamp_now};

/// `GET /api/health` — liveness check; never touches the upstream model.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".into(),
        message: "Chatbot API is running".into(),
        timestamp: timestamp_now(),
    })
}
