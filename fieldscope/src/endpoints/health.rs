//! Liveness endpoint

use axum::http::StatusCode;

/// GET /health
pub async fn health_handler() -> StatusCode {
    StatusCode::OK
}
