//! Error types for the field-capabilities service

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

/// Request-level failures
///
/// Per-field normalization failures never end up here; they are folded into
/// the `unsupported` category by the resolver.
#[derive(Debug, thiserror::Error)]
pub enum FieldscopeError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("[{error_type}] {reason}")]
    Upstream {
        status: u16,
        error_type: String,
        reason: String,
    },

    #[error("Connection to search backend failed: {0}")]
    Connection(reqwest::Error),

    #[error("Search backend timed out: {0}")]
    Timeout(String),

    #[error("Invalid response from search backend: {0}")]
    InvalidUpstreamResponse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Config error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for FieldscopeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else {
            Self::Connection(err)
        }
    }
}

/// Elasticsearch error envelope, e.g.
/// `{"error": {"type": "index_not_found_exception", "reason": "..."}, "status": 404}`
#[derive(Debug, Deserialize)]
struct EsErrorEnvelope {
    error: EsErrorBody,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EsErrorBody {
    Detailed(EsErrorDetail),
    Message(String),
}

#[derive(Debug, Deserialize)]
struct EsErrorDetail {
    #[serde(rename = "type")]
    error_type: String,
    #[serde(default)]
    reason: Option<String>,
}

impl FieldscopeError {
    /// Build an [`FieldscopeError::Upstream`] from a non-success backend reply.
    pub fn upstream(status: u16, body: &str) -> Self {
        let (error_type, reason) = match serde_json::from_str::<EsErrorEnvelope>(body) {
            Ok(EsErrorEnvelope {
                error: EsErrorBody::Detailed(detail),
            }) => {
                let reason = detail.reason.unwrap_or_else(|| detail.error_type.clone());
                (detail.error_type, reason)
            }
            Ok(EsErrorEnvelope {
                error: EsErrorBody::Message(message),
            }) => ("error".to_string(), message),
            Err(_) => {
                let trimmed = body.trim();
                let reason = if trimmed.is_empty() {
                    format!("search backend responded with status {}", status)
                } else {
                    trimmed.to_string()
                };
                ("error".to_string(), reason)
            }
        };

        Self::Upstream {
            status,
            error_type,
            reason,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Upstream { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            Self::Connection(_) | Self::InvalidUpstreamResponse(_) => StatusCode::BAD_GATEWAY,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::InvalidUrl(_) | Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Platform-style error body: `{"statusCode": 404, "error": "Not Found", "message": "..."}`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    status_code: u16,
    error: String,
    message: String,
}

impl IntoResponse for FieldscopeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "Request failed: {}", message);
        } else {
            tracing::warn!(status = status.as_u16(), "Request rejected: {}", message);
        }

        let body = ErrorResponse {
            status_code: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message,
        };

        (status, axum::Json(body)).into_response()
    }
}
