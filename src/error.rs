//! Error taxonomy for the generation pipeline.
//!
//! Only genuinely unrecoverable conditions reach the caller. A failed feed
//! fetch is absorbed inside the retriever and never appears here; partial
//! failures within a multi-call batch are absorbed by the orchestrator as
//! long as at least one call succeeds.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::TARGET_LLM_REQUEST;

#[derive(Debug, Error)]
pub enum SenryuError {
    /// Malformed request body. Always client-caused.
    #[error("{0}")]
    InvalidInput(String),

    /// Wrong HTTP method on the generation route.
    #[error("method not allowed")]
    MethodNotAllowed,

    /// Transport/auth/HTTP-level failure from the generation backend.
    #[error("upstream generation failed: {0}")]
    UpstreamError(String),

    /// Generation succeeded transport-wise but produced no usable text
    /// across all attempts. Carries the last known stop reason, if any.
    #[error("upstream generation returned no usable content")]
    EmptyGeneration(Option<String>),
}

impl IntoResponse for SenryuError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            SenryuError::InvalidInput(message) => (StatusCode::BAD_REQUEST, message.clone()),
            SenryuError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "Method not allowed".to_string(),
            ),
            SenryuError::UpstreamError(detail) => {
                // The detail stays in the logs; callers get a generic message.
                error!(target: TARGET_LLM_REQUEST, "Generation backend failure: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Upstream generation failed".to_string(),
                )
            }
            SenryuError::EmptyGeneration(reason) => (
                StatusCode::BAD_GATEWAY,
                reason
                    .clone()
                    .unwrap_or_else(|| "Empty generation".to_string()),
            ),
        };

        let mut response = (status, Json(json!({ "error": message }))).into_response();
        response.headers_mut().insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
        response
    }
}
