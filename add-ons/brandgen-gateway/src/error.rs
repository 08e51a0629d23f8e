//! Maps core errors to HTTP responses with a JSON `{ "error": ... }` body.
//!
//! Validation failures keep their detail (which placeholder, which modifier,
//! which bound) so the dashboard can show an actionable message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use brandgen_core::CampaignError;
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    Campaign(CampaignError),
    /// No image bridge configured (OPENAI_API_KEY unset).
    BridgeUnavailable,
}

impl From<CampaignError> for ApiError {
    fn from(e: CampaignError) -> Self {
        ApiError::Campaign(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BridgeUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "image generation is not configured (OPENAI_API_KEY unset)".to_string(),
            ),
            ApiError::Campaign(e) => match e {
                CampaignError::NotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
                CampaignError::Image(_) => (StatusCode::BAD_GATEWAY, e.to_string()),
                CampaignError::Export { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
                }
                _ => (StatusCode::BAD_REQUEST, e.to_string()),
            },
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
