//! Request handlers for the dashboard API.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use brandgen_core::{
    Campaign, CampaignListing, CampaignSpec, GenerationSummary, PromptBatch, SegmentProfile,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

/// Template as the dashboard sees it: catalog entry plus the placeholder
/// names the form must collect.
#[derive(Debug, Serialize)]
pub struct TemplateView {
    pub key: String,
    pub industry: String,
    pub base_prompt: String,
    pub modifiers: Vec<String>,
    pub placeholders: Vec<String>,
    pub default_count: u32,
    pub default_size: String,
    pub default_quality: String,
}

pub async fn list_templates(State(state): State<Arc<AppState>>) -> Json<Vec<TemplateView>> {
    let views = state
        .manager
        .catalog()
        .list()
        .into_iter()
        .map(|t| TemplateView {
            key: t.key.clone(),
            industry: t.industry.clone(),
            base_prompt: t.base_prompt.clone(),
            modifiers: t.modifiers.clone(),
            placeholders: t.placeholders(),
            default_count: t.default_count,
            default_size: t.default_size.to_string(),
            default_quality: t.default_quality.to_string(),
        })
        .collect();
    Json(views)
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: String,
}

pub async fn create_campaign(
    State(state): State<Arc<AppState>>,
    Json(spec): Json<CampaignSpec>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let id = state.manager.create(spec)?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

pub async fn list_campaigns(State(state): State<Arc<AppState>>) -> Json<Vec<CampaignListing>> {
    Json(state.manager.list())
}

pub async fn campaign_summary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Campaign>, ApiError> {
    Ok(Json(state.manager.summary(&id)?))
}

/// Body for preview and generate: optional segment profiles for
/// per-segment personalization.
#[derive(Debug, Default, Deserialize)]
pub struct GenerationRequest {
    #[serde(default)]
    pub segments: Vec<SegmentProfile>,
}

pub async fn preview(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<GenerationRequest>,
) -> Result<Json<Vec<PromptBatch>>, ApiError> {
    Ok(Json(state.manager.preview(&id, &request.segments)?))
}

pub async fn generate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<GenerationRequest>,
) -> Result<Json<GenerationSummary>, ApiError> {
    let bridge = state.bridge.as_ref().ok_or(ApiError::BridgeUnavailable)?;
    let summary = state.manager.generate(&id, bridge, &request.segments).await?;
    Ok(Json(summary))
}
