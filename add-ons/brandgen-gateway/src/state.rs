//! Shared gateway state and route table.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use brandgen_core::{CampaignManager, OpenAiImageBridge};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::handlers;

pub struct AppState {
    pub manager: CampaignManager,
    /// None when no API key is configured; preview routes stay available.
    pub bridge: Option<OpenAiImageBridge>,
}

/// API routes plus static dashboard assets. The dashboard itself is plain
/// files under `dashboard/`; the gateway renders nothing.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/templates",
            get(handlers::list_templates),
        )
        .route(
            "/api/campaigns",
            post(handlers::create_campaign).get(handlers::list_campaigns),
        )
        .route("/api/campaigns/:id", get(handlers::campaign_summary))
        .route("/api/campaigns/:id/preview", post(handlers::preview))
        .route("/api/campaigns/:id/generate", post(handlers::generate))
        .fallback_service(ServeDir::new("dashboard"))
        .layer(cors)
        .with_state(state)
}
