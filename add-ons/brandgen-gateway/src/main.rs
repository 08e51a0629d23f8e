//! Axum-based API gateway for the BrandGen dashboard.
//!
//! Serves the campaign API (templates, campaigns, prompt preview, image
//! generation) as JSON and the static dashboard assets from `dashboard/`.
//! Prompt resolution stays pure in brandgen-core; this binary is transport,
//! config, and logging.

mod error;
mod handlers;
mod state;

use std::sync::Arc;

use brandgen_core::{BrandGenConfig, CampaignManager, OpenAiImageBridge, TemplateCatalog};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use state::AppState;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = BrandGenConfig::from_env();
    let catalog = match TemplateCatalog::load(&config) {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::error!("template catalog failed to load: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!("loaded {} campaign templates", catalog.len());

    let model = config.model.clone();
    let bridge = OpenAiImageBridge::from_env().map(|b| b.with_model(&model));
    if bridge.is_none() {
        tracing::warn!("OPENAI_API_KEY not set; generation disabled, preview endpoints only");
    }

    let state = Arc::new(AppState {
        manager: CampaignManager::new(catalog, config),
        bridge,
    });
    let app = state::router(state);

    let port: u16 = std::env::var("BRANDGEN_PORT")
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(8000);
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));
    tracing::info!("brandgen-gateway listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
