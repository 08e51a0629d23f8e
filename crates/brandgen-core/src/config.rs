//! BrandGen configuration loaded from `.env`.
//!
//! Everything that bounds or points at the outside world lives here: the
//! image model, the variation-count ceiling (external API cost bound), the
//! template catalog path, and the output directory. Change behavior without
//! code edits.

use serde::{Deserialize, Serialize};

fn default_model() -> String {
    "dall-e-3".to_string()
}

fn default_max_variations() -> u32 {
    10
}

fn default_output_dir() -> String {
    "generated_images".to_string()
}

fn default_request_delay_ms() -> u64 {
    1000
}

/// Service configuration loaded from environment.
///
/// | Env | Default | Description |
/// |-----|---------|--------------|
/// | BRANDGEN_MODEL | dall-e-3 | Image model passed to the external API. |
/// | BRANDGEN_MAX_VARIATIONS | 10 | Upper bound on per-request variation count. |
/// | BRANDGEN_TEMPLATES_FILE | (unset) | JSON catalog path; unset or missing file means built-ins. |
/// | BRANDGEN_OUTPUT_DIR | generated_images | Where generated images are saved. |
/// | BRANDGEN_REQUEST_DELAY_MS | 1000 | Inter-request delay for batch dispatch. |
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandGenConfig {
    /// BRANDGEN_MODEL: image model identifier sent to the external API.
    #[serde(default = "default_model")]
    pub model: String,
    /// BRANDGEN_MAX_VARIATIONS: requests asking for more variations than this are rejected.
    #[serde(default = "default_max_variations")]
    pub max_variations: u32,
    /// BRANDGEN_TEMPLATES_FILE: optional JSON catalog replacing the built-in templates.
    #[serde(default)]
    pub templates_file: Option<String>,
    /// BRANDGEN_OUTPUT_DIR: directory for saved campaign images.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// BRANDGEN_REQUEST_DELAY_MS: delay between sequential image requests in a batch.
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
}

impl Default for BrandGenConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_variations: default_max_variations(),
            templates_file: None,
            output_dir: default_output_dir(),
            request_delay_ms: default_request_delay_ms(),
        }
    }
}

impl BrandGenConfig {
    /// Load settings from environment. Unset or invalid => defaults (see struct field docs).
    pub fn from_env() -> Self {
        Self {
            model: env_string("BRANDGEN_MODEL", default_model()),
            max_variations: env_u32("BRANDGEN_MAX_VARIATIONS", default_max_variations()),
            templates_file: env_opt_string("BRANDGEN_TEMPLATES_FILE"),
            output_dir: env_string("BRANDGEN_OUTPUT_DIR", default_output_dir()),
            request_delay_ms: env_u64("BRANDGEN_REQUEST_DELAY_MS", default_request_delay_ms()),
        }
    }
}

fn env_string(name: &str, default: String) -> String {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => default,
    }
}

fn env_opt_string(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => None,
    }
}

fn env_u32(name: &str, default: u32) -> u32 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
