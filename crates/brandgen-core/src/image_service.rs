//! OpenAI image bridge: submits finalized prompts to the external
//! text-to-image API and downloads the results.
//!
//! The bridge never builds prompt text itself. Callers resolve prompts
//! through the Campaign Prompt Builder first and hand over
//! [`GeneratedPrompt`]s; everything here is transport. Batches are
//! dispatched sequentially with a fixed delay between requests so a large
//! campaign stays inside the provider's rate limits.
//!
//! API key: `OPENAI_API_KEY` in `.env`. Default model: `dall-e-3`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::prompt::GeneratedPrompt;

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

/// Rendering style accepted by the image API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageStyle {
    #[default]
    Vivid,
    Natural,
}

impl ImageStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageStyle::Vivid => "vivid",
            ImageStyle::Natural => "natural",
        }
    }
}

// Wire types for POST /images/generations
#[derive(Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
    quality: &'a str,
    style: &'a str,
}

#[derive(Deserialize)]
struct ImageResponse {
    data: Vec<ImageDatum>,
}

#[derive(Deserialize)]
struct ImageDatum {
    url: Option<String>,
    revised_prompt: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ImageServiceError {
    #[error("image request failed: {0}")]
    Request(String),
    #[error("image API error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("image response parse failed: {0}")]
    Parse(String),
    #[error("image response contained no image")]
    EmptyResponse,
    #[error("image download failed: {0}")]
    Download(String),
    #[error("failed to write image file: {0}")]
    Save(#[from] std::io::Error),
}

/// One successfully generated image with its request metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedImage {
    /// Prompt text as submitted.
    pub prompt: String,
    /// Variation index within the batch.
    pub index: u32,
    /// Source URL returned by the API.
    pub url: String,
    /// Provider-side rewrite of the prompt, when reported.
    pub revised_prompt: Option<String>,
    pub size: String,
    pub quality: String,
    pub model: String,
    /// RFC 3339 generation timestamp.
    pub created_at: String,
    /// Raw image bytes; excluded from JSON exports.
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// Reqwest client for the external image API. Prompt construction and
/// validation stay in the prompt builder; the bridge only ships finalized
/// prompts out and bytes back.
pub struct OpenAiImageBridge {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiImageBridge {
    /// Create a bridge using `OPENAI_API_KEY` from the environment.
    /// Returns `None` if no key is set, so callers can keep the pure paths
    /// (template listing, prompt preview) available without credentials.
    pub fn from_env() -> Option<Self> {
        let key = std::env::var("OPENAI_API_KEY").ok()?.trim().to_string();
        if key.is_empty() {
            return None;
        }
        Some(Self::new(key))
    }

    /// Create a bridge with an explicit API key.
    pub fn new(api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            api_key: api_key.trim().to_string(),
            model: DEFAULT_IMAGE_MODEL.to_string(),
            client,
        }
    }

    /// Set the model (e.g. `dall-e-3`, `dall-e-2`).
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate one image for a resolved prompt and download its bytes.
    pub async fn generate(
        &self,
        prompt: &GeneratedPrompt,
        style: ImageStyle,
    ) -> Result<GeneratedImage, ImageServiceError> {
        tracing::info!(
            index = prompt.index,
            "generating image: {}",
            truncate(&prompt.text, 100)
        );

        let url = format!("{}/images/generations", OPENAI_API_BASE);
        let body = ImageRequest {
            model: &self.model,
            prompt: &prompt.text,
            n: 1,
            size: prompt.size.as_str(),
            quality: prompt.quality.as_str(),
            style: style.as_str(),
        };

        let res = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ImageServiceError::Request(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(ImageServiceError::Api { status, body });
        }

        let parsed: ImageResponse = res
            .json()
            .await
            .map_err(|e| ImageServiceError::Parse(e.to_string()))?;

        let datum = parsed.data.first().ok_or(ImageServiceError::EmptyResponse)?;
        let image_url = datum
            .url
            .clone()
            .ok_or(ImageServiceError::EmptyResponse)?;

        let bytes = self.download(&image_url).await?;

        Ok(GeneratedImage {
            prompt: prompt.text.clone(),
            index: prompt.index,
            url: image_url,
            revised_prompt: datum.revised_prompt.clone(),
            size: prompt.size.to_string(),
            quality: prompt.quality.to_string(),
            model: self.model.clone(),
            created_at: chrono::Utc::now().to_rfc3339(),
            bytes,
        })
    }

    /// Generate a batch sequentially with `delay` between requests.
    /// A failed item is recorded and does not abort the rest of the batch;
    /// results are aligned with the input prompt order.
    pub async fn generate_batch(
        &self,
        prompts: &[GeneratedPrompt],
        style: ImageStyle,
        delay: Duration,
    ) -> Vec<Result<GeneratedImage, ImageServiceError>> {
        tracing::info!("starting batch generation of {} images", prompts.len());
        let mut results = Vec::with_capacity(prompts.len());

        for (i, prompt) in prompts.iter().enumerate() {
            let outcome = self.generate(prompt, style).await;
            if let Err(e) = &outcome {
                tracing::warn!("image {}/{} failed: {e}", i + 1, prompts.len());
            }
            results.push(outcome);
            if i + 1 < prompts.len() {
                tokio::time::sleep(delay).await;
            }
        }

        let successful = results.iter().filter(|r| r.is_ok()).count();
        tracing::info!(
            "batch generation completed: {successful}/{} successful",
            prompts.len()
        );
        results
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, ImageServiceError> {
        let res = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ImageServiceError::Download(e.to_string()))?;
        if !res.status().is_success() {
            return Err(ImageServiceError::Download(format!(
                "status {} from image host",
                res.status()
            )));
        }
        res.bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| ImageServiceError::Download(e.to_string()))
    }
}

/// Write the successful images of a batch under `output_dir` as
/// `{prefix}_{index}_{timestamp}.png`. Failed items are skipped; the
/// directory is created if missing.
pub fn save_batch_results(
    results: &[Result<GeneratedImage, ImageServiceError>],
    output_dir: &Path,
    prefix: &str,
) -> Result<Vec<PathBuf>, ImageServiceError> {
    std::fs::create_dir_all(output_dir)?;
    let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let mut saved = Vec::new();

    for image in results.iter().filter_map(|r| r.as_ref().ok()) {
        let filename = format!("{prefix}_{}_{stamp}.png", image.index);
        let path = output_dir.join(filename);
        std::fs::write(&path, &image.bytes)?;
        tracing::info!("image saved to {}", path.display());
        saved.push(path);
    }
    Ok(saved)
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{ImageQuality, ImageSize};

    #[test]
    fn request_body_uses_wire_spellings() {
        let body = ImageRequest {
            model: "dall-e-3",
            prompt: "a poster",
            n: 1,
            size: ImageSize::Landscape1792.as_str(),
            quality: ImageQuality::Hd.as_str(),
            style: ImageStyle::Natural.as_str(),
        };
        let json = serde_json::to_value(&body).expect("serializable");
        assert_eq!(json["size"], "1792x1024");
        assert_eq!(json["quality"], "hd");
        assert_eq!(json["style"], "natural");
    }

    #[test]
    fn exported_image_omits_binary_data() {
        let image = GeneratedImage {
            prompt: "p".into(),
            index: 0,
            url: "https://example.com/i.png".into(),
            revised_prompt: None,
            size: "1024x1024".into(),
            quality: "standard".into(),
            model: "dall-e-3".into(),
            created_at: "2024-01-01T00:00:00Z".into(),
            bytes: vec![1, 2, 3],
        };
        let json = serde_json::to_value(&image).expect("serializable");
        assert!(json.get("bytes").is_none());
    }

    #[test]
    fn save_batch_skips_failures() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ok = GeneratedImage {
            prompt: "p".into(),
            index: 1,
            url: "u".into(),
            revised_prompt: None,
            size: "1024x1024".into(),
            quality: "standard".into(),
            model: "dall-e-3".into(),
            created_at: "2024-01-01T00:00:00Z".into(),
            bytes: vec![0xAB],
        };
        let results = vec![Err(ImageServiceError::EmptyResponse), Ok(ok)];
        let saved = save_batch_results(&results, dir.path(), "test").expect("saved");
        assert_eq!(saved.len(), 1);
        assert!(saved[0]
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("test_1_")));
    }
}
