//! Campaign manager: tracks marketing campaigns from creation through image
//! generation.
//!
//! Campaigns live in an in-memory registry keyed by id. The manager owns the
//! template catalog and config, validates campaign specs, resolves prompts
//! through the prompt builder (optionally once per customer segment), and
//! orchestrates batch generation through the image bridge.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::BrandGenConfig;
use crate::image_service::{
    save_batch_results, GeneratedImage, ImageServiceError, ImageStyle, OpenAiImageBridge,
};
use crate::prompt::{
    resolve, CampaignParameters, GeneratedPrompt, ImageQuality, ImageSize, PromptError,
};
use crate::segment::{personalized_parameters, SegmentProfile};
use crate::template::{CampaignTemplate, TemplateCatalog};

/// User-supplied campaign definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignSpec {
    /// Display name, required non-empty.
    pub name: String,
    /// Key of the campaign template in the catalog.
    pub template: String,
    /// Placeholder values for the template's base prompt.
    #[serde(default)]
    pub values: BTreeMap<String, String>,
    /// Selected style modifiers (subset of the template's allowed set).
    #[serde(default)]
    pub modifiers: Vec<String>,
    /// Variation count; template default when unset.
    #[serde(default)]
    pub count: Option<i64>,
    #[serde(default)]
    pub size: Option<ImageSize>,
    #[serde(default)]
    pub quality: Option<ImageQuality>,
    /// Rendering style for the external API; vivid when unset.
    #[serde(default)]
    pub style: Option<ImageStyle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Created,
    Generated,
}

/// Outcome of one image request, with binary data stripped for storage and
/// export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub prompt: String,
    pub index: u32,
    /// Segment the prompt was personalized for, when segments were supplied.
    pub segment: Option<String>,
    pub url: Option<String>,
    pub revised_prompt: Option<String>,
    pub error: Option<String>,
    pub created_at: String,
}

impl GenerationRecord {
    fn from_outcome(
        prompt: &GeneratedPrompt,
        segment: Option<&str>,
        outcome: &Result<GeneratedImage, ImageServiceError>,
    ) -> Self {
        match outcome {
            Ok(image) => Self {
                prompt: image.prompt.clone(),
                index: image.index,
                segment: segment.map(str::to_string),
                url: Some(image.url.clone()),
                revised_prompt: image.revised_prompt.clone(),
                error: None,
                created_at: image.created_at.clone(),
            },
            Err(e) => Self {
                prompt: prompt.text.clone(),
                index: prompt.index,
                segment: segment.map(str::to_string),
                url: None,
                revised_prompt: None,
                error: Some(e.to_string()),
                created_at: chrono::Utc::now().to_rfc3339(),
            },
        }
    }
}

/// A campaign and everything recorded against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub spec: CampaignSpec,
    pub created_at: String,
    pub status: CampaignStatus,
    /// Timestamped audit lines, oldest first.
    pub history: Vec<String>,
    #[serde(default)]
    pub records: Vec<GenerationRecord>,
    #[serde(default)]
    pub saved_files: Vec<String>,
}

/// Row for the dashboard campaign list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignListing {
    pub id: String,
    pub name: String,
    pub status: CampaignStatus,
    pub created_at: String,
    pub images_generated: usize,
}

/// Prompts resolved for one (optional) segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptBatch {
    pub segment: Option<String>,
    pub prompts: Vec<GeneratedPrompt>,
}

/// Result counts for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub total: usize,
    pub successful: usize,
    pub saved_files: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CampaignError {
    #[error("campaign not found: {0}")]
    NotFound(String),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("unknown template: {0}")]
    UnknownTemplate(String),
    #[error(transparent)]
    Prompt(#[from] PromptError),
    #[error(transparent)]
    Image(#[from] ImageServiceError),
    #[error("failed to export campaign to {path}: {source}")]
    Export {
        path: String,
        source: std::io::Error,
    },
}

/// In-memory campaign registry plus the immutable catalog and config it
/// validates against.
pub struct CampaignManager {
    config: BrandGenConfig,
    catalog: TemplateCatalog,
    campaigns: DashMap<String, Campaign>,
}

impl CampaignManager {
    pub fn new(catalog: TemplateCatalog, config: BrandGenConfig) -> Self {
        Self {
            config,
            catalog,
            campaigns: DashMap::new(),
        }
    }

    pub fn config(&self) -> &BrandGenConfig {
        &self.config
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    /// Register a new campaign. Validates the display name and template key;
    /// placeholder coverage is checked at preview/generate time by the
    /// prompt builder.
    pub fn create(&self, spec: CampaignSpec) -> Result<String, CampaignError> {
        if spec.name.trim().is_empty() {
            return Err(CampaignError::MissingField("name"));
        }
        if self.catalog.get(&spec.template).is_none() {
            return Err(CampaignError::UnknownTemplate(spec.template));
        }

        let now = chrono::Utc::now();
        let short = Uuid::new_v4().simple().to_string();
        let id = format!(
            "campaign_{}_{}",
            now.format("%Y%m%d_%H%M%S"),
            &short[..8]
        );
        let campaign = Campaign {
            id: id.clone(),
            spec,
            created_at: now.to_rfc3339(),
            status: CampaignStatus::Created,
            history: vec![format!("Campaign created at {}", now.to_rfc3339())],
            records: Vec::new(),
            saved_files: Vec::new(),
        };
        self.campaigns.insert(id.clone(), campaign);
        tracing::info!("created campaign: {id}");
        Ok(id)
    }

    /// Resolve the campaign's prompts without touching the network.
    /// With segments supplied, one batch is resolved per segment with the
    /// `audience` value personalized; otherwise a single unlabeled batch.
    pub fn preview(
        &self,
        id: &str,
        segments: &[SegmentProfile],
    ) -> Result<Vec<PromptBatch>, CampaignError> {
        let campaign = self
            .campaigns
            .get(id)
            .ok_or_else(|| CampaignError::NotFound(id.to_string()))?;
        let (template, params) = self.request_inputs(&campaign.spec)?;

        if segments.is_empty() {
            let prompts = resolve(template, &params, self.config.max_variations)?;
            return Ok(vec![PromptBatch {
                segment: None,
                prompts,
            }]);
        }

        let mut batches = Vec::with_capacity(segments.len());
        for (segment, segment_params) in personalized_parameters(&params, segments) {
            let prompts = resolve(template, &segment_params, self.config.max_variations)?;
            batches.push(PromptBatch {
                segment: Some(segment),
                prompts,
            });
        }
        Ok(batches)
    }

    /// Resolve, dispatch through the bridge, and save the results.
    /// Per-item API failures are recorded, not fatal; validation failures
    /// abort before any request is sent.
    pub async fn generate(
        &self,
        id: &str,
        bridge: &OpenAiImageBridge,
        segments: &[SegmentProfile],
    ) -> Result<GenerationSummary, CampaignError> {
        let batches = self.preview(id, segments)?;
        let style = self
            .campaigns
            .get(id)
            .ok_or_else(|| CampaignError::NotFound(id.to_string()))?
            .spec
            .style
            .unwrap_or_default();

        let delay = std::time::Duration::from_millis(self.config.request_delay_ms);
        let output_dir = Path::new(&self.config.output_dir).join(id);
        let mut records = Vec::new();
        let mut saved: Vec<PathBuf> = Vec::new();
        let mut total = 0;
        let mut successful = 0;

        for batch in &batches {
            let outcomes = bridge.generate_batch(&batch.prompts, style, delay).await;
            let prefix = match &batch.segment {
                Some(segment) => sanitize(segment),
                None => "batch".to_string(),
            };
            saved.extend(save_batch_results(&outcomes, &output_dir, &prefix)?);

            total += outcomes.len();
            successful += outcomes.iter().filter(|o| o.is_ok()).count();
            for (prompt, outcome) in batch.prompts.iter().zip(&outcomes) {
                records.push(GenerationRecord::from_outcome(
                    prompt,
                    batch.segment.as_deref(),
                    outcome,
                ));
            }
        }

        let saved_files: Vec<String> = saved
            .iter()
            .map(|p| p.display().to_string())
            .collect();

        if let Some(mut campaign) = self.campaigns.get_mut(id) {
            campaign.records = records;
            campaign.saved_files = saved_files.clone();
            campaign.status = CampaignStatus::Generated;
            campaign.history.push(format!(
                "Images generated at {} ({successful}/{total} successful)",
                chrono::Utc::now().to_rfc3339()
            ));
        }
        tracing::info!("campaign {id}: generated {successful}/{total} images");

        Ok(GenerationSummary {
            total,
            successful,
            saved_files,
        })
    }

    pub fn summary(&self, id: &str) -> Result<Campaign, CampaignError> {
        self.campaigns
            .get(id)
            .map(|c| c.clone())
            .ok_or_else(|| CampaignError::NotFound(id.to_string()))
    }

    /// All campaigns, newest first (ids embed the creation timestamp).
    pub fn list(&self) -> Vec<CampaignListing> {
        let mut listings: Vec<CampaignListing> = self
            .campaigns
            .iter()
            .map(|entry| CampaignListing {
                id: entry.id.clone(),
                name: entry.spec.name.clone(),
                status: entry.status,
                created_at: entry.created_at.clone(),
                images_generated: entry
                    .records
                    .iter()
                    .filter(|r| r.error.is_none())
                    .count(),
            })
            .collect();
        listings.sort_by(|a, b| b.id.cmp(&a.id));
        listings
    }

    /// Write the campaign record as pretty JSON under `dir`.
    pub fn export(&self, id: &str, dir: &Path) -> Result<PathBuf, CampaignError> {
        let campaign = self.summary(id)?;
        let path = dir.join(format!("{id}_summary.json"));
        let json = serde_json::to_string_pretty(&campaign).map_err(|e| CampaignError::Export {
            path: path.display().to_string(),
            source: std::io::Error::other(e),
        })?;
        std::fs::create_dir_all(dir).map_err(|source| CampaignError::Export {
            path: path.display().to_string(),
            source,
        })?;
        std::fs::write(&path, json).map_err(|source| CampaignError::Export {
            path: path.display().to_string(),
            source,
        })?;
        tracing::info!("exported campaign {id} to {}", path.display());
        Ok(path)
    }

    fn request_inputs<'a>(
        &'a self,
        spec: &CampaignSpec,
    ) -> Result<(&'a CampaignTemplate, CampaignParameters), CampaignError> {
        let template = self
            .catalog
            .get(&spec.template)
            .ok_or_else(|| CampaignError::UnknownTemplate(spec.template.clone()))?;
        let params = CampaignParameters {
            values: spec.values.clone(),
            modifiers: spec.modifiers.clone(),
            count: spec.count.unwrap_or(i64::from(template.default_count)),
            size: spec.size,
            quality: spec.quality,
        };
        Ok((template, params))
    }
}

fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    cleaned.trim_matches('_').to_string()
}
