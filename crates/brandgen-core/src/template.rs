//! Campaign template catalog.
//!
//! A template is a reusable prompt skeleton for one industry: a base prompt
//! with named `{placeholder}` tokens, the style modifiers a campaign may
//! select from, and default request metadata. Templates are immutable once
//! loaded. The catalog ships with built-in industry templates and can be
//! replaced wholesale by a JSON file (`BRANDGEN_TEMPLATES_FILE`).

use std::collections::BTreeMap;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::BrandGenConfig;
use crate::prompt::{ImageQuality, ImageSize};

/// `{ident}` tokens in a base prompt. Case-sensitive; substitution is exact.
pub(crate) static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder regex"));

fn default_count() -> u32 {
    2
}

/// Reusable prompt skeleton for one industry/campaign type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignTemplate {
    /// Catalog key, e.g. `fashion_brand`.
    pub key: String,
    /// Industry label shown on the dashboard.
    pub industry: String,
    /// Base prompt with `{placeholder}` tokens.
    pub base_prompt: String,
    /// Allowed style modifiers, in presentation order.
    #[serde(default)]
    pub modifiers: Vec<String>,
    /// Default variation count when a request does not specify one.
    #[serde(default = "default_count")]
    pub default_count: u32,
    /// Default image size when a request does not specify one.
    #[serde(default)]
    pub default_size: ImageSize,
    /// Default quality tier when a request does not specify one.
    #[serde(default)]
    pub default_quality: ImageQuality,
}

impl CampaignTemplate {
    /// Placeholder names referenced by the base prompt, in first-occurrence
    /// order, de-duplicated.
    pub fn placeholders(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for caps in PLACEHOLDER_RE.captures_iter(&self.base_prompt) {
            let name = caps[1].to_string();
            if !seen.contains(&name) {
                seen.push(name);
            }
        }
        seen
    }

    /// True when `modifier` is in this template's allowed set.
    pub fn allows_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("failed to read template catalog {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("malformed template catalog {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("template catalog contains no templates")]
    Empty,
    #[error("duplicate template key: {0}")]
    DuplicateKey(String),
}

/// Immutable collection of campaign templates, keyed for lookup and ordered
/// for dashboard listing.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    templates: BTreeMap<String, CampaignTemplate>,
}

impl TemplateCatalog {
    /// The built-in industry catalog (fashion, tech, food, fitness, luxury).
    pub fn builtin() -> Self {
        let mut catalog = Self {
            templates: BTreeMap::new(),
        };
        for template in builtin_templates() {
            catalog.templates.insert(template.key.clone(), template);
        }
        catalog
    }

    /// Load a catalog from a JSON file holding an array of templates.
    pub fn from_file(path: &Path) -> Result<Self, TemplateError> {
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: display.clone(),
            source,
        })?;
        let entries: Vec<CampaignTemplate> =
            serde_json::from_str(&raw).map_err(|source| TemplateError::Parse {
                path: display,
                source,
            })?;
        if entries.is_empty() {
            return Err(TemplateError::Empty);
        }
        let mut templates = BTreeMap::new();
        for template in entries {
            if templates
                .insert(template.key.clone(), template.clone())
                .is_some()
            {
                return Err(TemplateError::DuplicateKey(template.key));
            }
        }
        Ok(Self { templates })
    }

    /// Catalog for the given config: the JSON file when configured and
    /// present, built-ins otherwise. A configured-but-missing file falls back
    /// to built-ins with a warning; a malformed file is an error.
    pub fn load(config: &BrandGenConfig) -> Result<Self, TemplateError> {
        match &config.templates_file {
            Some(path) if Path::new(path).exists() => Self::from_file(Path::new(path)),
            Some(path) => {
                tracing::warn!("template catalog {path} not found, using built-in templates");
                Ok(Self::builtin())
            }
            None => Ok(Self::builtin()),
        }
    }

    pub fn get(&self, key: &str) -> Option<&CampaignTemplate> {
        self.templates.get(key)
    }

    /// All templates in key order.
    pub fn list(&self) -> Vec<&CampaignTemplate> {
        self.templates.values().collect()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn builtin_templates() -> Vec<CampaignTemplate> {
    let base = |industry: &str| {
        format!(
            "A {{mood}} marketing photograph of {{product}} aimed at {{audience}}, \
             high quality, professional composition, suitable for {industry} campaigns"
        )
    };
    vec![
        CampaignTemplate {
            key: "fashion_brand".into(),
            industry: "Fashion".into(),
            base_prompt: base("fashion"),
            modifiers: vec![
                "trendy models".into(),
                "urban background".into(),
                "vibrant colors".into(),
            ],
            default_count: 2,
            default_size: ImageSize::Square1024,
            default_quality: ImageQuality::Standard,
        },
        CampaignTemplate {
            key: "tech_product".into(),
            industry: "Technology".into(),
            base_prompt: base("technology"),
            modifiers: vec![
                "sleek design".into(),
                "minimalist".into(),
                "high-tech environment".into(),
            ],
            default_count: 2,
            default_size: ImageSize::Landscape1792,
            default_quality: ImageQuality::Standard,
        },
        CampaignTemplate {
            key: "food_restaurant".into(),
            industry: "Food & Beverage".into(),
            base_prompt: base("food and beverage"),
            modifiers: vec![
                "delicious presentation".into(),
                "cozy atmosphere".into(),
                "natural lighting".into(),
            ],
            default_count: 2,
            default_size: ImageSize::Square1024,
            default_quality: ImageQuality::Standard,
        },
        CampaignTemplate {
            key: "fitness_health".into(),
            industry: "Health & Fitness".into(),
            base_prompt: base("health and fitness"),
            modifiers: vec![
                "active people".into(),
                "gym environment".into(),
                "dynamic poses".into(),
            ],
            default_count: 2,
            default_size: ImageSize::Portrait1792,
            default_quality: ImageQuality::Standard,
        },
        CampaignTemplate {
            key: "luxury_goods".into(),
            industry: "Luxury".into(),
            base_prompt: base("luxury"),
            modifiers: vec![
                "premium materials".into(),
                "elegant lighting".into(),
                "refined setting".into(),
            ],
            default_count: 2,
            default_size: ImageSize::Square1024,
            default_quality: ImageQuality::Hd,
        },
    ]
}
