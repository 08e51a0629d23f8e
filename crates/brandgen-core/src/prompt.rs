//! Campaign Prompt Builder.
//!
//! Pure resolution of a [`CampaignTemplate`](crate::CampaignTemplate) plus
//! caller-supplied [`CampaignParameters`] into an ordered batch of
//! [`GeneratedPrompt`]s. No I/O, no clock, no network: every validation
//! failure is reported before any external call would be attempted, and two
//! identical calls produce identical output.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::template::{CampaignTemplate, PLACEHOLDER_RE};

/// Image dimensions the external API accepts, in its wire spelling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageSize {
    #[default]
    #[serde(rename = "1024x1024")]
    Square1024,
    #[serde(rename = "1792x1024")]
    Landscape1792,
    #[serde(rename = "1024x1792")]
    Portrait1792,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::Square1024 => "1024x1024",
            ImageSize::Landscape1792 => "1792x1024",
            ImageSize::Portrait1792 => "1024x1792",
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quality tier the external API accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageQuality {
    #[default]
    Standard,
    Hd,
}

impl ImageQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageQuality::Standard => "standard",
            ImageQuality::Hd => "hd",
        }
    }
}

impl fmt::Display for ImageQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied inputs for one generation request. Built per request,
/// discarded after use.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CampaignParameters {
    /// Placeholder name -> value. Must cover every placeholder the chosen
    /// template references; values must be non-empty.
    #[serde(default)]
    pub values: BTreeMap<String, String>,
    /// Selected style modifiers, a subset of the template's allowed set.
    #[serde(default)]
    pub modifiers: Vec<String>,
    /// Requested variation count. Signed so an out-of-range request from the
    /// wire is reported as `InvalidCount` rather than a decode failure.
    pub count: i64,
    /// Override for the template's default size.
    #[serde(default)]
    pub size: Option<ImageSize>,
    /// Override for the template's default quality tier.
    #[serde(default)]
    pub quality: Option<ImageQuality>,
}

impl CampaignParameters {
    pub fn new(count: i64) -> Self {
        Self {
            count,
            ..Self::default()
        }
    }

    pub fn with_value(mut self, name: &str, value: &str) -> Self {
        self.values.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_modifier(mut self, modifier: &str) -> Self {
        self.modifiers.push(modifier.to_string());
        self
    }

    pub fn with_size(mut self, size: ImageSize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_quality(mut self, quality: ImageQuality) -> Self {
        self.quality = Some(quality);
        self
    }
}

/// One finalized prompt, ready for submission to the image API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPrompt {
    /// Final text: placeholders resolved, selected modifiers appended.
    pub text: String,
    pub size: ImageSize,
    pub quality: ImageQuality,
    /// 0-based position within the requested batch.
    pub index: u32,
}

/// Validation failures detected before any external call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PromptError {
    #[error("no value supplied for placeholder {{{0}}}")]
    MissingPlaceholderValue(String),
    #[error("modifier not in the template's allowed set: {0}")]
    InvalidModifier(String),
    #[error("variation count {requested} out of range (must be 1..={max})")]
    InvalidCount { requested: i64, max: u32 },
}

/// Resolve a template against campaign parameters into one prompt per
/// requested variation.
///
/// Substitution is exact, case-sensitive `{name}` token replacement in a
/// single pass over the base prompt, so a parameter value containing brace
/// text is carried through literally and never re-expanded. Selected
/// modifiers are appended as a comma-joined suffix in selection order.
/// All-or-nothing: any validation failure returns an error and no prompts.
///
/// `max_variations` bounds the batch size (external API cost); a request
/// above it is rejected, never clamped.
pub fn resolve(
    template: &CampaignTemplate,
    params: &CampaignParameters,
    max_variations: u32,
) -> Result<Vec<GeneratedPrompt>, PromptError> {
    for name in template.placeholders() {
        match params.values.get(&name) {
            Some(value) if !value.trim().is_empty() => {}
            _ => return Err(PromptError::MissingPlaceholderValue(name)),
        }
    }

    for modifier in &params.modifiers {
        if !template.allows_modifier(modifier) {
            return Err(PromptError::InvalidModifier(modifier.clone()));
        }
    }

    if params.count < 1 || params.count > i64::from(max_variations) {
        return Err(PromptError::InvalidCount {
            requested: params.count,
            max: max_variations,
        });
    }

    let mut text = PLACEHOLDER_RE
        .replace_all(&template.base_prompt, |caps: &regex::Captures| {
            params.values.get(&caps[1]).cloned().unwrap_or_default()
        })
        .into_owned();

    if !params.modifiers.is_empty() {
        text.push_str(", ");
        text.push_str(&params.modifiers.join(", "));
    }

    let size = params.size.unwrap_or(template.default_size);
    let quality = params.quality.unwrap_or(template.default_quality);

    Ok((0..params.count as u32)
        .map(|index| GeneratedPrompt {
            text: text.clone(),
            size,
            quality,
            index,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> CampaignTemplate {
        CampaignTemplate {
            key: "t".into(),
            industry: "Test".into(),
            base_prompt: "A {mood} advertisement for {product} aimed at {audience}".into(),
            modifiers: vec!["studio lighting".into(), "bold typography".into()],
            default_count: 2,
            default_size: ImageSize::Square1024,
            default_quality: ImageQuality::Standard,
        }
    }

    fn params() -> CampaignParameters {
        CampaignParameters::new(2)
            .with_value("product", "sneakers")
            .with_value("audience", "runners")
            .with_value("mood", "energetic")
    }

    #[test]
    fn resolves_the_worked_example() {
        let p = params().with_modifier("studio lighting");
        let prompts = resolve(&template(), &p, 10).expect("valid request");
        assert_eq!(prompts.len(), 2);
        for (i, prompt) in prompts.iter().enumerate() {
            assert_eq!(
                prompt.text,
                "A energetic advertisement for sneakers aimed at runners, studio lighting"
            );
            assert_eq!(prompt.index, i as u32);
        }
    }

    #[test]
    fn whitespace_only_value_counts_as_missing() {
        let p = params().with_value("mood", "   ");
        let err = resolve(&template(), &p, 10).unwrap_err();
        assert_eq!(err, PromptError::MissingPlaceholderValue("mood".into()));
    }

    #[test]
    fn brace_text_in_a_value_is_not_reexpanded() {
        let p = params().with_value("product", "{audience} gear");
        let prompts = resolve(&template(), &p, 10).expect("valid request");
        assert_eq!(
            prompts[0].text,
            "A energetic advertisement for {audience} gear aimed at runners"
        );
    }

    #[test]
    fn size_and_quality_fall_back_to_template_defaults() {
        let prompts = resolve(&template(), &params(), 10).expect("valid request");
        assert_eq!(prompts[0].size, ImageSize::Square1024);
        assert_eq!(prompts[0].quality, ImageQuality::Standard);

        let p = params()
            .with_size(ImageSize::Landscape1792)
            .with_quality(ImageQuality::Hd);
        let prompts = resolve(&template(), &p, 10).expect("valid request");
        assert_eq!(prompts[0].size, ImageSize::Landscape1792);
        assert_eq!(prompts[0].quality, ImageQuality::Hd);
    }
}
