//! Segment personalization.
//!
//! Maps precomputed customer-segment characteristics (mean age, dominant
//! gender, dominant interest) to an audience phrase, and expands one
//! parameter set per segment so a campaign batch can target each segment
//! with its own wording. Segmentation itself happens upstream; these are
//! plain value structs.

use serde::{Deserialize, Serialize};

use crate::prompt::CampaignParameters;

/// Characteristics of one customer segment, as produced by the upstream
/// analysis step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentProfile {
    /// Segment label, e.g. `segment_0` or `Digital Natives`.
    pub name: String,
    /// Number of customers in the segment.
    #[serde(default)]
    pub size: u64,
    /// Mean age, when the dataset carried an age column.
    #[serde(default)]
    pub avg_age: Option<f32>,
    /// Most common gender value, when present.
    #[serde(default)]
    pub gender_mode: Option<String>,
    /// Most common interest value, when present.
    #[serde(default)]
    pub interest_mode: Option<String>,
}

impl SegmentProfile {
    /// Deterministic audience wording for this segment.
    ///
    /// Age bands: <25 young adults, <35 millennials, <50 middle-aged
    /// professionals, otherwise mature adults. Unknown gender reads as a
    /// diverse audience.
    pub fn audience_phrase(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        match self.avg_age {
            Some(age) if age < 25.0 => parts.push("young adults (18-25)".to_string()),
            Some(age) if age < 35.0 => parts.push("millennials (25-35)".to_string()),
            Some(age) if age < 50.0 => parts.push("middle-aged professionals (35-50)".to_string()),
            Some(_) => parts.push("mature adults (50+)".to_string()),
            None => parts.push("a general audience".to_string()),
        }

        match self.gender_mode.as_deref() {
            Some(g) if g.eq_ignore_ascii_case("male") || g.eq_ignore_ascii_case("female") => {
                parts.push(format!("primarily {} audience", g.to_lowercase()));
            }
            Some(_) => parts.push("diverse audience".to_string()),
            None => {}
        }

        if let Some(interest) = self
            .interest_mode
            .as_deref()
            .filter(|i| !i.trim().is_empty())
        {
            parts.push(format!("with interests in {}", interest.trim()));
        }

        parts.join(" ")
    }
}

/// One parameter set per segment: the base parameters with the `audience`
/// placeholder replaced by the segment's phrase. Returned in input order,
/// paired with the segment name for labeling results.
pub fn personalized_parameters(
    base: &CampaignParameters,
    segments: &[SegmentProfile],
) -> Vec<(String, CampaignParameters)> {
    segments
        .iter()
        .map(|segment| {
            let mut params = base.clone();
            params
                .values
                .insert("audience".to_string(), segment.audience_phrase());
            (segment.name.clone(), params)
        })
        .collect()
}
