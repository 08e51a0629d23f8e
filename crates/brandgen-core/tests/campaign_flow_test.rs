//! Integration test: campaign lifecycle — catalog loading, campaign
//! creation, segment-personalized prompt preview, and JSON export.
//!
//! ## Scenarios
//! 1. JSON catalog file replaces the built-ins; malformed files are errors.
//! 2. Campaign creation validates the display name and template key.
//! 3. Preview resolves one unlabeled batch without segments, one labeled
//!    batch per segment with them, and never performs I/O.
//! 4. Prompt validation surfaces through the manager unchanged.
//! 5. Export writes a JSON record that round-trips.
//! 6. Listing reports status and generated-image counts.

use std::collections::BTreeMap;
use std::io::Write;

use brandgen_core::{
    BrandGenConfig, CampaignError, CampaignManager, CampaignSpec, CampaignStatus, PromptError,
    SegmentProfile, TemplateCatalog,
};

fn manager() -> CampaignManager {
    CampaignManager::new(TemplateCatalog::builtin(), BrandGenConfig::default())
}

fn sneaker_spec() -> CampaignSpec {
    let mut values = BTreeMap::new();
    values.insert("product".to_string(), "sneakers".to_string());
    values.insert("audience".to_string(), "runners".to_string());
    values.insert("mood".to_string(), "energetic".to_string());
    CampaignSpec {
        name: "Summer Sneakers".into(),
        template: "fashion_brand".into(),
        values,
        modifiers: vec!["urban background".into()],
        count: Some(2),
        size: None,
        quality: None,
        style: None,
    }
}

// ===========================================================================
// Scenario 1: catalog file loading
// ===========================================================================

#[test]
fn catalog_file_replaces_builtins() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    write!(
        file,
        r#"[{{
            "key": "pet_supplies",
            "industry": "Pets",
            "base_prompt": "A {{mood}} photo of {{product}} for {{audience}}",
            "modifiers": ["soft lighting"],
            "default_count": 3
        }}]"#
    )
    .expect("write catalog");

    let config = BrandGenConfig {
        templates_file: Some(file.path().display().to_string()),
        ..BrandGenConfig::default()
    };
    let catalog = TemplateCatalog::load(&config).expect("catalog loads");
    assert_eq!(catalog.len(), 1);
    let template = catalog.get("pet_supplies").expect("file template");
    assert_eq!(template.default_count, 3);
    assert_eq!(template.placeholders(), vec!["mood", "product", "audience"]);
}

#[test]
fn malformed_catalog_is_an_error_but_missing_file_falls_back() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    write!(file, "not json").expect("write");
    let config = BrandGenConfig {
        templates_file: Some(file.path().display().to_string()),
        ..BrandGenConfig::default()
    };
    assert!(TemplateCatalog::load(&config).is_err());

    let config = BrandGenConfig {
        templates_file: Some("/nonexistent/catalog.json".into()),
        ..BrandGenConfig::default()
    };
    let catalog = TemplateCatalog::load(&config).expect("falls back to built-ins");
    assert_eq!(catalog.len(), 5);
}

// ===========================================================================
// Scenario 2: campaign creation validation
// ===========================================================================

#[test]
fn create_rejects_blank_name_and_unknown_template() {
    let manager = manager();

    let mut spec = sneaker_spec();
    spec.name = "   ".into();
    assert!(matches!(
        manager.create(spec),
        Err(CampaignError::MissingField("name"))
    ));

    let mut spec = sneaker_spec();
    spec.template = "no_such_template".into();
    assert!(matches!(
        manager.create(spec),
        Err(CampaignError::UnknownTemplate(t)) if t == "no_such_template"
    ));

    assert!(manager.list().is_empty(), "failed creates register nothing");
}

#[test]
fn created_campaign_starts_with_history() {
    let manager = manager();
    let id = manager.create(sneaker_spec()).expect("valid spec");
    assert!(id.starts_with("campaign_"));
    let campaign = manager.summary(&id).expect("registered");
    assert_eq!(campaign.status, CampaignStatus::Created);
    assert_eq!(campaign.history.len(), 1);
}

// ===========================================================================
// Scenario 3: preview, with and without segments
// ===========================================================================

#[test]
fn preview_without_segments_is_one_unlabeled_batch() {
    let manager = manager();
    let id = manager.create(sneaker_spec()).expect("valid spec");
    let batches = manager.preview(&id, &[]).expect("resolvable");
    assert_eq!(batches.len(), 1);
    assert!(batches[0].segment.is_none());
    assert_eq!(batches[0].prompts.len(), 2);
    assert!(batches[0].prompts[0].text.contains("sneakers"));
    assert!(batches[0].prompts[0].text.ends_with(", urban background"));
}

#[test]
fn preview_personalizes_audience_per_segment() {
    let manager = manager();
    let id = manager.create(sneaker_spec()).expect("valid spec");
    let segments = vec![
        SegmentProfile {
            name: "students".into(),
            size: 120,
            avg_age: Some(21.0),
            gender_mode: None,
            interest_mode: Some("running".into()),
        },
        SegmentProfile {
            name: "veterans".into(),
            size: 45,
            avg_age: Some(58.0),
            gender_mode: Some("male".into()),
            interest_mode: None,
        },
    ];
    let batches = manager.preview(&id, &segments).expect("resolvable");
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].segment.as_deref(), Some("students"));
    assert!(batches[0].prompts[0]
        .text
        .contains("young adults (18-25) with interests in running"));
    assert!(batches[1].prompts[0]
        .text
        .contains("mature adults (50+) primarily male audience"));
    // Each segment batch is independently 0-indexed.
    assert_eq!(batches[1].prompts[0].index, 0);
}

// ===========================================================================
// Scenario 4: prompt validation surfaces through the manager
// ===========================================================================

#[test]
fn preview_surfaces_prompt_errors() {
    let manager = manager();

    let mut spec = sneaker_spec();
    spec.values.remove("mood");
    let id = manager.create(spec).expect("create is lazy about values");
    assert!(matches!(
        manager.preview(&id, &[]),
        Err(CampaignError::Prompt(PromptError::MissingPlaceholderValue(p))) if p == "mood"
    ));

    let mut spec = sneaker_spec();
    spec.count = Some(99);
    let id = manager.create(spec).expect("valid spec");
    assert!(matches!(
        manager.preview(&id, &[]),
        Err(CampaignError::Prompt(PromptError::InvalidCount { requested: 99, max: 10 }))
    ));

    assert!(matches!(
        manager.preview("campaign_missing", &[]),
        Err(CampaignError::NotFound(_))
    ));
}

// ===========================================================================
// Scenario 5: export round-trips
// ===========================================================================

#[test]
fn export_writes_parseable_json() {
    let manager = manager();
    let id = manager.create(sneaker_spec()).expect("valid spec");
    let dir = tempfile::tempdir().expect("tempdir");
    let path = manager.export(&id, dir.path()).expect("export");
    assert!(path.ends_with(format!("{id}_summary.json")));

    let raw = std::fs::read_to_string(&path).expect("readable");
    let parsed: brandgen_core::Campaign = serde_json::from_str(&raw).expect("round-trips");
    assert_eq!(parsed.id, id);
    assert_eq!(parsed.spec.name, "Summer Sneakers");
}

// ===========================================================================
// Scenario 6: listing
// ===========================================================================

#[test]
fn listing_reports_all_campaigns() {
    let manager = manager();
    let first = manager.create(sneaker_spec()).expect("valid spec");
    let mut other = sneaker_spec();
    other.name = "Autumn Boots".into();
    let second = manager.create(other).expect("valid spec");

    let listings = manager.list();
    assert_eq!(listings.len(), 2);
    assert!(listings.iter().any(|l| l.id == first));
    assert!(listings.iter().any(|l| l.id == second));
    assert!(listings.iter().all(|l| l.images_generated == 0));
    assert!(listings
        .iter()
        .all(|l| l.status == CampaignStatus::Created));
}
