//! brandgen-core: campaign library for the BrandGen marketing-content service.
//!
//! Templates with `{placeholder}` tokens are resolved into finalized image
//! prompts (the Campaign Prompt Builder), and resolved prompts are submitted
//! to the external image API through the OpenAI bridge. The gateway add-on
//! exposes all of this over HTTP.

mod campaign;
mod config;
mod image_service;
mod prompt;
mod segment;
mod template;

pub use campaign::{
    Campaign, CampaignError, CampaignListing, CampaignManager, CampaignSpec, CampaignStatus,
    GenerationRecord, GenerationSummary, PromptBatch,
};
pub use config::BrandGenConfig;
pub use image_service::{
    save_batch_results, GeneratedImage, ImageServiceError, ImageStyle, OpenAiImageBridge,
};
pub use prompt::{
    resolve, CampaignParameters, GeneratedPrompt, ImageQuality, ImageSize, PromptError,
};
pub use segment::{personalized_parameters, SegmentProfile};
pub use template::{CampaignTemplate, TemplateCatalog, TemplateError};
