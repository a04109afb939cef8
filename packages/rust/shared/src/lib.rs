//! Shared types, error model, and configuration for Contentible.
//!
//! This crate is the foundation depended on by all other Contentible crates.
//! It provides:
//! - [`ContentibleError`] - the unified error type
//! - Domain types ([`ChatTurn`], [`LinkPreview`], [`CampaignPlan`], [`AdCopySet`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, EndpointConfig, EnrichmentConfig, PlaceholderConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, validate_config,
};
pub use error::{ContentibleError, Result};
pub use types::{
    AdCopyOption, AdCopySet, Attachment, CAMPAIGN_FOLLOW_UPS, CampaignPlan, ChatTurn,
    GroupedEntry, LinkPreview, Role, SessionId, TurnId, TurnStatus, ViewKind, country_tag,
    option_body,
};
