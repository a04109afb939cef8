//! Application configuration for Contentible.
//!
//! User config lives at `~/.contentible/contentible.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ContentibleError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "contentible.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".contentible";

// ---------------------------------------------------------------------------
// Config structs (matching contentible.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Generation endpoint settings.
    #[serde(default)]
    pub endpoint: EndpointConfig,

    /// Link enrichment settings.
    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    /// Placeholder image and favicon templates.
    #[serde(default)]
    pub placeholders: PlaceholderConfig,
}

/// `[endpoint]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// URL of the remote `/generate` endpoint.
    #[serde(default = "default_endpoint_url")]
    pub url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_endpoint_timeout")]
    pub timeout_secs: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: default_endpoint_url(),
            timeout_secs: default_endpoint_timeout(),
        }
    }
}

fn default_endpoint_url() -> String {
    "http://127.0.0.1:8100/generate".into()
}
fn default_endpoint_timeout() -> u64 {
    60
}

/// `[enrichment]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Microlink-compatible metadata service base URL.
    #[serde(default = "default_metadata_service_url")]
    pub metadata_service_url: String,

    /// Whether to query the metadata service first.
    #[serde(default = "default_true")]
    pub use_metadata_service: bool,

    /// Whether to fetch the page itself and read its meta tags.
    #[serde(default = "default_true")]
    pub use_direct_fetch: bool,

    /// Per-request timeout in seconds.
    #[serde(default = "default_enrichment_timeout")]
    pub timeout_secs: u64,

    /// Maximum number of URLs resolved at once.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: u32,

    /// Allow direct fetches of loopback/private hosts.
    #[serde(default)]
    pub allow_private_hosts: bool,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            metadata_service_url: default_metadata_service_url(),
            use_metadata_service: true,
            use_direct_fetch: true,
            timeout_secs: default_enrichment_timeout(),
            max_concurrency: default_max_concurrency(),
            allow_private_hosts: false,
        }
    }
}

fn default_metadata_service_url() -> String {
    "https://api.microlink.io/".into()
}
fn default_true() -> bool {
    true
}
fn default_enrichment_timeout() -> u64 {
    10
}
fn default_max_concurrency() -> u32 {
    8
}

/// `[placeholders]` section. `{host}` is replaced with the URL's hostname.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceholderConfig {
    #[serde(default = "default_image_template")]
    pub image_template: String,

    #[serde(default = "default_favicon_template")]
    pub favicon_template: String,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            image_template: default_image_template(),
            favicon_template: default_favicon_template(),
        }
    }
}

fn default_image_template() -> String {
    "https://via.placeholder.com/400x225/f3f4f6/64748b?text={host}".into()
}
fn default_favicon_template() -> String {
    "https://www.google.com/s2/favicons?domain={host}&sz=64".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.contentible/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ContentibleError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.contentible/contentible.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ContentibleError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        ContentibleError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ContentibleError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ContentibleError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ContentibleError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that configured URLs parse and limits are usable.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    Url::parse(&config.endpoint.url).map_err(|e| {
        ContentibleError::config(format!("invalid endpoint url '{}': {e}", config.endpoint.url))
    })?;

    if config.enrichment.use_metadata_service {
        Url::parse(&config.enrichment.metadata_service_url).map_err(|e| {
            ContentibleError::config(format!(
                "invalid metadata_service_url '{}': {e}",
                config.enrichment.metadata_service_url
            ))
        })?;
    }

    if config.enrichment.max_concurrency == 0 {
        return Err(ContentibleError::config(
            "enrichment.max_concurrency must be at least 1",
        ));
    }

    Ok(())
}
