//! URL helpers for link previews.
//!
//! This crate provides:
//! - [`extract`] - free-text URL extraction into placeholder previews
//! - [`display_url`] - the cleaned, human-facing form of a URL
//! - [`Placeholders`] - deterministic image/favicon URLs and the fallback record

pub mod extract;

use contentible_shared::{LinkPreview, PlaceholderConfig};
use url::Url;

pub use extract::{TEXT_PREVIEW_DESCRIPTION, TEXT_PREVIEW_TITLE, extract_previews, extract_urls};

/// Description given to fallback records.
pub const FALLBACK_DESCRIPTION: &str = "Click to visit this resource";

/// Placeholder text used when a URL has no host to template on.
const NO_HOST_TEXT: &str = "Preview";

// ---------------------------------------------------------------------------
// Display URL
// ---------------------------------------------------------------------------

/// Clean display form of a URL: `https://www.example.com/` → `example.com`.
///
/// The scheme, port, query, fragment and a leading `www.` are dropped and a
/// bare root path is removed. Input that is not a hierarchical URL is
/// returned unchanged, which makes the function idempotent.
pub fn display_url(raw: &str) -> String {
    let Some(url) = parse_hierarchical(raw) else {
        return raw.to_string();
    };
    let Some(host) = url.host_str() else {
        return raw.to_string();
    };

    let host = strip_www(host);
    match url.path() {
        "/" | "" => host.to_string(),
        path => format!("{host}{path}"),
    }
}

/// Hostname of `raw` with any `www.` prefix removed.
pub fn bare_host(raw: &str) -> Option<String> {
    parse_hierarchical(raw)
        .and_then(|u| u.host_str().map(|h| strip_www(h).to_string()))
}

fn parse_hierarchical(raw: &str) -> Option<Url> {
    Url::parse(raw).ok().filter(|u| !u.cannot_be_a_base())
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

// ---------------------------------------------------------------------------
// Placeholders
// ---------------------------------------------------------------------------

/// Templated placeholder image and favicon URLs keyed by hostname.
#[derive(Debug, Clone)]
pub struct Placeholders {
    image_template: String,
    favicon_template: String,
}

impl Placeholders {
    pub fn new(config: &PlaceholderConfig) -> Self {
        Self {
            image_template: config.image_template.clone(),
            favicon_template: config.favicon_template.clone(),
        }
    }

    /// Placeholder preview image for `raw`, templated on its bare hostname.
    pub fn image_for(&self, raw: &str) -> String {
        let host = bare_host(raw).unwrap_or_else(|| NO_HOST_TEXT.to_string());
        fill(&self.image_template, &host)
    }

    /// Favicon service URL for `raw`, or `None` when it has no host.
    pub fn favicon_for(&self, raw: &str) -> Option<String> {
        let url = parse_hierarchical(raw)?;
        let host = url.host_str()?;
        Some(fill(&self.favicon_template, host))
    }

    /// The terminal fallback record for `raw`.
    pub fn fallback(&self, raw: &str) -> LinkPreview {
        LinkPreview {
            url: raw.to_string(),
            title: Some(display_url(raw)),
            description: Some(FALLBACK_DESCRIPTION.into()),
            image: Some(self.image_for(raw)),
            favicon: self.favicon_for(raw),
        }
    }
}

impl Default for Placeholders {
    fn default() -> Self {
        Self::new(&PlaceholderConfig::default())
    }
}

fn fill(template: &str, host: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(host.as_bytes()).collect();
    template.replace("{host}", &encoded)
}
