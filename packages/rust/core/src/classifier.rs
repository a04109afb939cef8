//! Response classification.
//!
//! Maps the `(action, payload)` pair returned by the generation endpoint to a
//! lead-in sentence, the structured view to attach, and where the turn's link
//! previews come from.

use contentible_links::extract_previews;
use contentible_shared::{AdCopySet, Attachment, CampaignPlan, LinkPreview, ViewKind};
use serde::Deserialize;
use serde_json::Value;

pub const CAMPAIGN_LEAD_IN: &str = "Here's your product launch campaign plan:";
pub const AD_COPY_LEAD_IN: &str = "Here are the localized ad copy options:";
pub const TRENDS_LEAD_IN: &str = "Here are some relevant resources:";
pub const DEFAULT_LEAD_IN: &str = "Here's what I found:";

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// Action tag reported by the generation endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ProductLaunch,
    /// `generate_ad_copy` or its alias `ad_copy`.
    AdCopy,
    GenerateTrends,
    General,
    Other(String),
}

impl Action {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "product_launch" => Self::ProductLaunch,
            "generate_ad_copy" | "ad_copy" => Self::AdCopy,
            "generate_trends" => Self::GenerateTrends,
            "general" => Self::General,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::ProductLaunch => "product_launch",
            Self::AdCopy => "generate_ad_copy",
            Self::GenerateTrends => "generate_trends",
            Self::General => "general",
            Self::Other(tag) => tag,
        }
    }
}

// ---------------------------------------------------------------------------
// Directive
// ---------------------------------------------------------------------------

/// Where a turn's link previews come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkSource {
    /// URLs that must go through the enrichment pipeline.
    Enrich(Vec<String>),
    /// Previews already built from free text; no network calls needed.
    Inline(Vec<LinkPreview>),
}

/// Rendering instructions for one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub action: Action,
    pub lead_in: String,
    pub view: ViewKind,
    pub links: LinkSource,
}

/// Classify a response. Unknown actions take the default branch.
pub fn classify(action: &str, payload: &Value) -> Directive {
    let action = Action::from_tag(action);

    let (lead_in, view) = match &action {
        Action::ProductLaunch => (CAMPAIGN_LEAD_IN.to_string(), ViewKind::CampaignPlan),
        Action::AdCopy => (AD_COPY_LEAD_IN.to_string(), ViewKind::AdCopySet),
        Action::GenerateTrends => (TRENDS_LEAD_IN.to_string(), ViewKind::LinkCollection),
        Action::General => match payload.as_str() {
            Some(text) => (text.to_string(), ViewKind::PlainText),
            None => (DEFAULT_LEAD_IN.to_string(), ViewKind::PlainText),
        },
        Action::Other(_) => (DEFAULT_LEAD_IN.to_string(), ViewKind::PlainText),
    };

    let links = match (&action, payload) {
        (Action::GenerateTrends, Value::Array(items)) => LinkSource::Enrich(
            items
                .iter()
                .filter_map(|item| item.as_str().map(String::from))
                .collect(),
        ),
        (_, Value::String(text)) => LinkSource::Inline(extract_previews(text)),
        _ => LinkSource::Inline(Vec::new()),
    };

    Directive {
        action,
        lead_in,
        view,
        links,
    }
}

/// Decode the structured view for `view` from `payload`.
///
/// Views without structured content return `None`. A payload that does not
/// match the view's shape yields [`Attachment::Invalid`] rather than an error.
pub fn build_attachment(view: ViewKind, payload: &Value) -> Option<Attachment> {
    let decoded = match view {
        ViewKind::CampaignPlan => CampaignPlan::deserialize(payload).map(Attachment::Campaign),
        ViewKind::AdCopySet => AdCopySet::deserialize(payload).map(Attachment::AdCopy),
        ViewKind::LinkCollection | ViewKind::PlainText => return None,
    };

    Some(decoded.unwrap_or_else(|e| {
        tracing::warn!(view = view.as_str(), error = %e, "payload does not match view");
        Attachment::Invalid {
            view,
            reason: e.to_string(),
        }
    }))
}
