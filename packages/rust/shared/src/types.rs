//! Core domain types for Contentible conversations.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Monotonically increasing identifier for a turn within one chat state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnId(pub u64);

impl std::fmt::Display for TurnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A UUID v7 wrapper for chat session identifiers (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Generate a new time-sortable session identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// LinkPreview
// ---------------------------------------------------------------------------

/// Preview metadata for a single URL, keyed by its exact source string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkPreview {
    /// Source URL exactly as it appeared in the payload or text.
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Preview image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Favicon URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
}

impl LinkPreview {
    /// A preview that carries nothing but its source URL.
    pub fn bare(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            description: None,
            image: None,
            favicon: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Structured payloads
// ---------------------------------------------------------------------------

/// A product launch campaign plan. Every field is required on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignPlan {
    pub campaign_name: String,
    pub campaign_objectives: Vec<String>,
    pub media_strategy: Vec<String>,
    pub performance_metrics: Vec<String>,
    pub target_audience: String,
    /// Country codes, in the order the service returned them.
    pub target_countries: Vec<String>,
    pub timeline: String,
}

/// Follow-up prompts offered after a campaign plan is shown.
pub const CAMPAIGN_FOLLOW_UPS: [&str; 2] = [
    "Create ad copy for this campaign",
    "Create video story board for this campaign",
];

/// A set of localized ad-copy variants. All three lists are required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdCopySet {
    /// Variants, each optionally prefixed with a `xx:` country code.
    pub ad_copy_options: Vec<String>,
    /// `"<countries>: <note>"` strings.
    pub localization_notes: Vec<String>,
    /// `"<countries>: <description>"` strings.
    pub visual_description: Vec<String>,
}

/// Matches a leading two-letter country tag such as `us:` or `FR:`.
static COUNTRY_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]{2}):").expect("country tag regex"));

/// One ad-copy variant split into its country tag and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdCopyOption {
    pub country: Option<String>,
    pub body: String,
}

/// The two-letter country prefix of an ad-copy option, case preserved.
pub fn country_tag(option: &str) -> Option<&str> {
    COUNTRY_TAG_RE
        .captures(option)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// An ad-copy option with any country prefix removed, trimmed.
pub fn option_body(option: &str) -> &str {
    match COUNTRY_TAG_RE.find(option) {
        Some(m) => option[m.end()..].trim(),
        None => option.trim(),
    }
}

impl AdCopyOption {
    /// Split `"us: Buy the phone"` into `("us", "Buy the phone")`.
    pub fn parse(text: &str) -> Self {
        Self {
            country: country_tag(text).map(String::from),
            body: option_body(text).to_string(),
        }
    }
}

/// A `"<countries>: <content>"` entry with `/`-delimited countries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedEntry {
    pub countries: Vec<String>,
    pub content: String,
}

impl GroupedEntry {
    /// Parse a grouped entry. Splits at the first `:` only.
    pub fn parse(text: &str) -> Self {
        let (countries, content) = text.split_once(':').unwrap_or((text, ""));
        Self {
            countries: countries
                .split('/')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from)
                .collect(),
            content: content.trim().to_string(),
        }
    }
}

impl AdCopySet {
    /// Ad-copy variants with their country tags split off.
    pub fn options(&self) -> Vec<AdCopyOption> {
        self.ad_copy_options.iter().map(|o| AdCopyOption::parse(o)).collect()
    }

    /// Localization notes grouped by country.
    pub fn notes(&self) -> Vec<GroupedEntry> {
        self.localization_notes.iter().map(|n| GroupedEntry::parse(n)).collect()
    }

    /// Visual descriptions grouped by country.
    pub fn visuals(&self) -> Vec<GroupedEntry> {
        self.visual_description.iter().map(|v| GroupedEntry::parse(v)).collect()
    }
}

// ---------------------------------------------------------------------------
// Views and attachments
// ---------------------------------------------------------------------------

/// Which structured view a response should be rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    CampaignPlan,
    AdCopySet,
    LinkCollection,
    PlainText,
}

impl ViewKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CampaignPlan => "campaign_plan",
            Self::AdCopySet => "ad_copy_set",
            Self::LinkCollection => "link_collection",
            Self::PlainText => "plain_text",
        }
    }
}

/// Structured content attached to an assistant turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Attachment {
    Campaign(CampaignPlan),
    AdCopy(AdCopySet),
    /// The payload did not match the shape the view requires.
    Invalid { view: ViewKind, reason: String },
}

impl Attachment {
    /// Suggested next prompts for this attachment, if any.
    pub fn follow_ups(&self) -> &'static [&'static str] {
        match self {
            Self::Campaign(_) => &CAMPAIGN_FOLLOW_UPS,
            _ => &[],
        }
    }
}

// ---------------------------------------------------------------------------
// ChatTurn
// ---------------------------------------------------------------------------

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// Lifecycle of a turn. `Pending` is left exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    Pending,
    Complete,
    Failed,
}

/// One message in the conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub id: TurnId,
    pub role: Role,
    /// Display text (prompt, lead-in sentence, or apology).
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<LinkPreview>,
    pub status: TurnStatus,
    pub created_at: DateTime<Utc>,
}

impl ChatTurn {
    /// A submitted user prompt.
    pub fn user(id: TurnId, content: impl Into<String>, links: Vec<LinkPreview>) -> Self {
        Self {
            id,
            role: Role::User,
            content: content.into(),
            attachment: None,
            links,
            status: TurnStatus::Complete,
            created_at: Utc::now(),
        }
    }

    /// Placeholder assistant turn shown while a request is in flight.
    pub fn pending(id: TurnId) -> Self {
        Self {
            id,
            role: Role::Assistant,
            content: String::new(),
            attachment: None,
            links: Vec::new(),
            status: TurnStatus::Pending,
            created_at: Utc::now(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == TurnStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_id_display() {
        assert_eq!(TurnId(7).to_string(), "#7");
    }

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[test]
    fn campaign_plan_requires_every_field() {
        let json = r#"{
            "campaign_name": "Pix Phone 10 Launch",
            "campaign_objectives": ["Awareness"],
            "media_strategy": ["Social"],
            "performance_metrics": ["CTR"],
            "target_audience": "Tech enthusiasts",
            "target_countries": ["US", "FR", "JP"]
        }"#;
        let err = serde_json::from_str::<CampaignPlan>(json).unwrap_err();
        assert!(err.to_string().contains("timeline"));
    }

    #[test]
    fn ad_copy_option_with_tag() {
        let opt = AdCopyOption::parse("us: **Meet Pix Phone 10.** Smarter shots.");
        assert_eq!(opt.country.as_deref(), Some("us"));
        assert_eq!(opt.body, "**Meet Pix Phone 10.** Smarter shots.");

        let opt = AdCopyOption::parse("JP:カメラが進化");
        assert_eq!(opt.country.as_deref(), Some("JP"));
        assert_eq!(opt.body, "カメラが進化");
    }

    #[test]
    fn ad_copy_option_without_tag() {
        let opt = AdCopyOption::parse("  Hello world  ");
        assert!(opt.country.is_none());
        assert_eq!(opt.body, "Hello world");
    }

    #[test]
    fn country_tag_needs_two_letters_and_colon() {
        assert_eq!(country_tag("FR: Bonjour"), Some("FR"));
        assert_eq!(country_tag("USA: too long"), None);
        assert_eq!(country_tag("u1: digit"), None);
        assert_eq!(option_body("fr:  Bonjour  "), "Bonjour");
        assert_eq!(option_body("No tag here"), "No tag here");
    }

    #[test]
    fn grouped_entry_splits_countries() {
        let entry = GroupedEntry::parse("US / FR: Use a playful tone: keep it short");
        assert_eq!(entry.countries, vec!["US", "FR"]);
        assert_eq!(entry.content, "Use a playful tone: keep it short");
    }

    #[test]
    fn grouped_entry_without_colon() {
        let entry = GroupedEntry::parse("JP");
        assert_eq!(entry.countries, vec!["JP"]);
        assert!(entry.content.is_empty());
    }

    #[test]
    fn attachment_serializes_with_kind_tag() {
        let att = Attachment::Invalid {
            view: ViewKind::AdCopySet,
            reason: "missing field".into(),
        };
        let json = serde_json::to_string(&att).unwrap();
        assert!(json.contains(r#""kind":"invalid""#));
        assert!(json.contains(r#""view":"ad_copy_set""#));
    }

    #[test]
    fn only_campaigns_offer_follow_ups() {
        let set = AdCopySet {
            ad_copy_options: vec![],
            localization_notes: vec![],
            visual_description: vec![],
        };
        assert!(Attachment::AdCopy(set).follow_ups().is_empty());
    }

    #[test]
    fn pending_turn_is_assistant() {
        let turn = ChatTurn::pending(TurnId(1));
        assert!(turn.is_pending());
        assert_eq!(turn.role, Role::Assistant);
    }
}
