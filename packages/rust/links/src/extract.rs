//! Free-text URL extraction.
//!
//! Finds `http(s)://` links in prose and turns each match into an unenriched
//! preview. No network calls are made here; enrichment happens elsewhere.

use std::sync::LazyLock;

use contentible_shared::LinkPreview;
use regex::Regex;

/// Title given to previews discovered in free text.
pub const TEXT_PREVIEW_TITLE: &str = "Website Preview";

/// Description given to previews discovered in free text.
pub const TEXT_PREVIEW_DESCRIPTION: &str = "Click to view the full content";

/// `http://` or `https://` followed by any run of non-whitespace.
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("url regex"));

/// Every URL-looking substring of `text`, in order of appearance.
///
/// Matches are returned verbatim and duplicates are kept.
pub fn extract_urls(text: &str) -> Vec<String> {
    URL_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Placeholder previews for every URL found in `text`.
pub fn extract_previews(text: &str) -> Vec<LinkPreview> {
    extract_urls(text)
        .into_iter()
        .map(|url| LinkPreview {
            url,
            title: Some(TEXT_PREVIEW_TITLE.into()),
            description: Some(TEXT_PREVIEW_DESCRIPTION.into()),
            image: None,
            favicon: None,
        })
        .collect()
}
