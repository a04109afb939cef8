//! Resolver trait and the ordered fallback chain.
//!
//! Resolvers are tried in priority order; the first one that succeeds wins.
//! When every resolver fails the chain synthesizes a fallback record, so
//! resolving a URL through the chain never fails.

mod metadata_service;
mod page_meta;

use async_trait::async_trait;
use contentible_links::Placeholders;
use contentible_shared::{LinkPreview, Result};
use tracing::debug;

pub use metadata_service::MetadataServiceResolver;
pub use page_meta::{PageMetaResolver, parse_page_meta, redirect_policy};

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// One strategy for turning a URL into preview metadata.
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    /// Resolve `url`, or fail so the next resolver gets a turn.
    async fn resolve(&self, url: &str, placeholders: &Placeholders) -> Result<LinkPreview>;

    /// Human-readable resolver name for tracing.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

/// Holds resolvers in priority order plus the fallback templates.
pub struct ResolverChain {
    resolvers: Vec<Box<dyn MetadataResolver>>,
    placeholders: Placeholders,
}

impl ResolverChain {
    pub fn new(resolvers: Vec<Box<dyn MetadataResolver>>, placeholders: Placeholders) -> Self {
        Self {
            resolvers,
            placeholders,
        }
    }

    /// Names of the configured resolvers, in the order they are tried.
    pub fn names(&self) -> Vec<&str> {
        self.resolvers.iter().map(|r| r.name()).collect()
    }

    /// Resolve `url` through each resolver until one succeeds.
    /// Always returns a preview; exhaustion yields the fallback record.
    pub async fn resolve(&self, url: &str) -> LinkPreview {
        for resolver in &self.resolvers {
            match resolver.resolve(url, &self.placeholders).await {
                Ok(preview) => {
                    debug!(url, resolver = resolver.name(), "resolved link preview");
                    return preview;
                }
                Err(e) => {
                    debug!(url, resolver = resolver.name(), error = %e, "resolver failed");
                }
            }
        }
        debug!(url, "all resolvers failed, using fallback record");
        self.fallback(url)
    }

    /// The synthesized fallback record for `url`.
    pub fn fallback(&self, url: &str) -> LinkPreview {
        self.placeholders.fallback(url)
    }
}

/// Keep the first non-empty trimmed value.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
