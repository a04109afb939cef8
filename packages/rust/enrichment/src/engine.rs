//! Concurrent link enrichment engine.
//!
//! Every URL is resolved on its own task through the [`ResolverChain`]; the
//! engine joins all of them and returns one preview per input URL, in input
//! order. A failure on one URL only lowers the fidelity of that entry.

use std::sync::Arc;
use std::time::Duration;

use contentible_links::Placeholders;
use contentible_shared::{
    ContentibleError, EnrichmentConfig, LinkPreview, PlaceholderConfig, Result,
};
use reqwest::Client;
use reqwest::redirect::Policy;
use tokio::sync::Semaphore;
use tracing::{info, instrument, warn};

use crate::resolvers::{
    MetadataResolver, MetadataServiceResolver, PageMetaResolver, ResolverChain, redirect_policy,
};

/// User-Agent string for enrichment requests.
const USER_AGENT: &str = concat!("Contentible/", env!("CARGO_PKG_VERSION"));

/// Maximum number of redirects followed per request.
const MAX_REDIRECTS: usize = 5;

fn build_client(timeout: Duration, redirects: Policy) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(redirects)
        .timeout(timeout)
        .build()
        .map_err(|e| ContentibleError::Network(format!("failed to build HTTP client: {e}")))
}

/// Resolves batches of URLs into link previews.
pub struct Enricher {
    chain: Arc<ResolverChain>,
    semaphore: Arc<Semaphore>,
}

impl Enricher {
    /// Build the resolver chain described by `config`.
    pub fn new(config: &EnrichmentConfig, placeholders: &PlaceholderConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);

        let mut resolvers: Vec<Box<dyn MetadataResolver>> = Vec::new();
        if config.use_metadata_service {
            let client = build_client(timeout, Policy::limited(MAX_REDIRECTS))?;
            resolvers.push(Box::new(MetadataServiceResolver::new(
                client,
                config.metadata_service_url.clone(),
            )));
        }
        if config.use_direct_fetch {
            let client = build_client(
                timeout,
                redirect_policy(MAX_REDIRECTS, config.allow_private_hosts),
            )?;
            resolvers.push(Box::new(PageMetaResolver::new(
                client,
                config.allow_private_hosts,
            )));
        }

        let chain = ResolverChain::new(resolvers, Placeholders::new(placeholders));
        Ok(Self::with_chain(chain, config.max_concurrency as usize))
    }

    /// Wrap an already assembled chain.
    pub fn with_chain(chain: ResolverChain, max_concurrency: usize) -> Self {
        Self {
            chain: Arc::new(chain),
            semaphore: Arc::new(Semaphore::new(max_concurrency.max(1))),
        }
    }

    /// The resolver chain used by this engine.
    pub fn chain(&self) -> &ResolverChain {
        &self.chain
    }

    /// Resolve a single URL. Never fails.
    pub async fn enrich_one(&self, url: &str) -> LinkPreview {
        self.chain.resolve(url).await
    }

    /// Resolve every URL concurrently, preserving input order.
    ///
    /// Returns exactly `urls.len()` previews. Duplicate URLs are resolved
    /// and returned separately.
    #[instrument(skip_all, fields(urls = urls.len()))]
    pub async fn enrich_all(&self, urls: &[String]) -> Vec<LinkPreview> {
        let mut handles = Vec::with_capacity(urls.len());

        for url in urls {
            let chain = Arc::clone(&self.chain);
            let sem = Arc::clone(&self.semaphore);
            let url = url.clone();

            handles.push(tokio::spawn(async move {
                let _permit = sem.acquire().await;
                chain.resolve(&url).await
            }));
        }

        let mut previews = Vec::with_capacity(handles.len());
        for (url, handle) in urls.iter().zip(handles) {
            match handle.await {
                Ok(preview) => previews.push(preview),
                Err(e) => {
                    warn!(%url, error = %e, "enrichment task aborted, using fallback");
                    previews.push(self.chain.fallback(url));
                }
            }
        }

        info!(count = previews.len(), "link enrichment complete");
        previews
    }
}
