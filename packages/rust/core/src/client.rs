//! Client for the remote generation endpoint.
//!
//! The endpoint accepts `{ "prompt": "..." }` and answers with
//! `{ "response": { "action": "...", "response": <payload> } }`.

use std::time::Duration;

use async_trait::async_trait;
use contentible_shared::{ContentibleError, EndpointConfig, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

/// User-Agent string for generation requests.
const USER_AGENT: &str = concat!("Contentible/", env!("CARGO_PKG_VERSION"));

/// One generated response: an action tag plus an untyped payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub action: String,
    #[serde(rename = "response")]
    pub payload: Value,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateEnvelope {
    response: Generation,
}

/// Anything that can turn a prompt into a [`Generation`].
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Generation>;
}

/// HTTP implementation talking to the configured `/generate` endpoint.
pub struct HttpGenerationClient {
    client: Client,
    endpoint: String,
}

impl HttpGenerationClient {
    pub fn new(config: &EndpointConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                ContentibleError::Network(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            endpoint: config.url.clone(),
        })
    }
}

#[async_trait]
impl GenerationBackend for HttpGenerationClient {
    #[instrument(skip_all, fields(endpoint = %self.endpoint))]
    async fn generate(&self, prompt: &str) -> Result<Generation> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&GenerateRequest { prompt })
            .send()
            .await
            .map_err(|e| ContentibleError::Network(format!("{}: {e}", self.endpoint)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContentibleError::Network(format!(
                "{}: HTTP {status}",
                self.endpoint
            )));
        }

        let envelope: GenerateEnvelope = response.json().await.map_err(|e| {
            ContentibleError::parse(format!("unexpected generation response: {e}"))
        })?;

        debug!(action = %envelope.response.action, "generation received");
        Ok(envelope.response)
    }
}
