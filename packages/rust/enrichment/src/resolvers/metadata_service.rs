//! Microlink-compatible metadata service resolver.
//!
//! Sends `GET <service>?url=<target>` and expects
//! `{ "status": "success", "data": { "title", "description", "image": { "url" } } }`.

use async_trait::async_trait;
use contentible_links::{Placeholders, display_url};
use contentible_shared::{ContentibleError, LinkPreview, Result};
use reqwest::Client;
use serde::Deserialize;

use super::{MetadataResolver, non_empty};

#[derive(Debug, Deserialize)]
struct ServiceResponse {
    status: String,
    #[serde(default)]
    data: Option<ServiceData>,
}

#[derive(Debug, Deserialize)]
struct ServiceData {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    image: Option<ServiceImage>,
}

#[derive(Debug, Deserialize)]
struct ServiceImage {
    #[serde(default)]
    url: Option<String>,
}

/// Looks URLs up through an external metadata-extraction service.
pub struct MetadataServiceResolver {
    client: Client,
    service_url: String,
}

impl MetadataServiceResolver {
    pub fn new(client: Client, service_url: impl Into<String>) -> Self {
        Self {
            client,
            service_url: service_url.into(),
        }
    }
}

#[async_trait]
impl MetadataResolver for MetadataServiceResolver {
    async fn resolve(&self, url: &str, placeholders: &Placeholders) -> Result<LinkPreview> {
        let response = self
            .client
            .get(&self.service_url)
            .query(&[("url", url)])
            .send()
            .await
            .map_err(|e| ContentibleError::Network(format!("metadata service: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContentibleError::Network(format!(
                "metadata service: HTTP {status}"
            )));
        }

        let body: ServiceResponse = response
            .json()
            .await
            .map_err(|e| ContentibleError::parse(format!("metadata service body: {e}")))?;

        preview_from_service(url, body, placeholders)
    }

    fn name(&self) -> &str {
        "metadata-service"
    }
}

fn preview_from_service(
    url: &str,
    body: ServiceResponse,
    placeholders: &Placeholders,
) -> Result<LinkPreview> {
    if body.status != "success" {
        return Err(ContentibleError::validation(format!(
            "metadata service status: {}",
            body.status
        )));
    }
    let data = body
        .data
        .ok_or_else(|| ContentibleError::validation("metadata service returned no data"))?;

    let description = non_empty(data.description);
    let title = non_empty(data.title)
        .or_else(|| description.clone())
        .unwrap_or_else(|| display_url(url));
    let image = non_empty(data.image.and_then(|i| i.url))
        .unwrap_or_else(|| placeholders.image_for(url));

    Ok(LinkPreview {
        url: url.to_string(),
        title: Some(title),
        description: Some(description.unwrap_or_default()),
        image: Some(image),
        favicon: placeholders.favicon_for(url),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ServiceResponse {
        serde_json::from_str(json).expect("service json")
    }

    #[test]
    fn full_payload() {
        let body = parse(
            r#"{"status":"success","data":{"title":"Pix Phone 10","description":"AI camera","image":{"url":"https://cdn.example.com/p.png"}}}"#,
        );
        let preview =
            preview_from_service("https://store.example.com/pix", body, &Placeholders::default())
                .unwrap();
        assert_eq!(preview.title.as_deref(), Some("Pix Phone 10"));
        assert_eq!(preview.description.as_deref(), Some("AI camera"));
        assert_eq!(preview.image.as_deref(), Some("https://cdn.example.com/p.png"));
        assert!(preview.favicon.unwrap().contains("store.example.com"));
    }

    #[test]
    fn title_falls_back_to_description_then_display_url() {
        let body = parse(r#"{"status":"success","data":{"description":"Only a description"}}"#);
        let preview =
            preview_from_service("https://a.com/x", body, &Placeholders::default()).unwrap();
        assert_eq!(preview.title.as_deref(), Some("Only a description"));

        let body = parse(r#"{"status":"success","data":{"title":""}}"#);
        let preview =
            preview_from_service("https://www.a.com/x", body, &Placeholders::default()).unwrap();
        assert_eq!(preview.title.as_deref(), Some("a.com/x"));
        assert_eq!(preview.description.as_deref(), Some(""));
        assert!(preview.image.unwrap().contains("text=a.com"));
    }

    #[test]
    fn failed_status_is_an_error() {
        let body = parse(r#"{"status":"fail","data":null}"#);
        assert!(preview_from_service("https://a.com", body, &Placeholders::default()).is_err());
    }

    #[test]
    fn missing_data_is_an_error() {
        let body = parse(r#"{"status":"success"}"#);
        assert!(preview_from_service("https://a.com", body, &Placeholders::default()).is_err());
    }

    #[tokio::test]
    async fn resolves_against_mock_service() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::query_param("url", "https://brand.example.com/launch"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "data": { "title": "Launch day", "description": "It is here" }
            })))
            .mount(&server)
            .await;

        let resolver = MetadataServiceResolver::new(Client::new(), server.uri());
        let preview = resolver
            .resolve("https://brand.example.com/launch", &Placeholders::default())
            .await
            .unwrap();
        assert_eq!(preview.title.as_deref(), Some("Launch day"));
        assert_eq!(preview.url, "https://brand.example.com/launch");
    }

    #[tokio::test]
    async fn http_error_is_a_failure() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let resolver = MetadataServiceResolver::new(Client::new(), server.uri());
        let result = resolver
            .resolve("https://brand.example.com/launch", &Placeholders::default())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn malformed_body_is_a_failure() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
            .mount(&server)
            .await;

        let resolver = MetadataServiceResolver::new(Client::new(), server.uri());
        let result = resolver
            .resolve("https://brand.example.com/launch", &Placeholders::default())
            .await;
        assert!(matches!(result, Err(ContentibleError::Parse { .. })));
    }
}
