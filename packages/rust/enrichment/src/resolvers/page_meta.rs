//! Direct page fetch resolver.
//!
//! Downloads the target page and reads Open Graph, Twitter card and standard
//! `<meta>`/`<title>` tags, in that priority order.

use std::net::IpAddr;

use async_trait::async_trait;
use contentible_links::{Placeholders, display_url};
use contentible_shared::{ContentibleError, LinkPreview, Result};
use reqwest::Client;
use reqwest::redirect::Policy;
use scraper::{Html, Selector};
use url::{Host, Url};

use super::{MetadataResolver, non_empty};

/// Fetches the page itself and parses its meta tags.
pub struct PageMetaResolver {
    client: Client,
    /// Allow loopback/private hosts (mock servers, intranet previews).
    allow_private_hosts: bool,
}

impl PageMetaResolver {
    pub fn new(client: Client, allow_private_hosts: bool) -> Self {
        Self {
            client,
            allow_private_hosts,
        }
    }
}

#[async_trait]
impl MetadataResolver for PageMetaResolver {
    async fn resolve(&self, url: &str, placeholders: &Placeholders) -> Result<LinkPreview> {
        let parsed =
            Url::parse(url).map_err(|e| ContentibleError::parse(format!("{url}: {e}")))?;

        if !self.allow_private_hosts && is_ssrf_target(&parsed) {
            return Err(ContentibleError::validation(format!(
                "{url}: refusing to fetch private or non-http target"
            )));
        }

        let response = self
            .client
            .get(parsed.as_str())
            .send()
            .await
            .map_err(|e| ContentibleError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContentibleError::Network(format!("{url}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ContentibleError::Network(format!("{url}: body read failed: {e}")))?;

        Ok(parse_page_meta(url, &body, placeholders))
    }

    fn name(&self) -> &str {
        "page-meta"
    }
}

// ---------------------------------------------------------------------------
// Meta tag parsing
// ---------------------------------------------------------------------------

/// Build a preview from raw page HTML.
///
/// Missing tags fall through to the next candidate and finally to the display
/// URL, an empty description, or the placeholder image.
pub fn parse_page_meta(url: &str, html: &str, placeholders: &Placeholders) -> LinkPreview {
    let doc = Html::parse_document(html);

    let title = meta_content(&doc, r#"meta[property="og:title"]"#)
        .or_else(|| meta_content(&doc, r#"meta[name="twitter:title"]"#))
        .or_else(|| title_text(&doc))
        .unwrap_or_else(|| display_url(url));

    let description = meta_content(&doc, r#"meta[property="og:description"]"#)
        .or_else(|| meta_content(&doc, r#"meta[name="twitter:description"]"#))
        .or_else(|| meta_content(&doc, r#"meta[name="description"]"#))
        .unwrap_or_default();

    let image = meta_content(&doc, r#"meta[property="og:image"]"#)
        .or_else(|| meta_content(&doc, r#"meta[name="twitter:image"]"#))
        .map(|src| absolutize(url, &src))
        .unwrap_or_else(|| placeholders.image_for(url));

    LinkPreview {
        url: url.to_string(),
        title: Some(title),
        description: Some(description),
        image: Some(image),
        favicon: placeholders.favicon_for(url),
    }
}

fn meta_content(doc: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    let content = doc.select(&sel).next()?.value().attr("content")?;
    non_empty(Some(content.to_string()))
}

fn title_text(doc: &Html) -> Option<String> {
    let sel = Selector::parse("title").ok()?;
    let text = doc.select(&sel).next()?.text().collect::<String>();
    non_empty(Some(text))
}

/// Resolve a possibly relative image reference against the page URL.
fn absolutize(page_url: &str, src: &str) -> String {
    Url::parse(page_url)
        .and_then(|base| base.join(src))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| src.to_string())
}

// ---------------------------------------------------------------------------
// SSRF protection
// ---------------------------------------------------------------------------

/// Redirect policy for direct page fetches.
///
/// Unless private hosts are allowed, every hop is checked with the same rules
/// as the initial URL.
pub fn redirect_policy(max_redirects: usize, allow_private_hosts: bool) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() >= max_redirects {
            attempt.error("too many redirects")
        } else if !allow_private_hosts && is_ssrf_target(attempt.url()) {
            attempt.error("redirect to private or non-http target")
        } else {
            attempt.follow()
        }
    })
}

/// Check if a URL targets a potentially dangerous resource.
fn is_ssrf_target(url: &Url) -> bool {
    match url.scheme() {
        "http" | "https" => {}
        _ => return true,
    }

    match url.host() {
        Some(Host::Ipv4(v4)) => is_private_ip(&IpAddr::V4(v4)),
        Some(Host::Ipv6(v6)) => is_private_ip(&IpAddr::V6(v6)),
        Some(Host::Domain(domain)) => {
            let name = domain.trim_end_matches('.').to_ascii_lowercase();
            name == "localhost"
                || name.ends_with(".localhost")
                || name.ends_with(".local")
                || name.ends_with(".internal")
        }
        None => true,
    }
}

/// Check if an IP is in a private/reserved range.
fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_unspecified()
                // 100.64.0.0/10 (Carrier-grade NAT)
                || (v4.octets()[0] == 100 && (v4.octets()[1] & 0xC0) == 64)
        }
        IpAddr::V6(v6) => {
            if let Some(v4) = v6.to_ipv4_mapped() {
                return is_private_ip(&IpAddr::V4(v4));
            }
            let first = v6.segments()[0];
            v6.is_loopback()
                || v6.is_unspecified()
                // fc00::/7 (unique local)
                || (first & 0xfe00) == 0xfc00
                // fe80::/10 (link-local)
                || (first & 0xffc0) == 0xfe80
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OG_PAGE: &str = r#"<html><head>
        <title>Fallback title</title>
        <meta property="og:title" content="Pix Phone 10 review">
        <meta name="twitter:title" content="Twitter title">
        <meta property="og:description" content="Hands on with the new camera">
        <meta name="description" content="Plain description">
        <meta property="og:image" content="/img/hero.jpg">
    </head><body></body></html>"#;

    #[test]
    fn open_graph_wins() {
        let preview = parse_page_meta(
            "https://reviews.example.com/pix",
            OG_PAGE,
            &Placeholders::default(),
        );
        assert_eq!(preview.title.as_deref(), Some("Pix Phone 10 review"));
        assert_eq!(preview.description.as_deref(), Some("Hands on with the new camera"));
        assert_eq!(
            preview.image.as_deref(),
            Some("https://reviews.example.com/img/hero.jpg")
        );
        assert!(preview.favicon.is_some());
    }

    #[test]
    fn twitter_card_before_standard_tags() {
        let html = r#"<html><head>
            <title>Page title</title>
            <meta name="twitter:title" content="Card title">
            <meta name="twitter:description" content="Card description">
            <meta name="description" content="Plain description">
            <meta name="twitter:image" content="https://cdn.example.com/card.png">
        </head></html>"#;
        let preview = parse_page_meta("https://a.com/", html, &Placeholders::default());
        assert_eq!(preview.title.as_deref(), Some("Card title"));
        assert_eq!(preview.description.as_deref(), Some("Card description"));
        assert_eq!(preview.image.as_deref(), Some("https://cdn.example.com/card.png"));
    }

    #[test]
    fn standard_tags_then_defaults() {
        let html = r#"<html><head>
            <title>  Spring trends  </title>
            <meta name="description" content="What shoppers want">
        </head></html>"#;
        let preview = parse_page_meta("https://www.trends.example/", html, &Placeholders::default());
        assert_eq!(preview.title.as_deref(), Some("Spring trends"));
        assert_eq!(preview.description.as_deref(), Some("What shoppers want"));
        assert!(preview.image.unwrap().contains("text=trends.example"));
    }

    #[test]
    fn bare_page_uses_display_url() {
        let preview = parse_page_meta(
            "https://www.example.com/blog/post",
            "<html><body>hi</body></html>",
            &Placeholders::default(),
        );
        assert_eq!(preview.title.as_deref(), Some("example.com/blog/post"));
        assert_eq!(preview.description.as_deref(), Some(""));
    }

    #[test]
    fn empty_meta_values_are_skipped() {
        let html = r#"<html><head>
            <meta property="og:title" content="   ">
            <title>Real title</title>
        </head></html>"#;
        let preview = parse_page_meta("https://a.com/", html, &Placeholders::default());
        assert_eq!(preview.title.as_deref(), Some("Real title"));
    }

    #[test]
    fn ssrf_blocks_private_targets() {
        for raw in [
            "file:///etc/passwd",
            "http://192.168.1.1/admin",
            "http://127.0.0.1:8080/",
            "http://localhost:3000/api",
            "http://[::1]/",
        ] {
            let url = Url::parse(raw).unwrap();
            assert!(is_ssrf_target(&url), "{raw} should be blocked");
        }
        let url = Url::parse("https://news.example.com/story").unwrap();
        assert!(!is_ssrf_target(&url));
    }

    #[test]
    fn ssrf_blocks_disguised_private_targets() {
        for raw in [
            "http://[::ffff:127.0.0.1]/secret",
            "http://[::ffff:10.0.0.5]/",
            "http://[fc00::1]/",
            "http://[fd12:3456::1]/",
            "http://[fe80::1]/",
            "http://localhost./",
            "http://LOCALHOST/",
            "http://api.localhost/",
        ] {
            let url = Url::parse(raw).unwrap();
            assert!(is_ssrf_target(&url), "{raw} should be blocked");
        }
        for raw in ["http://[2606:4700::1111]/", "http://[::ffff:8.8.8.8]/"] {
            let url = Url::parse(raw).unwrap();
            assert!(!is_ssrf_target(&url), "{raw} should be allowed");
        }
    }

    #[tokio::test]
    async fn refuses_mapped_loopback() {
        let resolver = PageMetaResolver::new(Client::new(), false);
        let result = resolver
            .resolve("http://[::ffff:127.0.0.1]:9/secret", &Placeholders::default())
            .await;
        assert!(matches!(result, Err(ContentibleError::Validation { .. })));
    }

    async fn redirecting_server() -> wiremock::MockServer {
        let server = wiremock::MockServer::start().await;
        let target = format!("{}/secret", server.uri());

        wiremock::Mock::given(wiremock::matchers::path("/hop"))
            .respond_with(
                wiremock::ResponseTemplate::new(302).insert_header("Location", target.as_str()),
            )
            .mount(&server)
            .await;
        wiremock::Mock::given(wiremock::matchers::path("/secret"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(OG_PAGE))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn redirect_into_private_host_is_refused() {
        let server = redirecting_server().await;
        let client = Client::builder()
            .redirect(redirect_policy(5, false))
            .build()
            .unwrap();

        let result = client.get(format!("{}/hop", server.uri())).send().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn redirect_followed_when_private_hosts_allowed() {
        let server = redirecting_server().await;
        let client = Client::builder()
            .redirect(redirect_policy(5, true))
            .build()
            .unwrap();
        let resolver = PageMetaResolver::new(client, true);

        let preview = resolver
            .resolve(&format!("{}/hop", server.uri()), &Placeholders::default())
            .await
            .unwrap();
        assert_eq!(preview.title.as_deref(), Some("Pix Phone 10 review"));
    }

    #[tokio::test]
    async fn refuses_loopback_unless_allowed() {
        let resolver = PageMetaResolver::new(Client::new(), false);
        let result = resolver
            .resolve("http://127.0.0.1:9/", &Placeholders::default())
            .await;
        assert!(matches!(result, Err(ContentibleError::Validation { .. })));
    }

    #[tokio::test]
    async fn fetches_and_parses_mock_page() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/article"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(OG_PAGE))
            .mount(&server)
            .await;

        let resolver = PageMetaResolver::new(Client::new(), true);
        let url = format!("{}/article", server.uri());
        let preview = resolver.resolve(&url, &Placeholders::default()).await.unwrap();
        assert_eq!(preview.title.as_deref(), Some("Pix Phone 10 review"));
        assert_eq!(preview.image, Some(format!("{}/img/hero.jpg", server.uri())));
    }

    #[tokio::test]
    async fn non_success_status_fails() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let resolver = PageMetaResolver::new(Client::new(), true);
        let url = format!("{}/missing", server.uri());
        assert!(resolver.resolve(&url, &Placeholders::default()).await.is_err());
    }
}
