//! Client for the DevTools HTTP endpoints of a browser started with
//! `--remote-debugging-port`.
//!
//! Only the plain HTTP side is used: `/json/version` to probe, `/json/list`
//! to enumerate page targets (tabs) and `/json/new` to open one.

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tabplanner_core::{Error, Result};
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevToolsTarget {
    pub id: String,
    #[serde(rename = "type")]
    pub target_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
}

impl DevToolsTarget {
    pub fn is_page(&self) -> bool {
        self.target_type == "page"
    }
}

#[derive(Debug, Clone)]
pub struct DevToolsEndpoint {
    client: Client,
    base: String,
}

impl DevToolsEndpoint {
    pub fn new(port: u16) -> Self {
        Self::with_base(&format!("http://127.0.0.1:{}", port))
    }

    pub fn with_base(base: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .no_proxy()
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// `/json/version`, used to check the endpoint is alive.
    pub async fn version(&self) -> Result<Value> {
        let url = format!("{}/json/version", self.base);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Browser(format!("DevTools endpoint {} unreachable: {}", self.base, e)))?;
        read_json(resp, "/json/version").await
    }

    /// Every target the browser exposes (pages, service workers, ...).
    pub async fn list_targets(&self) -> Result<Vec<DevToolsTarget>> {
        let url = format!("{}/json/list", self.base);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Browser(format!("DevTools endpoint {} unreachable: {}", self.base, e)))?;
        let targets: Vec<DevToolsTarget> = read_json(resp, "/json/list").await?;
        debug!(count = targets.len(), "DevTools targets listed");
        Ok(targets)
    }

    /// Open `url` in a new tab. Recent Chrome versions only accept `PUT`.
    pub async fn open_tab(&self, url: &str) -> Result<DevToolsTarget> {
        let endpoint = format!("{}/json/new?{}", self.base, urlencoding::encode(url));
        let resp = self
            .client
            .put(&endpoint)
            .send()
            .await
            .map_err(|e| Error::Browser(format!("Failed to open tab {}: {}", url, e)))?;
        read_json(resp, "/json/new").await
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(resp: reqwest::Response, what: &str) -> Result<T> {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| Error::Browser(format!("Failed to read {} response: {}", what, e)))?;
    if !status.is_success() {
        return Err(Error::Browser(format!("{} returned {}: {}", what, status, body.trim())));
    }
    serde_json::from_str(&body)
        .map_err(|e| Error::Browser(format!("Unexpected {} response: {}", what, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_list_targets() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/list"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[
                    {"id":"A1","type":"page","title":"Docs","url":"https://docs.rs/","webSocketDebuggerUrl":"ws://x/A1"},
                    {"id":"W1","type":"service_worker","title":"sw","url":"https://example.com/sw.js"}
                ]"#,
            ))
            .mount(&server)
            .await;

        let endpoint = DevToolsEndpoint::with_base(&server.uri());
        let targets = endpoint.list_targets().await.unwrap();
        assert_eq!(targets.len(), 2);
        assert!(targets[0].is_page());
        assert!(!targets[1].is_page());
        assert_eq!(targets[0].url, "https://docs.rs/");
    }

    #[tokio::test]
    async fn test_open_tab_uses_put() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/json/new"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"id":"N1","type":"page","title":"","url":"https://example.com/"}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let endpoint = DevToolsEndpoint::with_base(&server.uri());
        let target = endpoint.open_tab("https://example.com/").await.unwrap();
        assert_eq!(target.id, "N1");
    }

    #[tokio::test]
    async fn test_error_status_is_browser_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/version"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let endpoint = DevToolsEndpoint::with_base(&server.uri());
        let err = endpoint.version().await.unwrap_err();
        assert!(matches!(err, Error::Browser(ref m) if m.contains("500")));
    }
}
