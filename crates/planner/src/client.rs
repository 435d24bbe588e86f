//! Transport to the remote planning service: one `POST /tabs` per
//! submission, no retry, no timeout unless configured.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tabplanner_core::{Config, Error, PlanParams, PlanRequest, PlanResponse, Result, Suggestion};
use tracing::{debug, info, warn};

use crate::http::build_http_client;

/// Fields that may carry a human-readable error, in precedence order.
const MESSAGE_FIELDS: [&str; 3] = ["detail", "message", "msg"];

#[async_trait]
pub trait PlanService: Send + Sync {
    async fn plan(&self, request: &PlanRequest, params: &PlanParams) -> Result<Vec<Suggestion>>;
}

pub struct PlannerClient {
    client: Client,
    base_url: String,
}

impl PlannerClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let base_url = config.service_url();
        let client = build_http_client(
            config.service.proxy.as_deref(),
            config.network.proxy.as_deref(),
            &config.network.no_proxy,
            config.service.timeout_secs.map(Duration::from_secs),
        );
        Self::with_client(client, &base_url)
    }

    pub fn endpoint(&self) -> String {
        format!("{}/tabs", self.base_url)
    }
}

#[async_trait]
impl PlanService for PlannerClient {
    async fn plan(&self, request: &PlanRequest, params: &PlanParams) -> Result<Vec<Suggestion>> {
        let mut query = vec![
            ("limit", params.limit.to_string()),
            ("temperature", params.temperature.to_string()),
        ];
        if let Some(model) = &params.model {
            query.push(("model", model.clone()));
        }

        let endpoint = self.endpoint();
        info!(
            endpoint = %endpoint,
            limit = params.limit,
            temperature = params.temperature,
            bookmarks = request.bookmarks.len(),
            history = request.history.len(),
            open_tabs = request.open_tabs.len(),
            "Requesting tab plan"
        );

        let response = self
            .client
            .post(&endpoint)
            .query(&query)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !status.is_success() {
            let message = extract_error_message(status, &body);
            warn!(status = %status, message = %message, "Planning service returned an error");
            return Err(Error::Service {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: PlanResponse = serde_json::from_str(&body).map_err(|e| {
            Error::Other(format!("Unexpected response from planning service: {}", e))
        })?;
        debug!(suggestions = parsed.tabs.len(), "Tab plan received");
        Ok(parsed.tabs)
    }
}

/// Reduce an error response to one line of text.
///
/// Tries `detail`, `message`, `msg` (recursing through arrays and nested
/// objects). A recognized field with no usable text, or an empty body, gives
/// the generic status message; any other body is returned serialized.
pub fn extract_error_message(status: StatusCode, body: &str) -> String {
    let fallback = format!(
        "Request failed with status {} ({})",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    );

    let body = body.trim();
    if body.is_empty() {
        return fallback;
    }

    match serde_json::from_str::<Value>(body) {
        Ok(json) => {
            let recognized = json
                .as_object()
                .map(|obj| MESSAGE_FIELDS.iter().any(|f| obj.contains_key(*f)))
                .unwrap_or(false);
            if recognized {
                message_text(&json).unwrap_or(fallback)
            } else {
                serde_json::to_string(&json).unwrap_or_else(|_| body.to_string())
            }
        }
        Err(_) => body.to_string(),
    }
}

fn message_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(message_text).collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        Value::Object(obj) => MESSAGE_FIELDS
            .iter()
            .filter_map(|field| obj.get(*field))
            .find_map(message_text),
        _ => None,
    }
}
