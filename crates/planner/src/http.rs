//! reqwest client for the planning service.

use reqwest::{Client, NoProxy, Proxy};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, PartialEq)]
enum ProxyPlan {
    /// `service.proxy` is explicitly `""`.
    Direct,
    Via { url: String, no_proxy: Option<String> },
    /// Nothing configured; reqwest reads HTTP(S)_PROXY / NO_PROXY itself.
    Environment,
}

/// The service's own proxy wins over the global one. Host exclusions only
/// apply to the global proxy.
fn proxy_plan(service_proxy: Option<&str>, global_proxy: Option<&str>, no_proxy: &[String]) -> ProxyPlan {
    match service_proxy {
        Some("") => ProxyPlan::Direct,
        Some(url) => ProxyPlan::Via { url: url.to_string(), no_proxy: None },
        None => match global_proxy.filter(|g| !g.is_empty()) {
            Some(url) => {
                let rules: Vec<&str> = no_proxy
                    .iter()
                    .map(|r| r.trim())
                    .filter(|r| !r.is_empty())
                    .collect();
                ProxyPlan::Via {
                    url: url.to_string(),
                    no_proxy: (!rules.is_empty()).then(|| rules.join(",")),
                }
            }
            None => ProxyPlan::Environment,
        },
    }
}

pub fn build_http_client(
    service_proxy: Option<&str>,
    global_proxy: Option<&str>,
    no_proxy: &[String],
    timeout: Option<Duration>,
) -> Client {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    match proxy_plan(service_proxy, global_proxy, no_proxy) {
        ProxyPlan::Via { url, no_proxy } => match Proxy::all(&url) {
            Ok(proxy) => {
                info!(proxy = %url, "Planning service via proxy");
                let exclusions = no_proxy.as_deref().and_then(NoProxy::from_string);
                builder = builder.proxy(proxy.no_proxy(exclusions));
            }
            Err(e) => warn!(error = %e, proxy = %url, "Invalid proxy URL, ignoring"),
        },
        ProxyPlan::Direct => builder = builder.no_proxy(),
        ProxyPlan::Environment => {}
    }

    builder.build().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to build HTTP client, using default");
        Client::new()
    })
}
