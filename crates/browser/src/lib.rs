//! The browser surface the planner reads from and opens tabs in.
//!
//! [`BrowserApi`] mirrors the handful of extension calls the planner needs:
//! the bookmark tree, a history search over a time window, tab enumeration
//! and tab creation. [`LocalBrowser`] serves them from a Chromium profile on
//! disk plus the DevTools HTTP endpoint of a running browser;
//! [`FixtureBrowser`] serves them from a JSON snapshot.

pub mod devtools;
pub mod discovery;
pub mod fixture;
pub mod local;
pub mod profile;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tabplanner_core::Result;

pub use devtools::{DevToolsEndpoint, DevToolsTarget};
pub use discovery::BrowserEngine;
pub use fixture::{FixtureBrowser, FixtureSnapshot};
pub use local::LocalBrowser;
pub use profile::ChromiumProfile;

/// A node of the bookmark tree. Folders carry `children`, leaves carry `url`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkNode {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<BookmarkNode>,
}

impl BookmarkNode {
    pub fn leaf(title: &str, url: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            url: Some(url.to_string()),
            children: Vec::new(),
        }
    }

    pub fn folder(title: &str, children: Vec<BookmarkNode>) -> Self {
        Self {
            title: Some(title.to_string()),
            url: None,
            children,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryQuery {
    /// Substring filter on url/title; empty matches everything.
    pub text: String,
    /// Epoch milliseconds; older visits are not returned.
    pub start_time_ms: i64,
    pub max_results: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// Epoch milliseconds.
    #[serde(default)]
    pub last_visit_time: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub pinned: Option<bool>,
}

#[async_trait]
pub trait BrowserApi: Send + Sync {
    /// Root nodes of the bookmark tree.
    async fn bookmark_tree(&self) -> Result<Vec<BookmarkNode>>;

    /// Most recent visits first.
    async fn search_history(&self, query: &HistoryQuery) -> Result<Vec<HistoryItem>>;

    /// Every tab in every window.
    async fn query_tabs(&self) -> Result<Vec<TabInfo>>;

    async fn create_tab(&self, url: &str) -> Result<()>;
}
