use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Mutex;
use tabplanner_core::{Error, Result};
use tracing::info;

use crate::{BookmarkNode, BrowserApi, HistoryItem, HistoryQuery, TabInfo};

/// A captured browser state, stored as JSON:
///
/// ```json
/// {
///   "bookmarks": [{"title": "Bar", "children": [{"title": "Rust", "url": "https://www.rust-lang.org/"}]}],
///   "history": [{"title": "Docs", "url": "https://docs.rs/", "lastVisitTime": 1700000000000}],
///   "tabs": [{"title": "Mail", "url": "https://mail.example.com/", "pinned": true}]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureSnapshot {
    #[serde(default)]
    pub bookmarks: Vec<BookmarkNode>,
    #[serde(default)]
    pub history: Vec<HistoryItem>,
    #[serde(default)]
    pub tabs: Vec<TabInfo>,
}

/// Serves a [`FixtureSnapshot`] and remembers the tabs it was asked to open
/// instead of opening them.
pub struct FixtureBrowser {
    snapshot: FixtureSnapshot,
    created: Mutex<Vec<String>>,
}

impl FixtureBrowser {
    pub fn new(snapshot: FixtureSnapshot) -> Self {
        Self {
            snapshot,
            created: Mutex::new(Vec::new()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let snapshot: FixtureSnapshot = serde_json::from_str(&content)
            .map_err(|e| Error::Browser(format!("Invalid fixture {}: {}", path.display(), e)))?;
        Ok(Self::new(snapshot))
    }

    /// URLs passed to `create_tab`, in call order.
    pub fn created_tabs(&self) -> Vec<String> {
        self.created
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl BrowserApi for FixtureBrowser {
    async fn bookmark_tree(&self) -> Result<Vec<BookmarkNode>> {
        Ok(self.snapshot.bookmarks.clone())
    }

    async fn search_history(&self, query: &HistoryQuery) -> Result<Vec<HistoryItem>> {
        let needle = query.text.to_lowercase();
        let start = query.start_time_ms as f64;

        let mut items: Vec<HistoryItem> = self
            .snapshot
            .history
            .iter()
            .filter(|item| item.last_visit_time.map_or(true, |t| t >= start))
            .filter(|item| {
                needle.is_empty()
                    || item.url.as_deref().unwrap_or("").to_lowercase().contains(&needle)
                    || item.title.as_deref().unwrap_or("").to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();

        items.sort_by(|a, b| {
            let a = a.last_visit_time.unwrap_or(f64::MIN);
            let b = b.last_visit_time.unwrap_or(f64::MIN);
            b.partial_cmp(&a).unwrap_or(std::cmp::Ordering::Equal)
        });
        items.truncate(query.max_results);
        Ok(items)
    }

    async fn query_tabs(&self) -> Result<Vec<TabInfo>> {
        Ok(self.snapshot.tabs.clone())
    }

    async fn create_tab(&self, url: &str) -> Result<()> {
        info!(url = %url, "Fixture browser: open tab");
        self.created
            .lock()
            .map_err(|_| Error::Other("fixture tab list poisoned".to_string()))?
            .push(url.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(url: &str, t: Option<f64>) -> HistoryItem {
        HistoryItem {
            title: Some(url.to_string()),
            url: Some(url.to_string()),
            last_visit_time: t,
        }
    }

    #[test]
    fn test_parse_snapshot_json() {
        let raw = r#"{
            "bookmarks": [{"title": "Bar", "children": [{"title": "Rust", "url": "https://www.rust-lang.org/"}]}],
            "history": [{"title": "Docs", "url": "https://docs.rs/", "lastVisitTime": 1700000000000}],
            "tabs": [{"title": "Mail", "url": "https://mail.example.com/", "pinned": true}]
        }"#;
        let snapshot: FixtureSnapshot = serde_json::from_str(raw).unwrap();
        assert_eq!(snapshot.bookmarks[0].children.len(), 1);
        assert_eq!(snapshot.history[0].last_visit_time, Some(1_700_000_000_000.0));
        assert_eq!(snapshot.tabs[0].pinned, Some(true));
    }

    #[tokio::test]
    async fn test_history_search_window_and_order() {
        let browser = FixtureBrowser::new(FixtureSnapshot {
            history: vec![
                item("https://old.example/", Some(100.0)),
                item("https://b.example/", Some(2_000.0)),
                item("https://a.example/", Some(3_000.0)),
            ],
            ..Default::default()
        });
        let items = browser
            .search_history(&HistoryQuery { text: String::new(), start_time_ms: 1_000, max_results: 10 })
            .await
            .unwrap();
        let urls: Vec<_> = items.iter().filter_map(|i| i.url.as_deref()).collect();
        assert_eq!(urls, vec!["https://a.example/", "https://b.example/"]);
    }

    #[tokio::test]
    async fn test_create_tab_records_urls() {
        let browser = FixtureBrowser::new(FixtureSnapshot::default());
        browser.create_tab("https://a.example/").await.unwrap();
        browser.create_tab("https://b.example/").await.unwrap();
        assert_eq!(browser.created_tabs(), vec!["https://a.example/", "https://b.example/"]);
    }
}
