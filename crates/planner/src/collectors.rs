//! Collectors: one per browser data source, each reducing its source to
//! web-URL records.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use tabplanner_browser::{BookmarkNode, BrowserApi, HistoryQuery};
use tabplanner_core::config::CollectorsConfig;
use tabplanner_core::{is_web_url, BookmarkRecord, HistoryRecord, OpenTabRecord, Result};
use tracing::debug;

pub const BOOKMARK_CAP: usize = 200;
pub const HISTORY_MAX_RESULTS: usize = 20;
pub const HISTORY_LOOKBACK_DAYS: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollectorLimits {
    pub bookmark_cap: usize,
    pub history_max_results: usize,
    pub history_lookback_days: u32,
}

impl Default for CollectorLimits {
    fn default() -> Self {
        Self {
            bookmark_cap: BOOKMARK_CAP,
            history_max_results: HISTORY_MAX_RESULTS,
            history_lookback_days: HISTORY_LOOKBACK_DAYS,
        }
    }
}

impl From<&CollectorsConfig> for CollectorLimits {
    fn from(cfg: &CollectorsConfig) -> Self {
        Self {
            bookmark_cap: cfg.bookmark_cap,
            history_max_results: cfg.history_max_results,
            history_lookback_days: cfg.history_lookback_days,
        }
    }
}

/// Output of the three collectors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collected {
    pub bookmarks: Vec<BookmarkRecord>,
    pub history: Vec<HistoryRecord>,
    pub open_tabs: Vec<OpenTabRecord>,
}

/// Run all collectors concurrently. The first failure wins; there is no
/// partial result.
pub async fn collect_all(
    browser: &dyn BrowserApi,
    limits: CollectorLimits,
    now: DateTime<Utc>,
) -> Result<Collected> {
    let (bookmarks, history, open_tabs) = tokio::try_join!(
        collect_bookmarks(browser, limits.bookmark_cap),
        collect_history(browser, limits, now),
        collect_open_tabs(browser),
    )?;

    debug!(
        bookmarks = bookmarks.len(),
        history = history.len(),
        open_tabs = open_tabs.len(),
        "Browser data collected"
    );

    Ok(Collected {
        bookmarks,
        history,
        open_tabs,
    })
}

pub async fn collect_bookmarks(browser: &dyn BrowserApi, cap: usize) -> Result<Vec<BookmarkRecord>> {
    let roots = browser.bookmark_tree().await?;
    Ok(flatten_bookmarks(roots, cap))
}

/// Depth-first walk with an explicit stack, so the last child subtree is
/// visited first. Stops at `cap` records; duplicates are kept.
pub fn flatten_bookmarks(roots: Vec<BookmarkNode>, cap: usize) -> Vec<BookmarkRecord> {
    let mut records = Vec::new();
    let mut stack = roots;

    while let Some(node) = stack.pop() {
        if records.len() >= cap {
            break;
        }
        if let Some(url) = node.url.as_deref().filter(|u| is_web_url(u)) {
            records.push(BookmarkRecord::new(display_title(node.title.as_deref(), url), url));
        }
        stack.extend(node.children);
    }

    records.truncate(cap);
    records
}

pub async fn collect_history(
    browser: &dyn BrowserApi,
    limits: CollectorLimits,
    now: DateTime<Utc>,
) -> Result<Vec<HistoryRecord>> {
    let start = now - Duration::days(i64::from(limits.history_lookback_days));
    let start_ms = start.timestamp_millis();

    let items = browser
        .search_history(&HistoryQuery {
            text: String::new(),
            start_time_ms: start_ms,
            max_results: limits.history_max_results,
        })
        .await?;

    Ok(items
        .into_iter()
        .filter(|item| item.last_visit_time.map_or(true, |t| t >= start_ms as f64))
        .filter_map(|item| {
            let url = item.url.filter(|u| is_web_url(u))?;
            Some(HistoryRecord {
                title: display_title(item.title.as_deref(), &url),
                last_visited: item.last_visit_time.and_then(epoch_ms_to_iso),
                url,
            })
        })
        .take(limits.history_max_results)
        .collect())
}

pub async fn collect_open_tabs(browser: &dyn BrowserApi) -> Result<Vec<OpenTabRecord>> {
    let tabs = browser.query_tabs().await?;
    Ok(tabs
        .into_iter()
        .filter_map(|tab| {
            let url = tab.url.filter(|u| is_web_url(u))?;
            Some(OpenTabRecord {
                title: display_title(tab.title.as_deref(), &url),
                url,
                opened_at: None,
                pinned: tab.pinned,
            })
        })
        .collect())
}

fn display_title(title: Option<&str>, url: &str) -> String {
    match title {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => url.to_string(),
    }
}

/// `2023-11-14T22:13:20.000Z` style, or `None` for values chrono cannot
/// represent.
pub fn epoch_ms_to_iso(ms: f64) -> Option<String> {
    if !ms.is_finite() {
        return None;
    }
    DateTime::<Utc>::from_timestamp_millis(ms.trunc() as i64)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}
