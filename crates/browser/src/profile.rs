//! Reading bookmarks and history straight from a Chromium profile directory.
//!
//! `Bookmarks` is a JSON document with `bookmark_bar`, `other` and `synced`
//! roots. `History` is a SQLite database that the running browser keeps
//! locked, so it is copied aside before being opened read-only.

use rusqlite::{params, Connection, OpenFlags};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tabplanner_core::{Error, Result};
use tracing::{debug, warn};

use crate::{BookmarkNode, HistoryItem, HistoryQuery};

/// Milliseconds between 1601-01-01 (Chrome/WebKit epoch) and 1970-01-01.
const WEBKIT_EPOCH_OFFSET_MS: i64 = 11_644_473_600_000;

const BOOKMARK_ROOTS: [&str; 3] = ["bookmark_bar", "other", "synced"];

#[derive(Debug, Clone)]
pub struct ChromiumProfile {
    dir: PathBuf,
}

impl ChromiumProfile {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn bookmarks_file(&self) -> PathBuf {
        self.dir.join("Bookmarks")
    }

    pub fn history_file(&self) -> PathBuf {
        self.dir.join("History")
    }

    /// Root folders of the bookmark tree. A profile without a `Bookmarks`
    /// file simply has no bookmarks.
    pub fn read_bookmarks(&self) -> Result<Vec<BookmarkNode>> {
        let path = self.bookmarks_file();
        if !path.exists() {
            debug!(path = %path.display(), "Bookmarks file not found");
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&path)?;
        let json: Value = serde_json::from_str(&content)
            .map_err(|e| Error::Browser(format!("Unreadable bookmarks file {}: {}", path.display(), e)))?;

        let roots = json.get("roots").ok_or_else(|| {
            Error::Browser(format!("Bookmarks file {} has no roots", path.display()))
        })?;

        Ok(BOOKMARK_ROOTS
            .iter()
            .filter_map(|key| roots.get(*key))
            .map(convert_bookmark_node)
            .collect())
    }

    /// Visits newer than `query.start_time_ms`, most recent first.
    pub fn read_history(&self, query: &HistoryQuery, scratch_dir: &Path) -> Result<Vec<HistoryItem>> {
        let path = self.history_file();
        if !path.exists() {
            debug!(path = %path.display(), "History database not found");
            return Ok(Vec::new());
        }

        std::fs::create_dir_all(scratch_dir)?;
        let copy = scratch_dir.join(format!("history-{}.db", std::process::id()));
        std::fs::copy(&path, &copy)?;

        let result = query_history_db(&copy, query);
        if let Err(e) = std::fs::remove_file(&copy) {
            warn!(error = %e, path = %copy.display(), "Failed to remove history copy");
        }
        result
    }
}

fn convert_bookmark_node(raw: &Value) -> BookmarkNode {
    let title = raw
        .get("name")
        .and_then(|v| v.as_str())
        .map(str::to_string);
    let url = if raw.get("type").and_then(|v| v.as_str()) == Some("folder") {
        None
    } else {
        raw.get("url").and_then(|v| v.as_str()).map(str::to_string)
    };
    let children = raw
        .get("children")
        .and_then(|v| v.as_array())
        .map(|items| items.iter().map(convert_bookmark_node).collect())
        .unwrap_or_default();

    BookmarkNode { title, url, children }
}

fn query_history_db(db_path: &Path, query: &HistoryQuery) -> Result<Vec<HistoryItem>> {
    let conn = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|e| Error::Browser(format!("Failed to open history database: {}", e)))?;

    let mut stmt = conn
        .prepare(
            "SELECT url, title, last_visit_time
             FROM urls
             WHERE hidden = 0
               AND last_visit_time >= ?1
               AND (?2 = '' OR url LIKE '%' || ?2 || '%' OR title LIKE '%' || ?2 || '%')
             ORDER BY last_visit_time DESC
             LIMIT ?3",
        )
        .map_err(|e| Error::Browser(format!("Failed to query history: {}", e)))?;

    let start = ms_to_webkit(query.start_time_ms);
    let limit = i64::try_from(query.max_results).unwrap_or(i64::MAX);

    let rows = stmt
        .query_map(params![start, query.text, limit], |row| {
            let url: String = row.get(0)?;
            let title: Option<String> = row.get(1)?;
            let visit: i64 = row.get(2)?;
            Ok(HistoryItem {
                title,
                url: Some(url),
                last_visit_time: (visit > 0).then(|| webkit_to_ms(visit) as f64),
            })
        })
        .map_err(|e| Error::Browser(format!("Failed to query history: {}", e)))?;

    let mut items = Vec::new();
    for row in rows {
        match row {
            Ok(item) => items.push(item),
            Err(e) => debug!(error = %e, "Skipping unreadable history row"),
        }
    }
    Ok(items)
}

/// WebKit microseconds to Unix epoch milliseconds.
pub fn webkit_to_ms(webkit_us: i64) -> i64 {
    webkit_us / 1000 - WEBKIT_EPOCH_OFFSET_MS
}

/// Unix epoch milliseconds to WebKit microseconds.
pub fn ms_to_webkit(ms: i64) -> i64 {
    (ms + WEBKIT_EPOCH_OFFSET_MS) * 1000
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_history(dir: &Path, rows: &[(&str, &str, i64, i64)]) {
        let conn = Connection::open(dir.join("History")).unwrap();
        conn.execute_batch(
            "CREATE TABLE urls (
                id INTEGER PRIMARY KEY,
                url LONGVARCHAR,
                title LONGVARCHAR,
                visit_count INTEGER DEFAULT 0 NOT NULL,
                last_visit_time INTEGER NOT NULL,
                hidden INTEGER DEFAULT 0 NOT NULL
            );",
        )
        .unwrap();
        for (url, title, last_visit_ms, hidden) in rows {
            conn.execute(
                "INSERT INTO urls (url, title, last_visit_time, hidden) VALUES (?1, ?2, ?3, ?4)",
                params![url, title, ms_to_webkit(*last_visit_ms), hidden],
            )
            .unwrap();
        }
    }

    #[test]
    fn test_epoch_conversion() {
        assert_eq!(webkit_to_ms(ms_to_webkit(1_700_000_000_000)), 1_700_000_000_000);
        assert_eq!(webkit_to_ms(11_644_473_600_000_000), 0);
    }

    #[test]
    fn test_read_bookmarks_roots_and_folders() {
        let dir = TempDir::new().unwrap();
        let raw = r#"{
  "roots": {
    "bookmark_bar": {
      "name": "Bookmarks bar", "type": "folder",
      "children": [
        { "name": "Rust", "type": "url", "url": "https://www.rust-lang.org/" },
        { "name": "Work", "type": "folder", "children": [
          { "name": "", "type": "url", "url": "https://jira.example.com/" }
        ]}
      ]
    },
    "other": { "name": "Other bookmarks", "type": "folder", "children": [] },
    "synced": { "name": "Mobile bookmarks", "type": "folder", "children": [] }
  },
  "version": 1
}"#;
        std::fs::write(dir.path().join("Bookmarks"), raw).unwrap();

        let profile = ChromiumProfile::new(dir.path().to_path_buf());
        let roots = profile.read_bookmarks().unwrap();
        assert_eq!(roots.len(), 3);
        assert_eq!(roots[0].title.as_deref(), Some("Bookmarks bar"));
        assert!(roots[0].url.is_none());
        assert_eq!(roots[0].children[0].url.as_deref(), Some("https://www.rust-lang.org/"));
        assert_eq!(
            roots[0].children[1].children[0].url.as_deref(),
            Some("https://jira.example.com/")
        );
    }

    #[test]
    fn test_missing_files_are_empty() {
        let dir = TempDir::new().unwrap();
        let profile = ChromiumProfile::new(dir.path().to_path_buf());
        assert!(profile.read_bookmarks().unwrap().is_empty());

        let query = HistoryQuery { text: String::new(), start_time_ms: 0, max_results: 20 };
        assert!(profile.read_history(&query, &dir.path().join("tmp")).unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_bookmarks_is_browser_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("Bookmarks"), "{{").unwrap();
        let profile = ChromiumProfile::new(dir.path().to_path_buf());
        assert!(matches!(profile.read_bookmarks(), Err(Error::Browser(_))));
    }

    #[test]
    fn test_read_history_window_order_and_limit() {
        let dir = TempDir::new().unwrap();
        let now = 1_700_000_000_000i64;
        let day = 86_400_000i64;
        write_history(
            dir.path(),
            &[
                ("https://old.example.com/", "Old", now - 30 * day, 0),
                ("https://a.example.com/", "A", now - day, 0),
                ("https://b.example.com/", "B", now - 2 * day, 0),
                ("https://c.example.com/", "C", now - 3 * day, 0),
                ("https://hidden.example.com/", "Hidden", now - day, 1),
            ],
        );

        let profile = ChromiumProfile::new(dir.path().to_path_buf());
        let query = HistoryQuery {
            text: String::new(),
            start_time_ms: now - 7 * day,
            max_results: 2,
        };
        let items = profile.read_history(&query, &dir.path().join("scratch")).unwrap();
        let urls: Vec<_> = items.iter().filter_map(|i| i.url.as_deref()).collect();
        assert_eq!(urls, vec!["https://a.example.com/", "https://b.example.com/"]);
        assert_eq!(items[0].last_visit_time, Some((now - day) as f64));
        // The scratch copy is cleaned up.
        assert_eq!(std::fs::read_dir(dir.path().join("scratch")).unwrap().count(), 0);
    }

    #[test]
    fn test_read_history_text_filter() {
        let dir = TempDir::new().unwrap();
        let now = 1_700_000_000_000i64;
        write_history(
            dir.path(),
            &[
                ("https://docs.rs/tokio", "tokio docs", now, 0),
                ("https://news.example.com/", "News", now, 0),
            ],
        );
        let profile = ChromiumProfile::new(dir.path().to_path_buf());
        let query = HistoryQuery { text: "tokio".into(), start_time_ms: 0, max_results: 20 };
        let items = profile.read_history(&query, &dir.path().join("scratch")).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title.as_deref(), Some("tokio docs"));
    }
}
