use serde::{Deserialize, Serialize};

/// A bookmark as sent to the planning service. `tags` and `description`
/// are always null; the browser does not expose them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmarkRecord {
    pub title: String,
    pub url: String,
    pub tags: Option<Vec<String>>,
    pub description: Option<String>,
}

impl BookmarkRecord {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            tags: None,
            description: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub title: String,
    pub url: String,
    /// ISO-8601 (UTC, millisecond precision).
    pub last_visited: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenTabRecord {
    pub title: String,
    pub url: String,
    pub opened_at: Option<String>,
    pub pinned: Option<bool>,
}

/// JSON body of `POST /tabs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub prompt: String,
    pub bookmarks: Vec<BookmarkRecord>,
    pub history: Vec<HistoryRecord>,
    pub open_tabs: Vec<OpenTabRecord>,
}

/// Query parameters of `POST /tabs`. Build through
/// `tabplanner_planner::params` so the values are always clamped.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanParams {
    pub limit: u32,
    pub temperature: f64,
    pub model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub title: String,
    pub url: String,
    pub reason: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResponse {
    pub tabs: Vec<Suggestion>,
}
