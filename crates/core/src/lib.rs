pub mod config;
pub mod error;
pub mod paths;
pub mod types;
pub mod url;

pub use config::Config;
pub use error::{Error, Result};
pub use paths::Paths;
pub use types::{
    BookmarkRecord, HistoryRecord, OpenTabRecord, PlanParams, PlanRequest, PlanResponse,
    Suggestion,
};
pub use url::{is_web_url, is_web_url_value};
