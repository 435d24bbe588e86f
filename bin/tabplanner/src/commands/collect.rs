use std::path::Path;
use tabplanner_core::{Config, Paths, PlanRequest};

use super::build_planner;

/// Print the `POST /tabs` body a submission would send right now.
pub async fn run(prompt: &str, fixture: Option<&Path>) -> anyhow::Result<()> {
    let paths = Paths::new();
    let config = Config::load_or_default(&paths)?;
    let planner = build_planner(fixture, &config, &paths)?;

    let collected = planner.collect().await?;
    if collected.bookmarks.is_empty() {
        eprintln!("⚠ No bookmarks with http(s) URLs were found; a submission would be rejected.");
    }

    let payload = PlanRequest {
        prompt: prompt.trim().to_string(),
        bookmarks: collected.bookmarks,
        history: collected.history,
        open_tabs: collected.open_tabs,
    };
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}
