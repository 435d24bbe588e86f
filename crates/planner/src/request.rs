use tabplanner_core::{Error, PlanRequest, Result};

use crate::collectors::Collected;

pub const EMPTY_PROMPT_MESSAGE: &str = "Please enter a prompt describing what you need.";
pub const NO_BOOKMARKS_MESSAGE: &str = "No bookmarks with http(s) URLs were found.";

/// Trimmed prompt, or a validation error when nothing is left.
pub fn validate_prompt(prompt: &str) -> Result<String> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(Error::Validation(EMPTY_PROMPT_MESSAGE.to_string()));
    }
    Ok(prompt.to_string())
}

/// Merge the collections with the prompt. At least one bookmark is
/// required; history and open tabs may be empty.
pub fn build_plan_request(prompt: &str, collected: Collected) -> Result<PlanRequest> {
    let prompt = validate_prompt(prompt)?;
    if collected.bookmarks.is_empty() {
        return Err(Error::Validation(NO_BOOKMARKS_MESSAGE.to_string()));
    }

    Ok(PlanRequest {
        prompt,
        bookmarks: collected.bookmarks,
        history: collected.history,
        open_tabs: collected.open_tabs,
    })
}
