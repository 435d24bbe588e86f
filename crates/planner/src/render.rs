//! Prints suggestions and opens each one as a new tab.

use std::io::Write;
use tabplanner_browser::BrowserApi;
use tabplanner_core::{is_web_url, Result, Suggestion};
use tracing::{info, warn};

pub const NO_SUGGESTIONS_MESSAGE: &str = "No tab suggestions returned.";
pub const NOT_WEB_URL_MESSAGE: &str = "Refused to open a non-http(s) URL";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderSummary {
    pub rendered: usize,
    pub opened: Vec<String>,
    pub failed: Vec<(String, String)>,
}

/// `round(score * 100)` with the score clamped to `[0, 1]`.
pub fn confidence_percent(score: f64) -> u32 {
    if score.is_nan() {
        return 0;
    }
    (score.clamp(0.0, 1.0) * 100.0).round() as u32
}

pub struct Renderer<W: Write> {
    out: W,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Replace previous output with `suggestions`, opening every URL as it
    /// is printed. A tab that fails to open is logged and counted. Only
    /// http(s) URLs ever reach the browser.
    pub async fn render(
        &mut self,
        suggestions: &[Suggestion],
        browser: &dyn BrowserApi,
    ) -> Result<RenderSummary> {
        let mut summary = RenderSummary::default();

        if suggestions.is_empty() {
            writeln!(self.out, "{}", NO_SUGGESTIONS_MESSAGE)?;
            self.out.flush()?;
            return Ok(summary);
        }

        for (i, tab) in suggestions.iter().enumerate() {
            self.write_suggestion(i + 1, tab)?;
            summary.rendered += 1;

            if !is_web_url(&tab.url) {
                warn!(url = %tab.url, "Suggested URL is not http(s), not opening");
                summary.failed.push((tab.url.clone(), NOT_WEB_URL_MESSAGE.to_string()));
                continue;
            }

            match browser.create_tab(&tab.url).await {
                Ok(()) => summary.opened.push(tab.url.clone()),
                Err(e) => {
                    warn!(url = %tab.url, error = %e, "Failed to open suggested tab");
                    summary.failed.push((tab.url.clone(), e.to_string()));
                }
            }
        }
        self.out.flush()?;

        info!(
            rendered = summary.rendered,
            opened = summary.opened.len(),
            failed = summary.failed.len(),
            "Suggestions rendered"
        );
        Ok(summary)
    }

    fn write_suggestion(&mut self, index: usize, tab: &Suggestion) -> std::io::Result<()> {
        let title = if tab.title.trim().is_empty() {
            tab.url.as_str()
        } else {
            tab.title.as_str()
        };
        writeln!(self.out, "{}. {}", index, title)?;
        writeln!(self.out, "   {}", tab.url)?;
        if !tab.reason.trim().is_empty() {
            writeln!(self.out, "   {}", tab.reason.trim())?;
        }
        writeln!(self.out, "   Confidence: {}%", confidence_percent(tab.score))?;
        writeln!(self.out)
    }
}
