//! One submission end to end: validate, collect, request, render.

use chrono::Utc;
use std::io::Write;
use std::sync::Arc;
use tabplanner_browser::BrowserApi;
use tabplanner_core::{Error, PlanParams, PlanRequest, Result};
use tracing::{info, warn};

use crate::client::PlanService;
use crate::collectors::{collect_all, Collected, CollectorLimits};
use crate::render::{RenderSummary, Renderer};
use crate::request::{build_plan_request, validate_prompt};
use crate::status::{StatusSink, StatusTracker, SubmissionState};
use crate::voice::{SpeechRecognizer, VoiceControl, VoiceOutcome};

pub const COLLECTING_MESSAGE: &str = "Collecting bookmarks, history, and open tabs…";
pub const REQUESTING_MESSAGE: &str = "Asking the planner for tab suggestions…";
pub const RENDERING_MESSAGE: &str = "Opening suggested tabs…";

pub struct Planner {
    browser: Arc<dyn BrowserApi>,
    service: Arc<dyn PlanService>,
    limits: CollectorLimits,
}

impl Planner {
    pub fn new(browser: Arc<dyn BrowserApi>, service: Arc<dyn PlanService>) -> Self {
        Self {
            browser,
            service,
            limits: CollectorLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: CollectorLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn browser(&self) -> &dyn BrowserApi {
        self.browser.as_ref()
    }

    /// Run the collectors only.
    pub async fn collect(&self) -> Result<Collected> {
        collect_all(self.browser.as_ref(), self.limits, Utc::now()).await
    }

    /// Submit `prompt`. Validation failures (empty prompt, no bookmarks)
    /// return before any request is made. Every failure moves the status
    /// through `failed` back to `idle` with the error text.
    pub async fn submit<W: Write>(
        &self,
        prompt: &str,
        params: &PlanParams,
        status: &dyn StatusSink,
        renderer: &mut Renderer<W>,
    ) -> Result<RenderSummary> {
        let tracker = StatusTracker::new(status);
        tracker.transition(SubmissionState::Collecting, COLLECTING_MESSAGE)?;

        let request = match self.prepare(prompt).await {
            Ok(request) => request,
            Err(e) => return Err(fail(&tracker, e)),
        };

        tracker.transition(SubmissionState::Requesting, REQUESTING_MESSAGE)?;
        let suggestions = match self.service.plan(&request, params).await {
            Ok(suggestions) => suggestions,
            Err(e) => return Err(fail(&tracker, e)),
        };

        tracker.transition(SubmissionState::Rendering, RENDERING_MESSAGE)?;
        match renderer.render(&suggestions, self.browser.as_ref()).await {
            Ok(summary) => {
                tracker.transition(SubmissionState::Idle, &done_message(&summary))?;
                Ok(summary)
            }
            Err(e) => {
                tracker.transition(SubmissionState::Idle, &e.to_string())?;
                Err(e)
            }
        }
    }

    /// Listen once and, on a non-empty transcript, submit it as the prompt.
    /// `Ok(None)` means the session ended without speech.
    pub async fn submit_voice<W: Write>(
        &self,
        control: &mut VoiceControl,
        recognizer: &dyn SpeechRecognizer,
        locale: &str,
        params: &PlanParams,
        status: &dyn StatusSink,
        renderer: &mut Renderer<W>,
    ) -> Result<Option<RenderSummary>> {
        match control.listen(recognizer, locale).await {
            VoiceOutcome::Transcript(prompt) => {
                info!(prompt = %prompt, "Submitting voice prompt");
                self.submit(&prompt, params, status, renderer).await.map(Some)
            }
            VoiceOutcome::Failed(reason) => {
                let err = Error::Voice(reason);
                status.show(SubmissionState::Idle, &err.to_string());
                Err(err)
            }
            VoiceOutcome::Silent => Ok(None),
        }
    }

    async fn prepare(&self, prompt: &str) -> Result<PlanRequest> {
        validate_prompt(prompt)?;
        let collected = self.collect().await?;
        build_plan_request(prompt, collected)
    }
}

fn fail(tracker: &StatusTracker<'_>, error: Error) -> Error {
    warn!(error = %error, "Submission failed");
    if let Err(e) = tracker.fail(&error) {
        warn!(error = %e, "Status update failed");
    }
    error
}

fn done_message(summary: &RenderSummary) -> String {
    match (summary.rendered, summary.failed.len()) {
        (0, _) => "No tab suggestions returned.".to_string(),
        (n, 0) => format!("Opened {} suggested tab{}.", n, if n == 1 { "" } else { "s" }),
        (n, failed) => format!("Opened {} of {} suggested tabs ({} failed).", n - failed, n, failed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::PlannerClient;
    use crate::request::{EMPTY_PROMPT_MESSAGE, NO_BOOKMARKS_MESSAGE};
    use crate::status::RecordingStatus;
    use crate::voice::tests::ScriptedRecognizer;
    use crate::voice::RecognitionEvent;
    use async_trait::async_trait;
    use serde_json::json;
    use tabplanner_browser::{
        BookmarkNode, FixtureBrowser, FixtureSnapshot, HistoryItem, HistoryQuery, TabInfo,
    };
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use SubmissionState::*;

    fn params() -> PlanParams {
        PlanParams { limit: 5, temperature: 0.2, model: None }
    }

    fn snapshot() -> FixtureSnapshot {
        FixtureSnapshot {
            bookmarks: vec![BookmarkNode::folder(
                "Bookmarks bar",
                vec![
                    BookmarkNode::leaf("arXiv", "https://arxiv.org/"),
                    BookmarkNode::leaf("Settings", "chrome://settings"),
                ],
            )],
            history: vec![],
            tabs: vec![TabInfo {
                title: Some("Mail".to_string()),
                url: Some("https://mail.example.com/".to_string()),
                pinned: Some(true),
            }],
        }
    }

    fn planner(browser: Arc<FixtureBrowser>, uri: &str) -> Planner {
        Planner::new(browser, Arc::new(PlannerClient::new(uri)))
    }

    async fn plan_server(expected: u64) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tabs"))
            .and(query_param("limit", "5"))
            .and(body_partial_json(json!({
                "prompt": "find me research tabs",
                "bookmarks": [{"title": "arXiv", "url": "https://arxiv.org/"}],
                "history": [],
                "open_tabs": [{"title": "Mail", "url": "https://mail.example.com/", "pinned": true}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tabs": [
                    {"title": "arXiv", "url": "https://arxiv.org/", "reason": "Preprints", "score": 0.9},
                    {"title": "Semantic Scholar", "url": "https://www.semanticscholar.org/", "reason": "Citations", "score": 0.42}
                ]
            })))
            .expect(expected)
            .mount(&server)
            .await;
        server
    }

    struct DeniedBrowser;

    #[async_trait]
    impl BrowserApi for DeniedBrowser {
        async fn bookmark_tree(&self) -> Result<Vec<BookmarkNode>> {
            Ok(vec![BookmarkNode::leaf("arXiv", "https://arxiv.org/")])
        }
        async fn search_history(&self, _query: &HistoryQuery) -> Result<Vec<HistoryItem>> {
            Err(Error::Browser("history permission denied".to_string()))
        }
        async fn query_tabs(&self) -> Result<Vec<TabInfo>> {
            Ok(vec![])
        }
        async fn create_tab(&self, _url: &str) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_submit_end_to_end() {
        let server = plan_server(1).await;
        let browser = Arc::new(FixtureBrowser::new(snapshot()));
        let planner = planner(browser.clone(), &server.uri());
        let status = RecordingStatus::new();
        let mut renderer = Renderer::new(Vec::new());

        let summary = planner
            .submit("find me research tabs", &params(), &status, &mut renderer)
            .await
            .unwrap();

        assert_eq!(summary.rendered, 2);
        assert_eq!(
            browser.created_tabs(),
            vec!["https://arxiv.org/", "https://www.semanticscholar.org/"]
        );
        let out = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(out.contains("Confidence: 90%"));
        assert!(out.contains("Confidence: 42%"));
        assert_eq!(status.states(), vec![Collecting, Requesting, Rendering, Idle]);
        assert_eq!(status.last_message().as_deref(), Some("Opened 2 suggested tabs."));
    }

    #[tokio::test]
    async fn test_no_bookmarks_makes_no_request() {
        let server = plan_server(0).await;
        let browser = Arc::new(FixtureBrowser::new(FixtureSnapshot {
            bookmarks: vec![BookmarkNode::leaf("Settings", "chrome://settings")],
            ..Default::default()
        }));
        let planner = planner(browser.clone(), &server.uri());
        let status = RecordingStatus::new();
        let mut renderer = Renderer::new(Vec::new());

        let err = planner
            .submit("find me research tabs", &params(), &status, &mut renderer)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), NO_BOOKMARKS_MESSAGE);
        assert_eq!(status.states(), vec![Collecting, Failed, Idle]);
        assert_eq!(status.last_message().as_deref(), Some(NO_BOOKMARKS_MESSAGE));
        assert!(browser.created_tabs().is_empty());
    }

    #[tokio::test]
    async fn test_empty_prompt_makes_no_request() {
        let server = plan_server(0).await;
        let planner = planner(Arc::new(FixtureBrowser::new(snapshot())), &server.uri());
        let status = RecordingStatus::new();
        let mut renderer = Renderer::new(Vec::new());

        let err = planner
            .submit("   ", &params(), &status, &mut renderer)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), EMPTY_PROMPT_MESSAGE);
        assert_eq!(status.states(), vec![Collecting, Failed, Idle]);
    }

    #[tokio::test]
    async fn test_collector_failure_aborts() {
        let server = plan_server(0).await;
        let planner = Planner::new(Arc::new(DeniedBrowser), Arc::new(PlannerClient::new(&server.uri())));
        let status = RecordingStatus::new();
        let mut renderer = Renderer::new(Vec::new());

        let err = planner
            .submit("find me research tabs", &params(), &status, &mut renderer)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Browser error: history permission denied");
        assert_eq!(status.last_message().as_deref(), Some("Browser error: history permission denied"));
    }

    #[tokio::test]
    async fn test_service_error_surfaces_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tabs"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "detail": [{"loc": ["body", "prompt"], "msg": "field required"}]
            })))
            .mount(&server)
            .await;

        let planner = planner(Arc::new(FixtureBrowser::new(snapshot())), &server.uri());
        let status = RecordingStatus::new();
        let mut renderer = Renderer::new(Vec::new());

        let err = planner
            .submit("find me research tabs", &params(), &status, &mut renderer)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "field required");
        assert_eq!(status.states(), vec![Collecting, Requesting, Failed, Idle]);
        assert!(renderer.into_inner().is_empty());
    }

    #[tokio::test]
    async fn test_voice_submits_transcript() {
        let server = plan_server(1).await;
        let browser = Arc::new(FixtureBrowser::new(snapshot()));
        let planner = planner(browser.clone(), &server.uri());
        let status = RecordingStatus::new();
        let mut renderer = Renderer::new(Vec::new());
        let mut control = VoiceControl::new();

        let summary = planner
            .submit_voice(
                &mut control,
                &ScriptedRecognizer::saying("find me research tabs"),
                "en-US",
                &params(),
                &status,
                &mut renderer,
            )
            .await
            .unwrap();
        assert_eq!(summary.map(|s| s.rendered), Some(2));
        assert_eq!(browser.created_tabs().len(), 2);
    }

    #[tokio::test]
    async fn test_voice_error_skips_submission() {
        let server = plan_server(0).await;
        let planner = planner(Arc::new(FixtureBrowser::new(snapshot())), &server.uri());
        let status = RecordingStatus::new();
        let mut renderer = Renderer::new(Vec::new());
        let mut control = VoiceControl::new();
        let recognizer = ScriptedRecognizer::new(vec![
            RecognitionEvent::Start,
            RecognitionEvent::Error("no-speech".to_string()),
            RecognitionEvent::End,
        ]);

        let err = planner
            .submit_voice(&mut control, &recognizer, "en-US", &params(), &status, &mut renderer)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Voice input error: no-speech");
        assert_eq!(status.last_message().as_deref(), Some("Voice input error: no-speech"));
        assert_eq!(status.states(), vec![Idle]);
    }

    #[test]
    fn test_done_message() {
        let mut summary = RenderSummary { rendered: 1, ..Default::default() };
        assert_eq!(done_message(&summary), "Opened 1 suggested tab.");
        summary.rendered = 3;
        summary.failed.push(("https://x/".into(), "boom".into()));
        assert_eq!(done_message(&summary), "Opened 2 of 3 suggested tabs (1 failed).");
        assert_eq!(done_message(&RenderSummary::default()), "No tab suggestions returned.");
    }
}
