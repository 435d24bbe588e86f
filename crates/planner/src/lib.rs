//! Tab planning: collect what the browser knows, ask the planning service
//! which tabs to open, open them.

pub mod client;
pub mod collectors;
pub mod http;
pub mod params;
pub mod pipeline;
pub mod render;
pub mod request;
pub mod status;
pub mod voice;

pub use client::{extract_error_message, PlanService, PlannerClient};
pub use collectors::{collect_all, Collected, CollectorLimits};
pub use params::plan_params;
pub use pipeline::Planner;
pub use render::{RenderSummary, Renderer};
pub use request::{build_plan_request, validate_prompt};
pub use status::{ConsoleStatus, StatusSink, StatusTracker, SubmissionState};
pub use voice::{
    AudioSource, CaptureRecognizer, RecognitionEvent, SpeechRecognizer, VoiceControl, VoiceLabel,
    VoiceOutcome,
};
