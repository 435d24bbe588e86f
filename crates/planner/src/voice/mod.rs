//! Single-shot voice input.
//!
//! A [`SpeechRecognizer`] runs one recognition session and reports its
//! lifecycle as [`RecognitionEvent`]s. [`VoiceControl`] follows those events
//! to drive the control label and decide what, if anything, to submit.

pub mod capture;
pub mod transcribe;

use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use tabplanner_core::config::VoiceConfig;
use tabplanner_core::{Error, Paths, Result};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub use capture::AudioSource;
pub use transcribe::{TranscribeBackend, Transcriber};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    Start,
    SpeechEnd,
    Result(String),
    Error(String),
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceLabel {
    Idle,
    Listening,
    Processing,
}

impl fmt::Display for VoiceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VoiceLabel::Idle => "🎤 Speak",
            VoiceLabel::Listening => "🎤 Listening…",
            VoiceLabel::Processing => "🎤 Processing…",
        };
        f.write_str(s)
    }
}

/// What a finished session produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceOutcome {
    Transcript(String),
    Failed(String),
    /// Ended without a usable transcript or an error.
    Silent,
}

#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Run one non-continuous session in `locale`. `End` is the last event
    /// sent; the channel closes when this returns.
    async fn run(&self, locale: &str, events: mpsc::Sender<RecognitionEvent>) -> Result<()>;
}

/// The voice control: owns the label and turns an event stream into a
/// [`VoiceOutcome`].
pub struct VoiceControl {
    label: VoiceLabel,
    history: Vec<VoiceLabel>,
    on_label: Option<Box<dyn Fn(VoiceLabel) + Send + Sync>>,
}

impl Default for VoiceControl {
    fn default() -> Self {
        Self::new()
    }
}

impl VoiceControl {
    pub fn new() -> Self {
        Self {
            label: VoiceLabel::Idle,
            history: vec![VoiceLabel::Idle],
            on_label: None,
        }
    }

    /// Call `f` every time the label changes.
    pub fn on_label(mut self, f: impl Fn(VoiceLabel) + Send + Sync + 'static) -> Self {
        self.on_label = Some(Box::new(f));
        self
    }

    pub fn label(&self) -> VoiceLabel {
        self.label
    }

    /// Every label shown so far, starting with `Idle`.
    pub fn history(&self) -> &[VoiceLabel] {
        &self.history
    }

    fn set_label(&mut self, label: VoiceLabel) {
        if self.label == label {
            return;
        }
        debug!(label = ?label, "Voice control label");
        self.label = label;
        self.history.push(label);
        if let Some(f) = &self.on_label {
            f(label);
        }
    }

    /// Apply one event. The first non-empty transcript or error sticks.
    pub fn apply(&mut self, event: RecognitionEvent, outcome: &mut Option<VoiceOutcome>) {
        match event {
            RecognitionEvent::Start => self.set_label(VoiceLabel::Listening),
            RecognitionEvent::SpeechEnd => self.set_label(VoiceLabel::Processing),
            RecognitionEvent::Result(text) => {
                let text = text.trim();
                if !text.is_empty() && outcome.is_none() {
                    *outcome = Some(VoiceOutcome::Transcript(text.to_string()));
                }
            }
            RecognitionEvent::Error(reason) => {
                warn!(reason = %reason, "Speech recognition error");
                if !matches!(outcome, Some(VoiceOutcome::Failed(_))) {
                    *outcome = Some(VoiceOutcome::Failed(reason));
                }
            }
            RecognitionEvent::End => self.set_label(VoiceLabel::Idle),
        }
    }

    /// Run `recognizer` to completion and report what it produced.
    pub async fn listen(&mut self, recognizer: &dyn SpeechRecognizer, locale: &str) -> VoiceOutcome {
        let (tx, mut rx) = mpsc::channel(16);
        let mut outcome = None;

        let (run_result, ()) = tokio::join!(recognizer.run(locale, tx), async {
            while let Some(event) = rx.recv().await {
                self.apply(event, &mut outcome);
            }
        });

        if let Err(e) = run_result {
            if outcome.is_none() {
                outcome = Some(VoiceOutcome::Failed(voice_reason(&e)));
            }
        }
        // A recognizer that never sent End still leaves the control usable.
        self.set_label(VoiceLabel::Idle);

        let outcome = outcome.unwrap_or(VoiceOutcome::Silent);
        info!(outcome = ?outcome, "Voice session finished");
        outcome
    }
}

/// Failure reason without the `Voice input error:` prefix.
pub fn voice_reason(error: &Error) -> String {
    match error {
        Error::Voice(reason) => reason.clone(),
        other => other.to_string(),
    }
}

/// Records one utterance (or takes an existing file) and transcribes it.
pub struct CaptureRecognizer {
    source: AudioSource,
    transcriber: Transcriber,
    recordings_dir: PathBuf,
}

impl CaptureRecognizer {
    pub fn new(source: AudioSource, transcriber: Transcriber, recordings_dir: PathBuf) -> Self {
        Self {
            source,
            transcriber,
            recordings_dir,
        }
    }

    pub fn from_config(config: &VoiceConfig, paths: &Paths, source: AudioSource) -> Self {
        Self::new(
            source,
            Transcriber::from_config(config, paths),
            paths.recordings_dir(),
        )
    }
}

#[async_trait]
impl SpeechRecognizer for CaptureRecognizer {
    async fn run(&self, locale: &str, events: mpsc::Sender<RecognitionEvent>) -> Result<()> {
        let send = |event| {
            let events = events.clone();
            async move {
                let _ = events.send(event).await;
            }
        };

        send(RecognitionEvent::Start).await;
        let audio = capture::capture(&self.source, &self.recordings_dir).await;
        send(RecognitionEvent::SpeechEnd).await;

        let result = match audio {
            Ok(path) => {
                let text = self.transcriber.transcribe(&path, locale).await;
                if self.source.is_recording() {
                    let _ = tokio::fs::remove_file(&path).await;
                }
                text
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(text) => send(RecognitionEvent::Result(text)).await,
            Err(e) => send(RecognitionEvent::Error(voice_reason(&e))).await,
        }
        send(RecognitionEvent::End).await;
        Ok(())
    }
}
