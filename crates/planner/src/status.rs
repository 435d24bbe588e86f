//! Submission progress: the per-request state machine and the sinks that
//! display it.

use std::fmt;
use std::io::Write;
use std::sync::Mutex;
use tabplanner_core::{Error, Result};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Collecting,
    Requesting,
    Rendering,
    Failed,
}

impl SubmissionState {
    pub fn can_transition_to(self, next: SubmissionState) -> bool {
        use SubmissionState::*;
        matches!(
            (self, next),
            (Idle, Collecting)
                | (Collecting, Requesting)
                | (Collecting, Failed)
                | (Requesting, Rendering)
                | (Requesting, Failed)
                | (Rendering, Idle)
                | (Failed, Idle)
        )
    }

    /// A request is in flight; the status line marks these with `…`.
    pub fn is_busy(self) -> bool {
        matches!(
            self,
            SubmissionState::Collecting | SubmissionState::Requesting | SubmissionState::Rendering
        )
    }
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Collecting => "collecting",
            SubmissionState::Requesting => "requesting",
            SubmissionState::Rendering => "rendering",
            SubmissionState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Where status text goes: a terminal line, a test recorder, ...
pub trait StatusSink: Send + Sync {
    fn show(&self, state: SubmissionState, message: &str);
}

/// Drives one submission through the state machine and mirrors every step
/// to a [`StatusSink`].
pub struct StatusTracker<'a> {
    sink: &'a dyn StatusSink,
    state: Mutex<SubmissionState>,
}

impl<'a> StatusTracker<'a> {
    pub fn new(sink: &'a dyn StatusSink) -> Self {
        Self {
            sink,
            state: Mutex::new(SubmissionState::Idle),
        }
    }

    pub fn state(&self) -> SubmissionState {
        self.state
            .lock()
            .map(|s| *s)
            .unwrap_or(SubmissionState::Idle)
    }

    pub fn transition(&self, next: SubmissionState, message: &str) -> Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| Error::Other("status state poisoned".to_string()))?;
        if !state.can_transition_to(next) {
            return Err(Error::Other(format!(
                "invalid submission transition {} -> {}",
                *state, next
            )));
        }
        debug!(from = %*state, to = %next, "Submission state");
        *state = next;
        drop(state);

        self.sink.show(next, message);
        Ok(())
    }

    /// Move to `Failed` with `error` as the status text, then back to
    /// `Idle` keeping that text visible.
    pub fn fail(&self, error: &Error) -> Result<()> {
        let message = error.to_string();
        self.transition(SubmissionState::Failed, &message)?;
        self.transition(SubmissionState::Idle, &message)
    }
}

/// Writes status lines to a terminal stream (stderr in the CLI).
pub struct ConsoleStatus<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> ConsoleStatus<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }
}

impl ConsoleStatus<std::io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write + Send> StatusSink for ConsoleStatus<W> {
    fn show(&self, state: SubmissionState, message: &str) {
        let prefix = if state.is_busy() {
            "…"
        } else if state == SubmissionState::Failed {
            "✗"
        } else {
            "·"
        };
        if let Ok(mut out) = self.out.lock() {
            let _ = writeln!(out, "{} {}", prefix, message);
            let _ = out.flush();
        }
    }
}

/// Keeps every update in memory.
#[derive(Default)]
pub struct RecordingStatus {
    entries: Mutex<Vec<(SubmissionState, String)>>,
}

impl RecordingStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(SubmissionState, String)> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn states(&self) -> Vec<SubmissionState> {
        self.entries().into_iter().map(|(s, _)| s).collect()
    }

    pub fn last_message(&self) -> Option<String> {
        self.entries().last().map(|(_, m)| m.clone())
    }
}

impl StatusSink for RecordingStatus {
    fn show(&self, state: SubmissionState, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((state, message.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SubmissionState::*;

    #[test]
    fn test_success_path() {
        let sink = RecordingStatus::new();
        let tracker = StatusTracker::new(&sink);
        tracker.transition(Collecting, "collecting").unwrap();
        assert!(tracker.state().is_busy());
        tracker.transition(Requesting, "requesting").unwrap();
        tracker.transition(Rendering, "rendering").unwrap();
        tracker.transition(Idle, "done").unwrap();
        assert!(!tracker.state().is_busy());
        assert_eq!(sink.states(), vec![Collecting, Requesting, Rendering, Idle]);
    }

    #[test]
    fn test_failure_returns_to_idle_with_message() {
        let sink = RecordingStatus::new();
        let tracker = StatusTracker::new(&sink);
        tracker.transition(Collecting, "collecting").unwrap();
        tracker.fail(&Error::Validation("Please enter a prompt describing what you need.".into())).unwrap();
        assert_eq!(sink.states(), vec![Collecting, Failed, Idle]);
        assert_eq!(sink.last_message().as_deref(), Some("Please enter a prompt describing what you need."));
        assert_eq!(tracker.state(), Idle);
    }

    #[test]
    fn test_invalid_transitions_rejected() {
        let sink = RecordingStatus::new();
        let tracker = StatusTracker::new(&sink);
        assert!(tracker.transition(Requesting, "skip").is_err());
        assert!(tracker.fail(&Error::Other("x".into())).is_err());
        assert!(!Rendering.can_transition_to(Failed));
        assert!(sink.entries().is_empty());
    }

    #[test]
    fn test_console_status_lines() {
        let console = ConsoleStatus::new(Vec::new());
        console.show(Collecting, "Collecting bookmarks, history, and tabs…");
        console.show(Rendering, "Opening suggested tabs…");
        console.show(Failed, "boom");
        console.show(Idle, "boom");
        let out = String::from_utf8(console.out.into_inner().unwrap()).unwrap();
        assert_eq!(
            out,
            "… Collecting bookmarks, history, and tabs…\n… Opening suggested tabs…\n✗ boom\n· boom\n"
        );
    }
}
