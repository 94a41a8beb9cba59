//! Session record and event folding
//!
//! Defines the shared session record and the rules for folding one backend
//! event into it. The fold is pure apart from the record mutation itself:
//! side effects are returned as [`FoldEffect`]s for the controller to run,
//! which keeps the rules unit-testable without any collaborator in place.

use serde::{Deserialize, Serialize};

use crate::backend::BackendEvent;

/// Whether the backend has confirmed speech was detected.
///
/// Only the native service emits this as a distinct signal; with the
/// browser backend the mark simply stays unset. That asymmetry is expected,
/// not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionMark {
    #[default]
    Unset,
    Confirmed,
}

/// Whether the backend has signalled session completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CompletionMark {
    #[default]
    Unset,
    Ended,
}

/// Listening phase as seen by the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No session active.
    #[default]
    Idle,
    /// A session is capturing speech.
    Listening,
}

impl SessionPhase {
    /// Returns a human-readable description of the phase.
    pub fn description(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "Waiting to listen",
            SessionPhase::Listening => "Listening for speech",
        }
    }
}

/// Side effects the controller must perform after folding an event.
#[derive(Debug, Clone, PartialEq)]
pub enum FoldEffect {
    /// Start the listening pulse animation.
    PulseStarted,
    /// Stop the listening pulse animation.
    PulseStopped,
    /// A non-empty final candidate list arrived; the payload is the most
    /// confident candidate, the authoritative display transcript.
    TranscriptPublished(String),
    /// Surface a one-shot user-facing alert with the given description.
    AlertRaised(String),
}

/// Mutable session record.
///
/// Single writer (the controller's fold), many readers (snapshots handed to
/// the rendering layer). `started` and `end` are not strict complements:
/// a backend may report start → result → end with no explicit stop, and an
/// error may terminate a session without end ever firing.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionState {
    /// True between a successful start event and a terminal end/error event.
    pub started: bool,
    /// Set once the backend confirms speech was detected.
    pub recognized: RecognitionMark,
    /// Finalised transcript candidates, most confident first.
    pub results: Vec<String>,
    /// Interim transcript candidates, replaced wholesale on each partial
    /// event.
    pub partial_results: Vec<String>,
    /// Last reported volume metric. Informational only.
    pub pitch: f32,
    /// Last error description; empty means no error since the last reset.
    pub error: String,
    /// Set when the backend signals session completion.
    pub end: CompletionMark,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to the empty baseline, `end` included.
    ///
    /// Runs at the start of every listening session, never at stop, so the
    /// previous transcript stays visible until a new session begins.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// The authoritative display transcript: the most confident final
    /// candidate, once one exists.
    pub fn transcript(&self) -> Option<&str> {
        self.results.first().map(String::as_str)
    }

    /// Current phase.
    ///
    /// Eventually consistent with `stop()`: the transition back to idle
    /// happens when the backend's end or error event arrives, not when the
    /// stop request is issued.
    pub fn phase(&self) -> SessionPhase {
        if self.started {
            SessionPhase::Listening
        } else {
            SessionPhase::Idle
        }
    }

    pub fn has_error(&self) -> bool {
        !self.error.is_empty()
    }

    /// Fold one backend event into the record, returning the side effects
    /// the controller must perform. Applied identically for both backends.
    pub fn fold(&mut self, event: BackendEvent) -> Vec<FoldEffect> {
        match event {
            BackendEvent::Started => {
                self.started = true;
                vec![FoldEffect::PulseStarted]
            }
            BackendEvent::Recognized => {
                self.recognized = RecognitionMark::Confirmed;
                Vec::new()
            }
            BackendEvent::PartialResults(candidates) => {
                self.partial_results = candidates;
                Vec::new()
            }
            BackendEvent::Results(candidates) => {
                self.results = candidates;
                match self.results.first() {
                    Some(best) => vec![FoldEffect::TranscriptPublished(best.clone())],
                    None => Vec::new(),
                }
            }
            BackendEvent::Ended => {
                self.end = CompletionMark::Ended;
                self.started = false;
                vec![FoldEffect::PulseStopped]
            }
            BackendEvent::Error(description) => {
                self.error = description.clone();
                self.started = false;
                vec![FoldEffect::PulseStopped, FoldEffect::AlertRaised(description)]
            }
            BackendEvent::VolumeChanged(level) => {
                self.pitch = level;
                Vec::new()
            }
        }
    }
}
