//! Speech recognition backends
//!
//! Two structurally different recognizers unified under one event
//! vocabulary: the native platform speech service reports through seven
//! per-event callbacks, the browser recognizer through a single growing
//! result list. Each adapter translates its service's callbacks into
//! [`BackendEvent`]s and hands them to the controller through an
//! [`EventSink`]; downstream of backend selection nothing branches on the
//! platform again.

pub mod browser;
pub mod native;

pub use browser::{
    BrowserAdapter, BrowserResultBatch, BrowserResultEntry, BrowserSignal, BrowserSpeechService,
};
pub use native::{NativeAdapter, NativeSpeechError, NativeSpeechListener, NativeSpeechService};

use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};

/// Logical speech events shared by every backend.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    /// The backend began capturing audio.
    Started,
    /// The backend confirmed speech was detected. Only the native service
    /// distinguishes this from final results.
    Recognized,
    /// Finalised transcript candidates, most confident first.
    Results(Vec<String>),
    /// Interim transcript candidates, replaced wholesale on each emission.
    PartialResults(Vec<String>),
    /// Input volume metric, informational only.
    VolumeChanged(f32),
    /// The backend finished the listening session.
    Ended,
    /// The backend failed mid-session.
    Error(String),
}

/// Speech backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Platform speech service with per-event callbacks.
    Native,
    /// Browser continuous recognizer with a growing result list.
    Browser,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Native => "native",
            BackendKind::Browser => "browser",
        }
    }
}

/// Sending half of the adapter → controller event channel.
///
/// Adapter callbacks run inside platform code and must never panic, so
/// emission after the controller receiver is gone degrades to a logged
/// no-op.
#[derive(Clone)]
pub struct EventSink {
    tx: Sender<BackendEvent>,
}

impl EventSink {
    pub fn new(tx: Sender<BackendEvent>) -> Self {
        Self { tx }
    }

    pub fn emit(&self, event: BackendEvent) {
        if let Err(dropped) = self.tx.send(event) {
            tracing::warn!("speech event dropped, controller is gone: {:?}", dropped.0);
        }
    }
}

/// Cap a candidate list at the configured maximum. A zero maximum means
/// uncapped.
pub(crate) fn cap_candidates(mut candidates: Vec<String>, max: usize) -> Vec<String> {
    if max > 0 && candidates.len() > max {
        candidates.truncate(max);
    }
    candidates
}

/// Unified speech backend over the two adapters.
///
/// Exactly one variant is constructed per controller, fixed for its
/// lifetime.
pub enum SpeechBackend {
    Native(native::NativeAdapter),
    Browser(browser::BrowserAdapter),
}

impl SpeechBackend {
    /// Begin a listening session on the underlying service.
    pub fn start(&mut self) -> anyhow::Result<()> {
        match self {
            Self::Native(adapter) => adapter.start(),
            Self::Browser(adapter) => adapter.start(),
        }
    }

    /// Request the current listening session to end.
    pub fn stop(&mut self) -> anyhow::Result<()> {
        match self {
            Self::Native(adapter) => adapter.stop(),
            Self::Browser(adapter) => adapter.stop(),
        }
    }

    /// Get the backend type.
    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Native(_) => BackendKind::Native,
            Self::Browser(_) => BackendKind::Browser,
        }
    }
}
