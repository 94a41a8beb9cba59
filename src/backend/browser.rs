//! Browser speech backend adapter
//!
//! The browser recognizer reports recognition through a single result
//! callback carrying a growing entry list, each entry flagged final or
//! interim, together with the index recognition resumed from. The adapter
//! re-expresses each batch in the controller's separate final/partial
//! event vocabulary; lifecycle signals map straight through. The browser
//! recognizer has no distinct speech-detected signal and no volume metric,
//! so those events are simply never emitted from this adapter.

use anyhow::Result;

use super::{BackendEvent, EventSink};

/// One entry of a browser result list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserResultEntry {
    pub transcript: String,
    /// Whether the recognizer has committed to this transcript.
    pub is_final: bool,
}

impl BrowserResultEntry {
    pub fn interim(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: false,
        }
    }

    pub fn finalised(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: true,
        }
    }
}

/// Payload of one result callback invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserResultBatch {
    /// Index of the first entry not yet reported in an earlier invocation.
    pub resume_index: usize,
    /// The full growing result list.
    pub entries: Vec<BrowserResultEntry>,
}

/// Lifecycle and recognition signals from the browser recognizer.
#[derive(Debug, Clone, PartialEq)]
pub enum BrowserSignal {
    Start,
    Result(BrowserResultBatch),
    Error(String),
    End,
}

/// Host binding to the browser speech capability.
///
/// When the platform offers no browser recognizer, no service is
/// constructed and the controller falls back to disabled.
pub trait BrowserSpeechService: Send {
    /// Install the signal handler. At most one handler is subscribed at a
    /// time.
    fn subscribe(&mut self, handler: Box<dyn FnMut(BrowserSignal) + Send>);

    /// Begin a continuous listening session.
    fn start(&mut self) -> Result<()>;

    /// Request the current listening session to end. Must be a no-op when
    /// no session is active.
    fn stop(&mut self) -> Result<()>;
}

/// Split the newly-available entry range into accumulated final and interim
/// transcripts. Entries before `resume_index` were already reported by an
/// earlier invocation and are skipped.
fn partition_batch(batch: &BrowserResultBatch) -> (Option<String>, Option<String>) {
    let mut finalised = String::new();
    let mut interim = String::new();

    for entry in batch.entries.iter().skip(batch.resume_index) {
        if entry.is_final {
            finalised.push_str(&entry.transcript);
        } else {
            interim.push_str(&entry.transcript);
        }
    }

    (
        (!finalised.is_empty()).then_some(finalised),
        (!interim.is_empty()).then_some(interim),
    )
}

/// Browser backend adapter.
pub struct BrowserAdapter {
    service: Box<dyn BrowserSpeechService>,
}

impl BrowserAdapter {
    pub fn new(mut service: Box<dyn BrowserSpeechService>, sink: EventSink) -> Self {
        service.subscribe(Box::new(move |signal| match signal {
            BrowserSignal::Start => sink.emit(BackendEvent::Started),
            BrowserSignal::Result(batch) => {
                let (finalised, interim) = partition_batch(&batch);
                // Both events may fire from the same invocation.
                if let Some(text) = finalised {
                    sink.emit(BackendEvent::Results(vec![text]));
                }
                if let Some(text) = interim {
                    sink.emit(BackendEvent::PartialResults(vec![text]));
                }
            }
            BrowserSignal::Error(description) => sink.emit(BackendEvent::Error(description)),
            BrowserSignal::End => sink.emit(BackendEvent::Ended),
        }));
        Self { service }
    }

    pub fn start(&mut self) -> Result<()> {
        self.service.start()
    }

    pub fn stop(&mut self) -> Result<()> {
        self.service.stop()
    }
}
