//! Native speech backend adapter
//!
//! Wraps the platform speech service, mapping its seven callbacks
//! one-to-one onto the controller's logical events. Payloads pass through
//! untouched except for type normalisation: the structured platform error
//! becomes a description string and candidate lists are capped at the
//! configured maximum.

use anyhow::Result;

use super::{cap_candidates, BackendEvent, EventSink};

/// Structured error reported by the platform speech service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeSpeechError {
    pub code: i32,
    pub message: String,
}

impl std::fmt::Display for NativeSpeechError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

/// Callbacks the platform speech service invokes.
///
/// One method per platform event. The adapter installs an implementation
/// that forwards each callback onto the controller's event channel.
pub trait NativeSpeechListener: Send {
    fn on_speech_start(&mut self);
    fn on_speech_recognized(&mut self);
    fn on_speech_end(&mut self);
    fn on_speech_error(&mut self, error: NativeSpeechError);
    fn on_speech_results(&mut self, candidates: Vec<String>);
    fn on_speech_partial_results(&mut self, candidates: Vec<String>);
    fn on_speech_volume_changed(&mut self, level: f32);
}

/// Host binding to the platform speech service.
pub trait NativeSpeechService: Send {
    /// Install the listener receiving the service's callbacks. At most one
    /// listener is registered at a time.
    fn register_listener(&mut self, listener: Box<dyn NativeSpeechListener>);

    /// Begin a listening session for the given locale, e.g. "en-US".
    fn start_listening(&mut self, locale: &str) -> Result<()>;

    /// Request the current listening session to end. Must be a no-op when
    /// no session is active.
    fn stop_listening(&mut self) -> Result<()>;

    /// Remove the registered listener.
    fn clear_listener(&mut self);

    /// Release the underlying platform handle. Called once, at teardown.
    fn destroy(&mut self);
}

/// Forwards each platform callback onto the event channel, one-to-one.
struct ChannelListener {
    sink: EventSink,
    max_candidates: usize,
}

impl NativeSpeechListener for ChannelListener {
    fn on_speech_start(&mut self) {
        self.sink.emit(BackendEvent::Started);
    }

    fn on_speech_recognized(&mut self) {
        self.sink.emit(BackendEvent::Recognized);
    }

    fn on_speech_end(&mut self) {
        self.sink.emit(BackendEvent::Ended);
    }

    fn on_speech_error(&mut self, error: NativeSpeechError) {
        self.sink.emit(BackendEvent::Error(error.to_string()));
    }

    fn on_speech_results(&mut self, candidates: Vec<String>) {
        self.sink
            .emit(BackendEvent::Results(cap_candidates(candidates, self.max_candidates)));
    }

    fn on_speech_partial_results(&mut self, candidates: Vec<String>) {
        self.sink.emit(BackendEvent::PartialResults(cap_candidates(
            candidates,
            self.max_candidates,
        )));
    }

    fn on_speech_volume_changed(&mut self, level: f32) {
        self.sink.emit(BackendEvent::VolumeChanged(level));
    }
}

/// Native backend adapter.
///
/// Owns the platform service handle for the controller's lifetime. Dropping
/// the adapter clears the registered listener and destroys the handle.
pub struct NativeAdapter {
    service: Box<dyn NativeSpeechService>,
    locale: String,
}

impl NativeAdapter {
    pub fn new(
        mut service: Box<dyn NativeSpeechService>,
        sink: EventSink,
        locale: impl Into<String>,
        max_candidates: usize,
    ) -> Self {
        service.register_listener(Box::new(ChannelListener {
            sink,
            max_candidates,
        }));
        Self {
            service,
            locale: locale.into(),
        }
    }

    pub fn start(&mut self) -> Result<()> {
        self.service.start_listening(&self.locale)
    }

    pub fn stop(&mut self) -> Result<()> {
        self.service.stop_listening()
    }
}

impl Drop for NativeAdapter {
    fn drop(&mut self) {
        self.service.clear_listener();
        self.service.destroy();
        tracing::debug!("native speech service released");
    }
}
