//! End-to-end session tests for Seshat.
//!
//! Drives the voice session controller through scripted native and browser
//! speech services and checks the observable session record after each
//! scenario, covering both backends, the disabled path, and teardown.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use seshat::backend::{
    BackendKind, BrowserResultBatch, BrowserResultEntry, BrowserSignal, BrowserSpeechService,
    NativeSpeechError, NativeSpeechListener, NativeSpeechService,
};
use seshat::config::Config;
use seshat::error::SessionError;
use seshat::feedback::{AlertSink, PulseHandle};
use seshat::platform::PlatformServices;
use seshat::session::{CompletionMark, RecognitionMark, SessionPhase, VoiceSessionController};

// =============================================================================
// Scripted collaborators
// =============================================================================

#[derive(Default)]
struct RecordingAlerts {
    messages: Mutex<Vec<String>>,
}

impl RecordingAlerts {
    fn count(&self) -> usize {
        self.messages.lock().len()
    }
}

impl AlertSink for RecordingAlerts {
    fn alert(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}

#[derive(Default)]
struct CountingPulse {
    starts: AtomicUsize,
    stops: AtomicUsize,
}

impl PulseHandle for CountingPulse {
    fn start(&self) {
        self.starts.fetch_add(1, Ordering::SeqCst);
    }
    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

type NativeListenerSlot = Arc<Mutex<Option<Box<dyn NativeSpeechListener>>>>;

/// Scripted native speech service: hands its listener back to the test so
/// platform callbacks can be driven by hand, and records lifecycle calls.
struct ScriptedNative {
    listener: NativeListenerSlot,
    calls: Arc<Mutex<Vec<&'static str>>>,
    fail_start: bool,
}

impl ScriptedNative {
    fn new() -> (Self, NativeListenerSlot, Arc<Mutex<Vec<&'static str>>>) {
        let listener: NativeListenerSlot = Arc::new(Mutex::new(None));
        let calls = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                listener: listener.clone(),
                calls: calls.clone(),
                fail_start: false,
            },
            listener,
            calls,
        )
    }
}

impl NativeSpeechService for ScriptedNative {
    fn register_listener(&mut self, listener: Box<dyn NativeSpeechListener>) {
        *self.listener.lock() = Some(listener);
    }

    fn start_listening(&mut self, _locale: &str) -> anyhow::Result<()> {
        self.calls.lock().push("start");
        if self.fail_start {
            anyhow::bail!("microphone permission missing");
        }
        Ok(())
    }

    fn stop_listening(&mut self) -> anyhow::Result<()> {
        self.calls.lock().push("stop");
        Ok(())
    }

    fn clear_listener(&mut self) {
        *self.listener.lock() = None;
        self.calls.lock().push("clear");
    }

    fn destroy(&mut self) {
        self.calls.lock().push("destroy");
    }
}

fn drive<F: FnOnce(&mut dyn NativeSpeechListener)>(listener: &NativeListenerSlot, f: F) {
    let mut guard = listener.lock();
    f(guard.as_mut().expect("listener registered").as_mut());
}

type BrowserHandlerSlot = Arc<Mutex<Option<Box<dyn FnMut(BrowserSignal) + Send>>>>;

/// Scripted browser speech service mirroring the continuous recognizer.
struct ScriptedBrowser {
    handler: BrowserHandlerSlot,
}

impl ScriptedBrowser {
    fn new() -> (Self, BrowserHandlerSlot) {
        let handler: BrowserHandlerSlot = Arc::new(Mutex::new(None));
        (
            Self {
                handler: handler.clone(),
            },
            handler,
        )
    }
}

impl BrowserSpeechService for ScriptedBrowser {
    fn subscribe(&mut self, handler: Box<dyn FnMut(BrowserSignal) + Send>) {
        *self.handler.lock() = Some(handler);
    }

    fn start(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn stop(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

fn signal(handler: &BrowserHandlerSlot, s: BrowserSignal) {
    (handler.lock().as_mut().expect("handler subscribed"))(s);
}

fn controller_with(
    services: PlatformServices,
) -> (
    VoiceSessionController,
    Arc<CountingPulse>,
    Arc<RecordingAlerts>,
) {
    let pulse = Arc::new(CountingPulse::default());
    let alerts = Arc::new(RecordingAlerts::default());
    let controller = VoiceSessionController::with_config(
        &Config::default(),
        services,
        pulse.clone(),
        alerts.clone(),
    );
    (controller, pulse, alerts)
}

// =============================================================================
// Native backend scenarios
// =============================================================================

#[test]
fn test_native_session_full_scenario() {
    let (service, listener, _calls) = ScriptedNative::new();
    let (controller, pulse, alerts) =
        controller_with(PlatformServices::with_native(Box::new(service)));

    assert_eq!(controller.backend_kind(), Some(BackendKind::Native));

    controller.start().expect("start should succeed");
    drive(&listener, |l| l.on_speech_start());
    drive(&listener, |l| l.on_speech_recognized());
    drive(&listener, |l| {
        l.on_speech_partial_results(vec!["book a".to_string()])
    });
    drive(&listener, |l| {
        l.on_speech_partial_results(vec!["book a table".to_string()])
    });
    drive(&listener, |l| {
        l.on_speech_results(vec!["book a table please".to_string()])
    });
    drive(&listener, |l| l.on_speech_end());
    controller.pump();

    let state = controller.snapshot();
    assert!(!state.started);
    assert_eq!(state.phase(), SessionPhase::Idle);
    assert_eq!(state.recognized, RecognitionMark::Confirmed);
    assert_eq!(state.results, vec!["book a table please".to_string()]);
    // The last partial is retained until overwritten.
    assert_eq!(state.partial_results, vec!["book a table".to_string()]);
    assert_eq!(state.end, CompletionMark::Ended);
    assert_eq!(state.transcript(), Some("book a table please"));

    assert_eq!(pulse.starts.load(Ordering::SeqCst), 1);
    assert_eq!(pulse.stops.load(Ordering::SeqCst), 1);
    assert_eq!(alerts.count(), 0);
}

#[test]
fn test_native_volume_events_update_pitch() {
    let (service, listener, _calls) = ScriptedNative::new();
    let (controller, _pulse, _alerts) =
        controller_with(PlatformServices::with_native(Box::new(service)));

    controller.start().unwrap();
    drive(&listener, |l| l.on_speech_start());
    drive(&listener, |l| l.on_speech_volume_changed(0.2));
    drive(&listener, |l| l.on_speech_volume_changed(0.8));
    controller.pump();

    let state = controller.snapshot();
    assert_eq!(state.pitch, 0.8);
    assert!(state.started);
}

#[test]
fn test_native_error_terminates_session_with_alert() {
    let (service, listener, _calls) = ScriptedNative::new();
    let (controller, pulse, alerts) =
        controller_with(PlatformServices::with_native(Box::new(service)));

    controller.start().unwrap();
    drive(&listener, |l| l.on_speech_start());
    drive(&listener, |l| {
        l.on_speech_error(NativeSpeechError {
            code: 7,
            message: "no match".to_string(),
        })
    });
    controller.pump();

    let state = controller.snapshot();
    assert!(!state.started);
    assert_eq!(state.error, "no match (code 7)");
    // Error may terminate a session without end ever firing.
    assert_eq!(state.end, CompletionMark::Unset);

    assert_eq!(pulse.stops.load(Ordering::SeqCst), 1);
    assert_eq!(alerts.count(), 1);
}

#[test]
fn test_second_start_clears_previous_transcript() {
    let (service, listener, _calls) = ScriptedNative::new();
    let (controller, _pulse, _alerts) =
        controller_with(PlatformServices::with_native(Box::new(service)));

    controller.start().unwrap();
    drive(&listener, |l| l.on_speech_start());
    drive(&listener, |l| {
        l.on_speech_results(vec!["first question".to_string()])
    });
    drive(&listener, |l| l.on_speech_end());
    controller.pump();

    // The previous transcript stays visible until a new session begins.
    assert_eq!(controller.snapshot().transcript(), Some("first question"));

    controller.start().unwrap();
    let state = controller.snapshot();
    assert_eq!(state.transcript(), None);
    assert!(state.partial_results.is_empty());
    assert_eq!(state.recognized, RecognitionMark::Unset);
    assert_eq!(state.end, CompletionMark::Unset);
}

#[test]
fn test_start_failure_leaves_baseline_and_allows_retry() {
    let (mut service, _listener, calls) = ScriptedNative::new();
    service.fail_start = true;
    let (controller, _pulse, alerts) =
        controller_with(PlatformServices::with_native(Box::new(service)));

    let err = controller.start().unwrap_err();
    assert!(matches!(err, SessionError::StartFailed(_)));
    assert!(err.to_string().contains("microphone permission missing"));
    assert_eq!(alerts.count(), 1);

    let state = controller.snapshot();
    assert!(!state.started);
    assert!(!state.has_error());
    assert!(state.results.is_empty());

    // Retry reaches the adapter again.
    let _ = controller.start();
    assert_eq!(calls.lock().iter().filter(|&&c| c == "start").count(), 2);
}

#[test]
fn test_stop_is_eventually_consistent() {
    let (service, listener, calls) = ScriptedNative::new();
    let (controller, _pulse, _alerts) =
        controller_with(PlatformServices::with_native(Box::new(service)));

    controller.start().unwrap();
    drive(&listener, |l| l.on_speech_start());
    controller.pump();
    assert!(controller.snapshot().started);

    controller.stop();
    assert!(calls.lock().contains(&"stop"));
    // The record still reads as listening until the end event resolves.
    assert!(controller.snapshot().started);

    drive(&listener, |l| l.on_speech_end());
    controller.pump();
    assert!(!controller.snapshot().started);
}

#[test]
fn test_stop_without_active_session_is_safe() {
    let (service, _listener, _calls) = ScriptedNative::new();
    let (controller, _pulse, alerts) =
        controller_with(PlatformServices::with_native(Box::new(service)));

    controller.stop();
    controller.stop();
    assert_eq!(alerts.count(), 0);
}

#[test]
fn test_teardown_releases_native_service() {
    let (service, listener, calls) = ScriptedNative::new();
    let (controller, _pulse, _alerts) =
        controller_with(PlatformServices::with_native(Box::new(service)));

    controller.teardown();

    assert!(listener.lock().is_none());
    {
        let calls = calls.lock();
        assert_eq!(calls.iter().filter(|&&c| c == "clear").count(), 1);
        assert_eq!(calls.iter().filter(|&&c| c == "destroy").count(), 1);
    }
    assert!(matches!(controller.start(), Err(SessionError::Unsupported)));
}

// =============================================================================
// Browser backend scenarios
// =============================================================================

#[test]
fn test_browser_single_callback_yields_final_and_partial() {
    let (service, handler) = ScriptedBrowser::new();
    let (controller, _pulse, _alerts) =
        controller_with(PlatformServices::with_browser(Box::new(service)));

    assert_eq!(controller.backend_kind(), Some(BackendKind::Browser));

    controller.start().unwrap();
    signal(&handler, BrowserSignal::Start);
    signal(
        &handler,
        BrowserSignal::Result(BrowserResultBatch {
            resume_index: 0,
            entries: vec![
                BrowserResultEntry::finalised("hello"),
                BrowserResultEntry::interim("wor"),
            ],
        }),
    );
    controller.pump();

    let state = controller.snapshot();
    assert!(state.started);
    assert_eq!(state.results, vec!["hello".to_string()]);
    assert_eq!(state.partial_results, vec!["wor".to_string()]);
    // The browser recognizer never emits a distinct speech-detected signal.
    assert_eq!(state.recognized, RecognitionMark::Unset);
}

#[test]
fn test_browser_growing_result_list_across_callbacks() {
    let (service, handler) = ScriptedBrowser::new();
    let (controller, _pulse, _alerts) =
        controller_with(PlatformServices::with_browser(Box::new(service)));

    controller.start().unwrap();
    signal(&handler, BrowserSignal::Start);

    // First invocation: one interim entry.
    signal(
        &handler,
        BrowserSignal::Result(BrowserResultBatch {
            resume_index: 0,
            entries: vec![BrowserResultEntry::interim("what is")],
        }),
    );

    // Second invocation: the first entry finalised, a new interim after it.
    signal(
        &handler,
        BrowserSignal::Result(BrowserResultBatch {
            resume_index: 0,
            entries: vec![
                BrowserResultEntry::finalised("what is this "),
                BrowserResultEntry::interim("buil"),
            ],
        }),
    );

    // Third invocation resumes past the finalised entry.
    signal(
        &handler,
        BrowserSignal::Result(BrowserResultBatch {
            resume_index: 1,
            entries: vec![
                BrowserResultEntry::finalised("what is this "),
                BrowserResultEntry::finalised("building"),
            ],
        }),
    );
    signal(&handler, BrowserSignal::End);
    controller.pump();

    let state = controller.snapshot();
    assert!(!state.started);
    assert_eq!(state.results, vec!["building".to_string()]);
    assert_eq!(state.partial_results, vec!["buil".to_string()]);
    assert_eq!(state.end, CompletionMark::Ended);
}

#[test]
fn test_browser_error_surfaces_alert() {
    let (service, handler) = ScriptedBrowser::new();
    let (controller, pulse, alerts) =
        controller_with(PlatformServices::with_browser(Box::new(service)));

    controller.start().unwrap();
    signal(&handler, BrowserSignal::Start);
    signal(&handler, BrowserSignal::Error("not-allowed".to_string()));
    controller.pump();

    let state = controller.snapshot();
    assert!(!state.started);
    assert_eq!(state.error, "not-allowed");
    assert_eq!(pulse.stops.load(Ordering::SeqCst), 1);
    assert_eq!(alerts.count(), 1);
}

// =============================================================================
// Disabled path
// =============================================================================

#[test]
fn test_no_capability_disables_voice_input() {
    let (controller, pulse, alerts) = controller_with(PlatformServices::none());

    // The notice fires once, at initialisation.
    assert_eq!(alerts.count(), 1);
    assert!(!controller.is_enabled());

    // Every start fails with Unsupported and never re-alerts.
    for _ in 0..3 {
        assert!(matches!(controller.start(), Err(SessionError::Unsupported)));
    }
    assert_eq!(alerts.count(), 1);
    assert_eq!(pulse.starts.load(Ordering::SeqCst), 0);

    let state = controller.snapshot();
    assert!(!state.started);
    assert_eq!(state.phase(), SessionPhase::Idle);
}
