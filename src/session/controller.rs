//! Voice session controller
//!
//! Owns the session record, selects the speech backend once at
//! initialisation, and folds backend events into state. Adapters emit from
//! whatever thread the platform calls back on; all emission funnels
//! through one channel and this controller is the single folding consumer,
//! so the record keeps a single writer without any locking discipline
//! beyond its own guard.

use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver};
use parking_lot::{Mutex, RwLock};
use uuid::Uuid;

use crate::backend::{
    BackendEvent, BackendKind, BrowserAdapter, EventSink, NativeAdapter, SpeechBackend,
};
use crate::config::{self, Config};
use crate::error::SessionError;
use crate::feedback::{AlertSink, LogAlerts, LogPulse, PulseHandle};
use crate::platform::{PlatformServices, SpeechCapability};
use crate::session::state::{FoldEffect, SessionState};

/// Notice surfaced when no speech backend is available. Shown exactly once,
/// at initialisation.
const UNSUPPORTED_NOTICE: &str = "Speech recognition is not available on this device";

/// Voice session controller.
///
/// Presents a uniform start/stop contract over the two backend adapters and
/// owns the [`SessionState`] record the rendering layer snapshots.
pub struct VoiceSessionController {
    state: RwLock<SessionState>,
    /// `None` means disabled: no backend was available at initialisation,
    /// or the backend has been torn down.
    backend: Mutex<Option<SpeechBackend>>,
    events: Receiver<BackendEvent>,
    pulse: Arc<dyn PulseHandle>,
    alerts: Arc<dyn AlertSink>,
    pulse_enabled: bool,
    /// Current listening session id, for log correlation only.
    session_id: Mutex<Option<Uuid>>,
}

impl VoiceSessionController {
    /// Select the backend from the platform capability probe and build the
    /// controller. The choice is made once and never re-evaluated. With no
    /// capability the controller is disabled: the notice is surfaced here,
    /// exactly once, and every later [`start`](Self::start) fails with
    /// [`SessionError::Unsupported`] without touching any adapter.
    pub fn initialize(
        services: PlatformServices,
        pulse: Arc<dyn PulseHandle>,
        alerts: Arc<dyn AlertSink>,
    ) -> Self {
        let cfg = config::get_config();
        Self::with_config(&cfg, services, pulse, alerts)
    }

    /// Initialise with tracing-backed feedback collaborators.
    pub fn with_default_feedback(services: PlatformServices) -> Self {
        Self::initialize(services, Arc::new(LogPulse::new()), Arc::new(LogAlerts::new()))
    }

    /// Initialise from an explicit configuration instead of the persisted
    /// one.
    pub fn with_config(
        cfg: &Config,
        services: PlatformServices,
        pulse: Arc<dyn PulseHandle>,
        alerts: Arc<dyn AlertSink>,
    ) -> Self {
        let (tx, rx) = unbounded();
        let sink = EventSink::new(tx);

        let capability = services.capability();
        let PlatformServices { native, browser } = services;

        let backend = match capability {
            SpeechCapability::Native => native.map(|service| {
                SpeechBackend::Native(NativeAdapter::new(
                    service,
                    sink.clone(),
                    cfg.speech.locale.clone(),
                    cfg.speech.max_candidates,
                ))
            }),
            SpeechCapability::Browser => browser
                .map(|service| SpeechBackend::Browser(BrowserAdapter::new(service, sink.clone()))),
            SpeechCapability::Unavailable => None,
        };

        match &backend {
            Some(b) => tracing::info!(
                "voice session controller initialised with {} backend",
                b.kind().as_str()
            ),
            None => {
                tracing::warn!("no speech backend available, voice input disabled");
                alerts.alert(UNSUPPORTED_NOTICE);
            }
        }

        Self {
            state: RwLock::new(SessionState::new()),
            backend: Mutex::new(backend),
            events: rx,
            pulse,
            alerts,
            pulse_enabled: cfg.feedback.pulse_animation,
            session_id: Mutex::new(None),
        }
    }

    /// The active backend type, or `None` when disabled.
    pub fn backend_kind(&self) -> Option<BackendKind> {
        self.backend.lock().as_ref().map(|b| b.kind())
    }

    /// Whether a backend is available.
    pub fn is_enabled(&self) -> bool {
        self.backend.lock().is_some()
    }

    /// The id of the current listening session, once one has started.
    pub fn session_id(&self) -> Option<Uuid> {
        *self.session_id.lock()
    }

    /// Begin a listening session.
    ///
    /// Folds any events still queued from the previous session, resets the
    /// record to its empty baseline, then delegates to the active adapter.
    /// The reset stands even when the adapter rejects the start, so a
    /// failed start leaves the record renderable and the user may retry
    /// freely. Success only means the request was issued: the transition
    /// to listening is observed later, when the backend's start event is
    /// folded.
    pub fn start(&self) -> Result<(), SessionError> {
        let mut backend = self.backend.lock();
        let Some(backend) = backend.as_mut() else {
            return Err(SessionError::Unsupported);
        };

        // Stale events from the previous session must not leak past the
        // reset into the new one.
        self.pump();
        self.state.write().reset();

        let id = Uuid::new_v4();
        *self.session_id.lock() = Some(id);
        tracing::info!(session = %id, "starting listening session");

        if let Err(e) = backend.start() {
            let reason = e.to_string();
            tracing::error!(session = %id, "failed to start listening: {}", reason);
            if self.pulse_enabled {
                self.pulse.stop();
            }
            self.alerts.alert(&reason);
            return Err(SessionError::StartFailed(reason));
        }

        Ok(())
    }

    /// Request the current listening session to end.
    ///
    /// Best-effort: the user-facing toggle has already flipped by the time
    /// the request resolves, so adapter failures are logged, never
    /// surfaced. Safe to call with no session active, and a no-op when
    /// disabled. The record transitions back to idle only when the
    /// backend's end or error event arrives.
    pub fn stop(&self) {
        let mut backend = self.backend.lock();
        let Some(backend) = backend.as_mut() else {
            return;
        };

        if let Err(e) = backend.stop() {
            tracing::warn!("failed to stop listening session: {}", e);
        }
    }

    /// Drain and fold every queued backend event, returning how many were
    /// folded. Cooperative hosts call this before each render.
    pub fn pump(&self) -> usize {
        let mut folded = 0;
        while let Ok(event) = self.events.try_recv() {
            self.fold(event);
            folded += 1;
        }
        folded
    }

    /// Block on the event channel and fold until the backend is torn down.
    /// For hosts that dedicate a thread to the controller.
    pub fn run_dispatcher(&self) {
        while let Ok(event) = self.events.recv() {
            self.fold(event);
        }
        tracing::debug!("event channel closed, dispatcher exiting");
    }

    /// Tear down the active backend.
    ///
    /// Dropping the native adapter releases its registered callbacks and
    /// destroys the underlying handle; the browser adapter is simply
    /// dropped. Afterwards the controller behaves as disabled and a
    /// running dispatcher exits once the queue drains.
    pub fn teardown(&self) {
        if self.backend.lock().take().is_some() {
            tracing::info!("voice session backend released");
        }
    }

    /// Clone of the current session record for rendering.
    pub fn snapshot(&self) -> SessionState {
        self.state.read().clone()
    }

    fn fold(&self, event: BackendEvent) {
        let effects = self.state.write().fold(event);

        // Effects run after the write guard is released; collaborator
        // callbacks must never observe a held lock.
        for effect in effects {
            match effect {
                FoldEffect::PulseStarted => {
                    if self.pulse_enabled {
                        self.pulse.start();
                    }
                }
                FoldEffect::PulseStopped => {
                    if self.pulse_enabled {
                        self.pulse.stop();
                    }
                }
                FoldEffect::TranscriptPublished(text) => {
                    tracing::info!(transcript = %text, "final transcript published");
                }
                FoldEffect::AlertRaised(description) => {
                    let err = SessionError::Backend(description);
                    tracing::error!("{}", err);
                    self.alerts.alert(&err.to_string());
                }
            }
        }
    }
}
