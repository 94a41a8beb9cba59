//! User-facing feedback collaborators
//!
//! The two fire-and-forget seams the session controller drives: the
//! listening pulse animation and the alert channel. Both are at-most-once
//! per triggering event and never queued.

use std::sync::atomic::{AtomicBool, Ordering};

/// Handle to the listening pulse animation shown while a session is active.
pub trait PulseHandle: Send + Sync {
    /// Begin the pulse. Called when the backend's start event arrives.
    fn start(&self);
    /// Stop the pulse. Called on end and on every error path.
    fn stop(&self);
}

/// Fire-and-forget user-facing alert channel.
///
/// Receives the unsupported-platform notice, start failures, backend errors
/// and image pick failures. Implementations must not block.
pub trait AlertSink: Send + Sync {
    fn alert(&self, message: &str);
}

/// Pulse handle that logs transitions.
///
/// Tracks whether the pulse is active so redundant start/stop calls
/// collapse into a single log line.
#[derive(Debug, Default)]
pub struct LogPulse {
    active: AtomicBool,
}

impl LogPulse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the pulse is currently running.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl PulseHandle for LogPulse {
    fn start(&self) {
        if !self.active.swap(true, Ordering::SeqCst) {
            tracing::debug!("listening pulse started");
        }
    }

    fn stop(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            tracing::debug!("listening pulse stopped");
        }
    }
}

/// Alert sink that logs each notice.
#[derive(Debug, Default)]
pub struct LogAlerts;

impl LogAlerts {
    pub fn new() -> Self {
        Self
    }
}

impl AlertSink for LogAlerts {
    fn alert(&self, message: &str) {
        tracing::warn!("user alert: {}", message);
    }
}

/// Pulse handle that does nothing, for hosts without a listening animation.
#[derive(Debug, Default)]
pub struct NoopPulse;

impl PulseHandle for NoopPulse {
    fn start(&self) {}
    fn stop(&self) {}
}
