//! Platform speech capability probe
//!
//! The host wires whichever speech bindings exist on the runtime platform
//! into a [`PlatformServices`] bundle. The controller probes the bundle
//! exactly once at initialisation; the choice is never re-evaluated.

use serde::{Deserialize, Serialize};

use crate::backend::{BrowserSpeechService, NativeSpeechService};

/// Which speech capability the runtime platform offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeechCapability {
    /// A native platform speech service is present.
    Native,
    /// Only the browser recognizer is present.
    Browser,
    /// Neither backend is available; voice input is disabled.
    Unavailable,
}

impl SpeechCapability {
    /// Returns a human-readable description of the capability.
    pub fn description(&self) -> &'static str {
        match self {
            SpeechCapability::Native => "native speech service",
            SpeechCapability::Browser => "browser speech recognition",
            SpeechCapability::Unavailable => "no speech recognition available",
        }
    }
}

/// Host-bound speech services.
///
/// At most one of the bundled services becomes the active backend; a native
/// service takes precedence over the browser recognizer.
#[derive(Default)]
pub struct PlatformServices {
    /// Native platform speech module, when the platform provides one.
    pub native: Option<Box<dyn NativeSpeechService>>,
    /// Browser speech recognizer, when the platform provides one.
    pub browser: Option<Box<dyn BrowserSpeechService>>,
}

impl PlatformServices {
    /// A bundle with no capability at all. The controller built from this
    /// is permanently disabled.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_native(service: Box<dyn NativeSpeechService>) -> Self {
        Self {
            native: Some(service),
            browser: None,
        }
    }

    pub fn with_browser(service: Box<dyn BrowserSpeechService>) -> Self {
        Self {
            native: None,
            browser: Some(service),
        }
    }

    /// The capability probe. Native wins over browser; neither present
    /// yields [`SpeechCapability::Unavailable`].
    pub fn capability(&self) -> SpeechCapability {
        if self.native.is_some() {
            SpeechCapability::Native
        } else if self.browser.is_some() {
            SpeechCapability::Browser
        } else {
            SpeechCapability::Unavailable
        }
    }
}
