//! Session error taxonomy

use thiserror::Error;

/// Errors surfaced by the voice session controller.
///
/// None of these are fatal: every variant returns control to an interactive
/// idle state and the user may act again.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No speech backend is available on the runtime platform. Detected once
    /// at initialisation and terminal for the controller's lifetime.
    #[error("speech recognition is not available on this device")]
    Unsupported,

    /// The active backend rejected the start request, e.g. missing
    /// microphone permission. The session record stays at its reset
    /// baseline and the caller may retry freely.
    #[error("could not start speech recognition: {0}")]
    StartFailed(String),

    /// The active backend reported an error mid-session. The session
    /// returns to idle; there is no automatic retry.
    #[error("speech recognition failed: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_message() {
        assert_eq!(
            SessionError::Unsupported.to_string(),
            "speech recognition is not available on this device"
        );
    }

    #[test]
    fn test_start_failed_carries_reason() {
        let err = SessionError::StartFailed("microphone permission missing".to_string());
        assert_eq!(
            err.to_string(),
            "could not start speech recognition: microphone permission missing"
        );
    }

    #[test]
    fn test_backend_carries_description() {
        let err = SessionError::Backend("no match (code 7)".to_string());
        assert_eq!(err.to_string(), "speech recognition failed: no match (code 7)");
    }
}
