//! Voice listening session
//!
//! Unifies two heterogeneous speech-recognition backends behind one
//! controller with a uniform start/stop contract and a single shared
//! session record.
//!
//! ## States
//!
//! The session operates as a two-state machine:
//!
//! 1. **IDLE** - No session active; the previous transcript stays visible
//! 2. **LISTENING** - The backend is capturing speech
//!
//! ## State Transitions
//!
//! ```text
//!             start event                  end / error event
//! ┌──────┐ ──────────────► ┌───────────┐ ──────────────────► ┌──────┐
//! │ IDLE │                 │ LISTENING │                     │ IDLE │
//! └──────┘                 └───────────┘                     └──────┘
//! ```
//!
//! `start()` and `stop()` are requests, not transitions: the machine only
//! moves when the corresponding backend event is folded. A caller reading
//! the record immediately after `stop()` may still observe a listening
//! session until the asynchronous end event resolves.
//!
//! ## Events
//!
//! Both backends are folded through the same seven-event vocabulary:
//! start, recognized, partial-results, final-results, end, error and
//! volume. The rules live in [`state::SessionState::fold`]; the controller
//! runs the returned effects (pulse animation, transcript publication,
//! alerts) against its collaborators.
//!
//! ## Usage
//!
//! 1. Bundle the host's speech bindings into
//!    [`crate::platform::PlatformServices`]
//! 2. Build the controller: `VoiceSessionController::initialize(...)`
//! 3. Call `start()` on the user's gesture; `stop()` on the toggle
//! 4. Fold pending events with `pump()` before each render, or dedicate a
//!    thread to `run_dispatcher()`
//! 5. Render from `snapshot()`
//! 6. Call `teardown()` when the screen goes away

pub mod controller;
pub mod state;

pub use controller::VoiceSessionController;
pub use state::{CompletionMark, FoldEffect, RecognitionMark, SessionPhase, SessionState};
