//! Seshat - voice question capture
//!
//! Library core for a voice-driven image Q&A flow: the user picks an image,
//! speaks a question, and the recognized transcript is rendered alongside
//! the image. This crate owns the voice session controller, the two speech
//! backend adapters it unifies, and the trait seams the host binds to
//! platform capabilities (speech services, image picker, pulse animation,
//! alerts). Rendering and layout belong to the host.

pub mod backend;
pub mod config;
pub mod error;
pub mod feedback;
pub mod image;
pub mod platform;
pub mod session;

/// Set up logging: stdout plus a file layer for debugging (local time for
/// readability). Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    use tracing_subscriber::prelude::*;

    /// Format timestamps using the system's local time via chrono
    struct LocalTimer;
    impl tracing_subscriber::fmt::time::FormatTime for LocalTimer {
        fn format_time(
            &self,
            w: &mut tracing_subscriber::fmt::format::Writer<'_>,
        ) -> std::fmt::Result {
            write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
        }
    }

    let log_dir = dirs::home_dir()
        .map(|h| h.join(".seshat").join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("/tmp"));
    let _ = std::fs::create_dir_all(&log_dir);
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("seshat-debug.log"))
        .ok();

    if let Some(file) = log_file {
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::sync::Mutex::new(file))
            .with_timer(LocalTimer)
            .with_ansi(false);
        let stdout_layer = tracing_subscriber::fmt::layer().with_timer(LocalTimer);
        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with(stdout_layer)
            .with(file_layer)
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt().with_timer(LocalTimer).try_init();
    }
}
