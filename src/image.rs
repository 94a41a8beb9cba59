//! Image selection adapter
//!
//! Consumed by the rendering layer, not the session core. Pick failures
//! share the session's alert channel; a dismissed picker is an outcome,
//! never an error.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::feedback::AlertSink;

/// File extensions accepted as images.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "heic", "bmp"];

/// Errors from an image pick request.
#[derive(Debug, Error)]
pub enum ImagePickError {
    /// Photo library access was not granted.
    #[error("photo library access was denied")]
    PermissionDenied,

    /// The chosen file is not a supported image type.
    #[error("unsupported image type: .{0}")]
    UnsupportedType(String),

    /// The chosen file exceeds the configured size limit.
    #[error("image is too large: {actual} bytes (limit {limit})")]
    TooLarge { actual: u64, limit: u64 },

    /// The chosen file could not be read.
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),
}

/// A locally resolved image chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickedImage {
    pub path: PathBuf,
    pub file_name: String,
    pub byte_len: u64,
}

/// Outcome of a pick request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    Picked(PickedImage),
    /// The user dismissed the picker.
    Cancelled,
}

/// Host binding to the platform image picker.
pub trait ImagePicker: Send + Sync {
    fn pick(&self) -> Result<PickOutcome, ImagePickError>;
}

/// Validate a local path as a pickable image.
///
/// Checks the extension against [`SUPPORTED_EXTENSIONS`], reads the file
/// metadata and enforces the size limit. A zero limit means unlimited.
pub fn resolve_image(path: &Path, max_bytes: u64) -> Result<PickedImage, ImagePickError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ImagePickError::UnsupportedType(extension));
    }

    let metadata = fs::metadata(path)?;
    let byte_len = metadata.len();
    if max_bytes > 0 && byte_len > max_bytes {
        return Err(ImagePickError::TooLarge {
            actual: byte_len,
            limit: max_bytes,
        });
    }

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    Ok(PickedImage {
        path: path.to_path_buf(),
        file_name,
        byte_len,
    })
}

/// Picker over a fixed local path: the stand-in for the platform photo
/// library on hosts that resolve the file themselves.
pub struct PathImagePicker {
    path: PathBuf,
    max_bytes: u64,
}

impl PathImagePicker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let max_bytes = crate::config::get_config().image.max_bytes;
        Self {
            path: path.into(),
            max_bytes,
        }
    }

    pub fn with_limit(path: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self {
            path: path.into(),
            max_bytes,
        }
    }
}

impl ImagePicker for PathImagePicker {
    fn pick(&self) -> Result<PickOutcome, ImagePickError> {
        resolve_image(&self.path, self.max_bytes).map(PickOutcome::Picked)
    }
}

/// Route a pick failure into the shared alert channel.
pub fn surface_pick_error(alerts: &dyn AlertSink, error: &ImagePickError) {
    tracing::warn!("image pick failed: {}", error);
    alerts.alert(&error.to_string());
}
