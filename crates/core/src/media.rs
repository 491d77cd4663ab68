//! Upload allow-lists and content types for event media.
//!
//! Audio tracks and cover images are accepted by file extension only; the
//! HTTP layer rejects anything outside these lists before touching disk.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Extensions accepted for performance tracks.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "mp4", "aac", "m4a", "wav", "flac"];

/// Extensions accepted for event cover images.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Stem used for the stored cover image (`cover.<ext>`).
pub const COVER_IMAGE_STEM: &str = "cover";

// ---------------------------------------------------------------------------
// Extension checks
// ---------------------------------------------------------------------------

/// Lowercased extension of `filename`, if it has one.
pub fn extension_of(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

fn validate_extension(
    filename: &str,
    allowed: &[&str],
    kind: &str,
) -> Result<String, CoreError> {
    match extension_of(filename) {
        Some(ext) if allowed.contains(&ext.as_str()) => Ok(ext),
        Some(ext) => Err(CoreError::Validation(format!(
            "Unsupported {kind} format '.{ext}'. Supported: {}",
            allowed.join(", ")
        ))),
        None => Err(CoreError::Validation(format!(
            "File '{filename}' has no extension. Supported {kind} formats: {}",
            allowed.join(", ")
        ))),
    }
}

/// Validate an audio upload name, returning its lowercased extension.
pub fn validate_audio_filename(filename: &str) -> Result<String, CoreError> {
    validate_extension(filename, AUDIO_EXTENSIONS, "audio")
}

/// Validate a cover image upload name, returning its lowercased extension.
pub fn validate_image_filename(filename: &str) -> Result<String, CoreError> {
    validate_extension(filename, IMAGE_EXTENSIONS, "image")
}

/// File name under which a cover image with extension `ext` is stored.
pub fn cover_filename(ext: &str) -> String {
    format!("{COVER_IMAGE_STEM}.{ext}")
}

/// Guess a Content-Type from a file extension.
pub fn content_type_for(filename: &str) -> &'static str {
    match extension_of(filename).as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("mp4") => "audio/mp4",
        Some("m4a") => "audio/mp4",
        Some("aac") => "audio/aac",
        Some("wav") => "audio/wav",
        Some("flac") => "audio/flac",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
