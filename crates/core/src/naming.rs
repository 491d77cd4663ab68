//! Upload filename handling.
//!
//! Client-supplied names are reduced to a safe ASCII subset before they
//! touch the filesystem, and name collisions inside a performance directory
//! are resolved by appending `_1`, `_2`, ... before the extension.

/// Give up looking for a free name after this many suffixes.
pub const MAX_COLLISION_SUFFIX: u32 = 10_000;

/// Reduce a client-supplied filename to `[A-Za-z0-9._-]`.
///
/// Path components are discarded, whitespace runs become a single `_`, and
/// leading/trailing dots and underscores are stripped so the result can
/// never be hidden or escape its directory. Returns `None` if nothing
/// usable remains.
///
/// # Examples
///
/// ```
/// use perfman_core::naming::sanitize_filename;
///
/// assert_eq!(sanitize_filename("My Song.mp3").as_deref(), Some("My_Song.mp3"));
/// assert_eq!(sanitize_filename("../../etc/passwd").as_deref(), Some("passwd"));
/// assert_eq!(sanitize_filename("..."), None);
/// ```
pub fn sanitize_filename(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);

    let joined = base.split_whitespace().collect::<Vec<_>>().join("_");
    let filtered: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    let trimmed = filtered.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Split `filename` into stem and extension (extension includes the dot).
fn split_extension(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(idx) if idx > 0 => filename.split_at(idx),
        _ => (filename, ""),
    }
}

/// The `attempt`-th candidate name for `filename`.
///
/// Attempt `0` is the name itself; attempt `n` inserts `_n` before the
/// extension.
pub fn collision_candidate(filename: &str, attempt: u32) -> String {
    if attempt == 0 {
        return filename.to_string();
    }
    let (stem, ext) = split_extension(filename);
    format!("{stem}_{attempt}{ext}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
