//! `Range: bytes=...` handling for media streaming.
//!
//! Only single ranges are supported. A header that cannot be parsed is
//! ignored and the whole file is served, which is what browsers expect
//! from a server without multi-range support.

/// An inclusive byte range within a file of known size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered (ranges are never empty).
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` header value for this range.
    pub fn content_range(&self, file_size: u64) -> String {
        format!("bytes {}-{}/{file_size}", self.start, self.end)
    }
}

/// What a request's Range header resolves to against a concrete file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeRequest {
    /// No (usable) Range header; send the whole file with 200.
    Full,
    /// Send the given slice with 206.
    Partial(ByteRange),
    /// Respond 416 with `Content-Range: bytes */size`.
    Unsatisfiable,
}

/// A syntactically valid single-range spec before it is bound to a size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RangeSpec {
    /// `bytes=START-` or `bytes=START-END`
    From { start: u64, end: Option<u64> },
    /// `bytes=-N` (last N bytes)
    Suffix(u64),
}

fn parse_range_spec(header: &str) -> Option<RangeSpec> {
    let spec = header.trim().strip_prefix("bytes=")?;
    if spec.contains(',') {
        return None;
    }
    let (start, end) = spec.split_once('-')?;
    let (start, end) = (start.trim(), end.trim());

    if start.is_empty() {
        return end.parse().ok().map(RangeSpec::Suffix);
    }
    let start = start.parse().ok()?;
    let end = if end.is_empty() {
        None
    } else {
        Some(end.parse().ok()?)
    };
    Some(RangeSpec::From { start, end })
}

/// Resolve an optional Range header value against `file_size`.
///
/// Open-ended ranges (`bytes=START-`) are capped at `max_chunk` bytes so a
/// single response never streams an entire large file; explicit ends are
/// clamped to the last byte.
pub fn resolve_range(header: Option<&str>, file_size: u64, max_chunk: u64) -> RangeRequest {
    let Some(spec) = header.and_then(parse_range_spec) else {
        return RangeRequest::Full;
    };
    if file_size == 0 {
        return RangeRequest::Unsatisfiable;
    }
    let last = file_size - 1;

    let range = match spec {
        RangeSpec::From { start, end } => {
            let end = match end {
                Some(end) => end.min(last),
                None => start.saturating_add(max_chunk.max(1) - 1).min(last),
            };
            ByteRange { start, end }
        }
        RangeSpec::Suffix(0) => return RangeRequest::Unsatisfiable,
        RangeSpec::Suffix(n) => ByteRange {
            start: file_size.saturating_sub(n),
            end: last,
        },
    };

    if range.start > last || range.start > range.end {
        RangeRequest::Unsatisfiable
    } else {
        RangeRequest::Partial(range)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
