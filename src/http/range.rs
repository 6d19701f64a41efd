//! HTTP Range request parsing module
//!
//! Single `bytes=` ranges only (RFC 7233). Multi-range requests fall back to
//! the full file.

/// Inclusive byte range resolved against a known file length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub const fn len(self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` header value for this range
    pub fn content_range(self, total: u64) -> String {
        format!("bytes {}-{}/{total}", self.start, self.end)
    }
}

/// What the client asked for
#[derive(Debug, PartialEq, Eq)]
pub enum RangeOutcome {
    /// No usable Range header, send the whole file
    Full,
    /// Send only this slice (206)
    Partial(ByteRange),
    /// The range lies outside the file (416)
    Unsatisfiable,
}

/// Resolve a `Range` header against a file of `len` bytes
///
/// Accepted forms: `bytes=a-b`, `bytes=a-` and `bytes=-n`.
///
/// ```
/// use project_fileserver::http::range::{parse_byte_range, ByteRange, RangeOutcome};
///
/// assert_eq!(
///     parse_byte_range(Some("bytes=0-9"), 100),
///     RangeOutcome::Partial(ByteRange { start: 0, end: 9 })
/// );
/// assert_eq!(parse_byte_range(None, 100), RangeOutcome::Full);
/// ```
pub fn parse_byte_range(header: Option<&str>, len: u64) -> RangeOutcome {
    let Some(ranges) = header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return RangeOutcome::Full;
    };
    if ranges.contains(',') {
        return RangeOutcome::Full;
    }
    let Some((first, last)) = ranges.split_once('-') else {
        return RangeOutcome::Full;
    };
    let (first, last) = (first.trim(), last.trim());

    if first.is_empty() {
        return suffix_range(last, len);
    }

    let Ok(start) = first.parse::<u64>() else {
        return RangeOutcome::Full;
    };
    if start >= len {
        return RangeOutcome::Unsatisfiable;
    }

    let end = if last.is_empty() {
        len - 1
    } else {
        match last.parse::<u64>() {
            Ok(end) if end < start => return RangeOutcome::Unsatisfiable,
            Ok(end) => end.min(len - 1),
            Err(_) => return RangeOutcome::Full,
        }
    };

    RangeOutcome::Partial(ByteRange { start, end })
}

// "-n": the last n bytes
fn suffix_range(count: &str, len: u64) -> RangeOutcome {
    let Ok(count) = count.parse::<u64>() else {
        return RangeOutcome::Full;
    };
    if count == 0 || len == 0 {
        return RangeOutcome::Unsatisfiable;
    }
    RangeOutcome::Partial(ByteRange {
        start: len.saturating_sub(count),
        end: len - 1,
    })
}
