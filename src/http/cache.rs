//! HTTP cache validation module
//!
//! `ETag` generation plus `Last-Modified` / `If-Modified-Since` handling.

use chrono::{DateTime, Utc};
use std::time::{SystemTime, UNIX_EPOCH};

/// Generate a quoted `ETag` from file metadata, e.g. `"5f3a1c2b0-1a2b"`
///
/// Built from modification time and length so no file content is read.
pub fn generate_etag(len: u64, modified: Option<SystemTime>) -> String {
    let mtime = modified
        .and_then(|m| m.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_nanos());
    format!("\"{mtime:x}-{len:x}\"")
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Accepts a list of tags separated by commas, and `*`.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag
            .split(',')
            .any(|e| e.trim() == etag || e.trim() == "*")
    })
}

/// Format a timestamp as an IMF-fixdate (`Sun, 06 Nov 1994 08:49:37 GMT`)
pub fn format_http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

/// True when the client's copy is at least as new as `modified`
///
/// Compared at one-second resolution, the precision of HTTP dates.
pub fn not_modified_since(if_modified_since: Option<&str>, modified: SystemTime) -> bool {
    let Some(since) = if_modified_since.and_then(parse_http_date) else {
        return false;
    };
    since.timestamp() >= DateTime::<Utc>::from(modified).timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_generate_etag() {
        let modified = SystemTime::UNIX_EPOCH + Duration::from_secs(784_111_777);
        let etag = generate_etag(11, Some(modified));
        assert!(etag.starts_with('"'));
        assert!(etag.ends_with('"'));
        assert_eq!(etag, generate_etag(11, Some(modified)));
        assert_ne!(etag, generate_etag(12, Some(modified)));
        assert_ne!(
            etag,
            generate_etag(11, Some(modified + Duration::from_millis(1)))
        );
        assert_eq!(generate_etag(0, None), "\"0-0\"");
    }

    #[test]
    fn test_check_etag_match() {
        let etag = "\"abc123\"";
        assert!(check_etag_match(Some("\"abc123\""), etag));
        assert!(check_etag_match(Some("\"xyz\", \"abc123\""), etag));
        assert!(check_etag_match(Some("*"), etag));
        assert!(!check_etag_match(Some("\"different\""), etag));
        assert!(!check_etag_match(None, etag));
    }

    #[test]
    fn test_http_date_round_trip() {
        let time = SystemTime::UNIX_EPOCH + Duration::from_secs(784_111_777);
        let formatted = format_http_date(time);
        assert_eq!(formatted, "Sun, 06 Nov 1994 08:49:37 GMT");
        assert_eq!(parse_http_date(&formatted).unwrap().timestamp(), 784_111_777);
    }

    #[test]
    fn test_not_modified_since() {
        let modified = SystemTime::UNIX_EPOCH + Duration::from_millis(784_111_777_400);
        assert!(not_modified_since(
            Some("Sun, 06 Nov 1994 08:49:37 GMT"),
            modified
        ));
        assert!(!not_modified_since(
            Some("Sun, 06 Nov 1994 08:49:36 GMT"),
            modified
        ));
        assert!(!not_modified_since(Some("yesterday"), modified));
        assert!(!not_modified_since(None, modified));
    }
}
