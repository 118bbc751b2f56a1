//! Conditional request module
//!
//! `Last-Modified` generation and `If-Modified-Since` evaluation.

use chrono::{DateTime, NaiveDateTime, Utc};
use std::time::SystemTime;

/// IMF-fixdate layout used by HTTP date headers
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Format a timestamp as an HTTP date, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
pub fn format_http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format(HTTP_DATE_FORMAT)
        .to_string()
}

/// Parse an HTTP date (IMF-fixdate only)
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value.trim(), HTTP_DATE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Check whether the client's copy is still current
///
/// HTTP dates carry whole seconds, so the modification time is compared
/// at second precision. A missing or unparseable header never matches.
pub fn is_not_modified(if_modified_since: Option<&str>, modified: SystemTime) -> bool {
    let Some(since) = if_modified_since.and_then(parse_http_date) else {
        return false;
    };
    DateTime::<Utc>::from(modified).timestamp() <= since.timestamp()
}
