//! Session root naming.

use chrono::{DateTime, SecondsFormat, Utc};
use url::Url;

/// Directory name for one run: `media-<host>-<timestamp>`.
///
/// The host keeps `[A-Za-z0-9.-]` (everything else becomes `_`); the timestamp
/// is the UTC ISO-8601 instant with `:` and `.` replaced by `-`.
#[must_use]
pub fn session_dir_name(page_url: &Url, now: DateTime<Utc>) -> String {
    let host: String = page_url
        .host_str()
        .unwrap_or("unknown")
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let timestamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("media-{host}-{timestamp}")
}
