use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// Render a fetched-at timestamp for writing: RFC 3339, always UTC.
pub fn format_fetched_at(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Parse a fetched-at timestamp as read from disk.
///
/// Accepts RFC 3339 with any offset, or a naive ISO-8601 datetime which is
/// taken to be UTC. Returns `None` for anything else; callers treat `None`
/// as stale.
pub fn parse_fetched_at(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    None
}
