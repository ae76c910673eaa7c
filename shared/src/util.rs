/// Current UTC timestamp in milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Current UTC timestamp in RFC 3339 form, for client-facing event payloads.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Short order reference for user-facing copy (last 6 characters of the id).
pub fn short_id(id: &str) -> &str {
    let n = id.len();
    if n > 6 { &id[n - 6..] } else { id }
}
