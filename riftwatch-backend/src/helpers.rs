use chrono::{SecondsFormat, Utc};

/// Current time as an ISO-8601 UTC timestamp with millisecond precision.
pub fn timestamp() -> String {
  Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Length of the configured API key, for diagnostics that must not echo it.
pub fn key_length(key: Option<&str>) -> usize {
  key.map(str::len).unwrap_or(0)
}
