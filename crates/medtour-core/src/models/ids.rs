//! ID and timestamp generation.

use chrono::{SecondsFormat, Utc};

/// Generate a prefixed unique ID, e.g. `case_3f2a...`.
pub fn new_id(prefix: &str) -> String {
    format!("{}_{}", prefix, uuid::Uuid::new_v4().simple())
}

/// Current time as RFC 3339 with fixed microsecond precision, so stored
/// timestamps also sort correctly as strings.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
