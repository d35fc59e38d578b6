//! Display coercions for times and timezone offsets.
//!
//! All clock times are rendered in the host's local timezone, not the
//! airport's. That is a documented limitation of the tool, not a bug.

use chrono::{DateTime, Local};

/// Epoch seconds to `HH:MM` local time, `-` when absent.
pub fn short_time(ts: Option<i64>) -> String {
    match ts.and_then(|t| DateTime::from_timestamp(t, 0)) {
        Some(dt) => dt.with_timezone(&Local).format("%H:%M").to_string(),
        None => "-".to_string(),
    }
}

/// Epoch seconds to `YYYY-MM-DD HH:MM` local time, `-` when absent.
/// Used for the DirectFlights scheduled column, where the date matters.
pub fn long_time(ts: Option<i64>) -> String {
    match ts.and_then(|t| DateTime::from_timestamp(t, 0)) {
        Some(dt) => dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        None => "-".to_string(),
    }
}

/// Signed offset in seconds to a `UTC±HHMM` string.
pub fn utc_offset(seconds: i64) -> String {
    let sign = if seconds < 0 { '-' } else { '+' };
    let secs = seconds.unsigned_abs();
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    format!("UTC{sign}{hours:02}{minutes:02}")
}
