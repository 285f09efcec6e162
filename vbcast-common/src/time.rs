//! Timestamp utilities

use chrono::{DateTime, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Convert milliseconds to duration
pub fn millis_to_duration(millis: u64) -> std::time::Duration {
    std::time::Duration::from_millis(millis)
}

/// Position as a fraction of the total duration
///
/// Returns None when the duration is unknown (zero).
pub fn fraction_of(position_ms: u64, duration_ms: u64) -> Option<f32> {
    if duration_ms == 0 {
        None
    } else {
        Some(position_ms as f32 / duration_ms as f32)
    }
}
