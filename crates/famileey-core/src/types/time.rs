//! Server-assigned timestamps.

use chrono::Utc;

/// Current time as milliseconds since the Unix epoch.
///
/// Every stored `timestamp`, `createdAt`, and read-status value uses this
/// representation.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
