use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Current unix time in milliseconds, used to stamp history records
pub fn get_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_millis() as u64
}
