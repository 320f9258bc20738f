use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

pub mod health;
pub mod ranking;
pub mod requests;
pub mod session;
pub mod sse;

fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}

/// Milliseconds since the Unix epoch, the units clients use for countdown anchors.
fn epoch_ms(time: SystemTime) -> u64 {
    time.duration_since(SystemTime::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
