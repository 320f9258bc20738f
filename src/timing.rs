//! Anchor-based countdown arithmetic.
//!
//! Countdowns are never stored as decrementing counters. Every client (and
//! this server, when deriving `time_spent` for a submission) recomputes the
//! remaining time from the shared anchor timestamp, which keeps independent
//! devices in agreement despite clock drift, coalesced snapshots, and brief
//! disconnects.

use std::time::{Duration, SystemTime};

/// Time left on a question given the shared anchor and the question limit.
///
/// Saturates at zero once the window has elapsed; a `now` before the anchor
/// (skewed clock) reads as the full limit.
pub fn remaining(now: SystemTime, anchor: SystemTime, limit: Duration) -> Duration {
    match now.duration_since(anchor) {
        Ok(elapsed) => limit.saturating_sub(elapsed),
        Err(_) => limit,
    }
}

/// Milliseconds elapsed since the anchor, clamped to zero for skewed clocks.
pub fn elapsed_ms(now: SystemTime, anchor: SystemTime) -> u64 {
    now.duration_since(anchor)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

/// Anchor to install when resuming a paused question.
///
/// Shifts the anchor back by the time already consumed so the countdown
/// continues from the captured remaining duration instead of restarting at
/// the full limit.
pub fn resume_anchor(now: SystemTime, limit: Duration, remaining: Duration) -> SystemTime {
    now - limit.saturating_sub(remaining)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: Duration = Duration::from_secs(30);

    #[test]
    fn remaining_counts_down_from_the_anchor() {
        let anchor = SystemTime::UNIX_EPOCH;
        let now = anchor + Duration::from_secs(12);
        assert_eq!(remaining(now, anchor, LIMIT), Duration::from_secs(18));
    }

    #[test]
    fn remaining_saturates_at_zero() {
        let anchor = SystemTime::UNIX_EPOCH;
        let now = anchor + Duration::from_secs(45);
        assert_eq!(remaining(now, anchor, LIMIT), Duration::ZERO);
    }

    #[test]
    fn skewed_clock_reads_full_limit() {
        let anchor = SystemTime::UNIX_EPOCH + Duration::from_secs(10);
        let now = SystemTime::UNIX_EPOCH;
        assert_eq!(remaining(now, anchor, LIMIT), LIMIT);
        assert_eq!(elapsed_ms(now, anchor), 0);
    }

    #[test]
    fn pause_then_resume_preserves_remaining_time() {
        let anchor = SystemTime::UNIX_EPOCH;
        let paused_at = anchor + Duration::from_secs(10);
        let captured = remaining(paused_at, anchor, LIMIT);
        assert_eq!(captured, Duration::from_secs(20));

        // Resume five minutes later; the countdown picks up where it left off.
        let resumed_at = paused_at + Duration::from_secs(300);
        let new_anchor = resume_anchor(resumed_at, LIMIT, captured);
        assert_eq!(remaining(resumed_at, new_anchor, LIMIT), captured);

        let later = resumed_at + Duration::from_secs(5);
        assert_eq!(
            remaining(later, new_anchor, LIMIT),
            Duration::from_secs(15)
        );
    }
}
