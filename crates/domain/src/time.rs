//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for log entries, step starts, scan times, etc.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Return `now()`, but never earlier than `floor`.
///
/// The wall clock may step backwards (NTP adjustments); callers that must keep
/// a non-decreasing order pass the last timestamp they handed out.
#[must_use]
pub fn now_not_before(floor: Option<Timestamp>) -> Timestamp {
    let ts = now();
    match floor {
        Some(floor) if floor > ts => floor,
        _ => ts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now();
        let ts = now();
        let after = Utc::now();
        assert!(ts >= before);
        assert!(ts <= after);
    }

    #[test]
    fn should_clamp_to_floor_when_clock_is_behind() {
        let future = now() + chrono::Duration::hours(1);
        assert_eq!(now_not_before(Some(future)), future);
    }

    #[test]
    fn should_return_current_time_when_floor_is_in_the_past() {
        let past = now() - chrono::Duration::hours(1);
        assert!(now_not_before(Some(past)) > past);
        assert!(now_not_before(None) <= now());
    }
}
