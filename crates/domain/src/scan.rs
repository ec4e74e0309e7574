//! Scan metadata exposed to the presentation layer.

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// Snapshot of the scanner's schedule and mutual-exclusion flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanState {
    /// Whether the periodic timer is running.
    pub enabled: bool,
    pub interval_seconds: u64,
    /// Time of the last detection call that returned an answer.
    pub last_scan_at: Option<Timestamp>,
    /// Messages inspected by the last successful detection call.
    pub emails_checked: u32,
    /// A scan or a workflow run is in progress.
    pub busy: bool,
}

impl ScanState {
    #[must_use]
    pub fn stopped(interval_seconds: u64) -> Self {
        Self {
            enabled: false,
            interval_seconds,
            last_scan_at: None,
            emails_checked: 0,
            busy: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_start_disabled_and_idle() {
        let state = ScanState::stopped(30);
        assert!(!state.enabled);
        assert!(!state.busy);
        assert_eq!(state.interval_seconds, 30);
        assert!(state.last_scan_at.is_none());
    }
}
