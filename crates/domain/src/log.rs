//! Event log: the append-only narration of scans and workflow runs.
//!
//! The log is what an operator reads to follow a crisis response. Entries are
//! never edited or reordered; the only destructive operation is
//! [`EventLog::clear`], performed at the start of an explicit new scan cycle.
//! Sequence numbers keep growing across clears so they stay unique for the
//! whole session.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::time::{Timestamp, now_not_before};

/// Prefix used when the caller does not provide one.
pub const DEFAULT_PREFIX: &str = "$";

/// Classification of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogSeverity {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for LogSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// One line of narration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub sequence: u64,
    pub timestamp: Timestamp,
    pub severity: LogSeverity,
    pub prefix: String,
    pub message: String,
}

/// Append-only, timestamp-ordered log.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    entries: Vec<LogEntry>,
    next_sequence: u64,
    last_timestamp: Option<Timestamp>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line and return the stored entry.
    pub fn append(
        &mut self,
        severity: LogSeverity,
        message: impl Into<String>,
        prefix: Option<&str>,
    ) -> LogEntry {
        self.next_sequence += 1;
        let timestamp = now_not_before(self.last_timestamp);
        self.last_timestamp = Some(timestamp);

        let entry = LogEntry {
            sequence: self.next_sequence,
            timestamp,
            severity,
            prefix: prefix.unwrap_or(DEFAULT_PREFIX).to_string(),
            message: message.into(),
        };
        self.entries.push(entry.clone());
        entry
    }

    /// Entries in append order. Borrowing, so it can be re-read at any time.
    #[must_use]
    pub fn snapshot(&self) -> &[LogEntry] {
        &self.entries
    }

    /// The last `n` entries, in append order.
    #[must_use]
    pub fn tail(&self, n: usize) -> &[LogEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    /// Drop every entry. Sequence numbering continues where it left off.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
