//! In-process log bus backed by a tokio broadcast channel.

use tokio::sync::broadcast;

use crisiswatch_domain::log::LogEntry;

/// Fans out freshly appended [`LogEntry`]s to live subscribers.
///
/// Publishing succeeds even when there are no active subscribers
/// (the entry is simply dropped). Slow subscribers lag and lose the oldest
/// entries; the session's event log stays authoritative.
#[derive(Debug, Clone)]
pub struct LogBus {
    sender: broadcast::Sender<LogEntry>,
}

impl LogBus {
    /// Create a new bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to entries published *after* this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }

    pub fn publish(&self, entry: LogEntry) {
        // Only fails when nobody listens.
        let _ = self.sender.send(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crisiswatch_domain::log::{EventLog, LogSeverity};

    fn entry(message: &str) -> LogEntry {
        EventLog::new().append(LogSeverity::Info, message, None)
    }

    #[tokio::test]
    async fn should_deliver_entry_to_multiple_subscribers() {
        let bus = LogBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(entry("hello"));

        assert_eq!(rx1.recv().await.unwrap().message, "hello");
        assert_eq!(rx2.recv().await.unwrap().message, "hello");
    }

    #[tokio::test]
    async fn should_not_deliver_entries_published_before_subscription() {
        let bus = LogBus::new(16);
        bus.publish(entry("early"));

        let mut rx = bus.subscribe();
        bus.publish(entry("late"));

        assert_eq!(rx.recv().await.unwrap().message, "late");
    }

    #[test]
    fn should_not_panic_when_no_subscribers() {
        let bus = LogBus::new(16);
        bus.publish(entry("nobody"));
    }
}
