//! In-process inbox acting as the crisis detector.

use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use serde::Serialize;

use crisiswatch_app::ports::CrisisDetector;
use crisiswatch_domain::crisis::{CrisisEvent, DetectionOutcome};
use crisiswatch_domain::error::DetectionError;

use crate::rules::{KeywordRule, RULES, analyze};

/// A message waiting in the virtual inbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InboxMessage {
    pub id: u64,
    pub sender: String,
    pub subject: String,
    pub body: String,
}

#[derive(Default)]
struct Mailbox {
    messages: Vec<InboxMessage>,
    processed: HashSet<u64>,
}

/// Inbox holding delivered messages and the ids already analyzed.
///
/// A check analyzes every unprocessed message, marks them all processed and
/// reports the most severe crisis among them.
pub struct VirtualInbox {
    rules: &'static [KeywordRule],
    mailbox: Mutex<Mailbox>,
    next_id: AtomicU64,
}

impl Default for VirtualInbox {
    fn default() -> Self {
        Self::new(RULES)
    }
}

impl VirtualInbox {
    #[must_use]
    pub fn new(rules: &'static [KeywordRule]) -> Self {
        Self {
            rules,
            mailbox: Mutex::new(Mailbox::default()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Inbox preloaded with a routine message and a resignation.
    #[must_use]
    pub fn with_demo_messages() -> Self {
        let inbox = Self::default();
        inbox.deliver(
            "Produce Co <orders@produce.example>",
            "Weekly invoice",
            "Please find this week's invoice attached.",
        );
        inbox.deliver(
            "Jane Doe <jane.doe@staff.example>",
            "Two weeks notice",
            "I have decided to resign from my position as barista.",
        );
        inbox
    }

    fn mailbox(&self) -> std::sync::MutexGuard<'_, Mailbox> {
        self.mailbox.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drop a new unread message into the inbox and return its id.
    pub fn deliver(
        &self,
        sender: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.mailbox().messages.push(InboxMessage {
            id,
            sender: sender.into(),
            subject: subject.into(),
            body: body.into(),
        });
        id
    }

    #[must_use]
    pub fn messages(&self) -> Vec<InboxMessage> {
        self.mailbox().messages.clone()
    }

    fn check(&self) -> DetectionOutcome {
        let mut mailbox = self.mailbox();
        let Mailbox {
            messages,
            processed,
        } = &mut *mailbox;

        let mut checked = 0_u32;
        let mut found: Option<CrisisEvent> = None;
        for message in &*messages {
            if !processed.insert(message.id) {
                continue;
            }
            checked += 1;
            let crisis = analyze(self.rules, &message.sender, &message.subject, &message.body);
            if let Some(crisis) = crisis {
                if found
                    .as_ref()
                    .is_none_or(|current| crisis.severity > current.severity)
                {
                    found = Some(crisis);
                }
            }
        }

        tracing::debug!(checked, detected = found.is_some(), "virtual inbox checked");
        match found {
            Some(crisis) => DetectionOutcome::detected(checked, crisis),
            None => DetectionOutcome::clear(checked),
        }
    }
}

impl CrisisDetector for VirtualInbox {
    fn check_for_crisis(
        &self,
    ) -> impl Future<Output = Result<DetectionOutcome, DetectionError>> + Send {
        let outcome = self.check();
        async move { Ok(outcome) }
    }

    fn reset_dedup_cache(&self) -> impl Future<Output = Result<(), DetectionError>> + Send {
        self.mailbox().processed.clear();
        async { Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_report_crisis_once_until_cache_reset() {
        let inbox = VirtualInbox::with_demo_messages();

        let first = inbox.check_for_crisis().await.unwrap();
        assert_eq!(first.emails_checked, 2);
        assert_eq!(first.crisis.unwrap().crisis_type, "Staff Resignation");

        let second = inbox.check_for_crisis().await.unwrap();
        assert_eq!(second, DetectionOutcome::clear(0));

        inbox.reset_dedup_cache().await.unwrap();
        let third = inbox.check_for_crisis().await.unwrap();
        assert!(third.is_detected());
    }

    #[tokio::test]
    async fn should_only_analyze_new_messages() {
        let inbox = VirtualInbox::default();
        inbox.deliver("a@b.c", "Lunch order", "Two sandwiches please");
        assert!(!inbox.check_for_crisis().await.unwrap().is_detected());

        inbox.deliver("kitchen@b.c", "Freezer malfunction", "");
        let outcome = inbox.check_for_crisis().await.unwrap();
        assert_eq!(outcome.emails_checked, 1);
        assert_eq!(outcome.crisis.unwrap().trigger_keyword, "malfunction");
    }

    #[tokio::test]
    async fn should_pick_most_severe_crisis_across_messages() {
        let inbox = VirtualInbox::default();
        inbox.deliver("guest@b.c", "Complaint about service", "");
        inbox.deliver("ops@b.c", "Health inspection tomorrow", "");
        let crisis = inbox.check_for_crisis().await.unwrap().crisis.unwrap();
        assert_eq!(crisis.crisis_type, "Health Inspection");
    }
}
