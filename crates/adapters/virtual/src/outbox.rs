//! In-process outbox acting as dispatcher and compliance recorder.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crisiswatch_app::ports::{ComplianceRecorder, ResponseDispatcher};
use crisiswatch_domain::crisis::CrisisEvent;
use crisiswatch_domain::error::{ComplianceUpdateError, DispatchError};

/// A response the outbox accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentResponse {
    pub recipient: String,
    pub subject: String,
    pub content: String,
}

/// A crisis outcome reported for compliance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplianceRecord {
    pub crisis_type: String,
    pub executed: Vec<String>,
}

#[derive(Default)]
struct Records {
    sent: Vec<SentResponse>,
    compliance: Vec<ComplianceRecord>,
}

/// Records every response and compliance report it receives.
///
/// [`Outbox::rejecting`] builds one that refuses deliveries, to exercise the
/// send-failure path.
#[derive(Default)]
pub struct Outbox {
    reject_with: Option<String>,
    records: Mutex<Records>,
}

impl Outbox {
    #[must_use]
    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            reject_with: Some(reason.into()),
            records: Mutex::default(),
        }
    }

    fn records(&self) -> MutexGuard<'_, Records> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn sent(&self) -> Vec<SentResponse> {
        self.records().sent.clone()
    }

    #[must_use]
    pub fn compliance_records(&self) -> Vec<ComplianceRecord> {
        self.records().compliance.clone()
    }
}

impl ResponseDispatcher for Outbox {
    fn send_response(
        &self,
        content: &str,
        recipient: &str,
        subject: &str,
    ) -> impl Future<Output = Result<(), DispatchError>> + Send {
        let result = match &self.reject_with {
            Some(reason) => Err(DispatchError::Rejected {
                reason: reason.clone(),
            }),
            None => {
                tracing::info!(%recipient, %subject, "virtual response sent");
                self.records().sent.push(SentResponse {
                    recipient: recipient.to_string(),
                    subject: subject.to_string(),
                    content: content.to_string(),
                });
                Ok(())
            }
        };
        async move { result }
    }
}

impl ComplianceRecorder for Outbox {
    fn record_crisis_outcome(
        &self,
        crisis: &CrisisEvent,
        executed: &[String],
    ) -> impl Future<Output = Result<(), ComplianceUpdateError>> + Send {
        self.records().compliance.push(ComplianceRecord {
            crisis_type: crisis.crisis_type.clone(),
            executed: executed.to_vec(),
        });
        async { Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crisiswatch_domain::crisis::Severity;

    #[tokio::test]
    async fn should_record_sent_response() {
        let outbox = Outbox::default();
        outbox
            .send_response("Dear Jane,", "jane@x.io", "Re: bye")
            .await
            .unwrap();
        assert_eq!(
            outbox.sent(),
            vec![SentResponse {
                recipient: "jane@x.io".to_string(),
                subject: "Re: bye".to_string(),
                content: "Dear Jane,".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn should_reject_and_record_nothing_when_rejecting() {
        let outbox = Outbox::rejecting("quota exceeded");
        let err = outbox.send_response("x", "y", "z").await.unwrap_err();
        assert_eq!(err.to_string(), "quota exceeded");
        assert!(outbox.sent().is_empty());
    }

    #[tokio::test]
    async fn should_record_compliance_report() {
        let outbox = Outbox::default();
        let crisis = CrisisEvent {
            crisis_type: "Fire Emergency".to_string(),
            severity: Severity::High,
            sender: "a@b.c".to_string(),
            subject: "fire".to_string(),
            trigger_keyword: "fire".to_string(),
            automation_keys: vec!["staff_alert".to_string()],
        };
        outbox
            .record_crisis_outcome(&crisis, &crisis.automation_keys)
            .await
            .unwrap();
        assert_eq!(outbox.compliance_records()[0].executed, ["staff_alert"]);
    }
}
