//! JSON bodies exchanged with the backend.

use serde::{Deserialize, Serialize};

use crisiswatch_domain::crisis::{CrisisEvent, DetectionOutcome, Severity};

use crate::error::BackendError;

/// `POST /api/crisis/check-emails` answer.
#[derive(Debug, Deserialize)]
pub(crate) struct CheckEmailsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub crisis_detected: bool,
    #[serde(default)]
    pub emails_checked: u32,
    #[serde(default)]
    pub crisis: Option<CrisisPayload>,
    #[serde(default)]
    pub error: Option<String>,
}

impl CheckEmailsResponse {
    pub fn into_outcome(self) -> Result<DetectionOutcome, BackendError> {
        if !self.success {
            return Err(BackendError::Rejected(
                self.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        if !self.crisis_detected {
            return Ok(DetectionOutcome::clear(self.emails_checked));
        }
        let crisis = self.crisis.ok_or_else(|| {
            BackendError::Malformed("crisis_detected is set but no crisis was sent".to_string())
        })?;
        Ok(DetectionOutcome::detected(
            self.emails_checked,
            crisis.into_event()?,
        ))
    }
}

/// Crisis as the backend spells it.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CrisisPayload {
    #[serde(rename = "type")]
    pub crisis_type: String,
    pub severity: String,
    #[serde(default)]
    pub email_sender: String,
    #[serde(default)]
    pub email_subject: String,
    #[serde(default)]
    pub trigger_keyword: String,
    #[serde(default)]
    pub automations: Vec<String>,
}

impl CrisisPayload {
    fn into_event(self) -> Result<CrisisEvent, BackendError> {
        let severity = self
            .severity
            .parse::<Severity>()
            .map_err(|err| BackendError::Malformed(err.to_string()))?;
        Ok(CrisisEvent {
            crisis_type: self.crisis_type,
            severity,
            sender: self.email_sender,
            subject: self.email_subject,
            trigger_keyword: self.trigger_keyword,
            automation_keys: self.automations,
        })
    }

    /// The crisis with `executed` as its automation list.
    pub fn reporting(crisis: &CrisisEvent, executed: &[String]) -> Self {
        Self {
            crisis_type: crisis.crisis_type.clone(),
            severity: crisis.severity.to_string(),
            email_sender: crisis.sender.clone(),
            email_subject: crisis.subject.clone(),
            trigger_keyword: crisis.trigger_keyword.clone(),
            automations: executed.to_vec(),
        }
    }
}

/// `POST /api/crisis/respond-email` body.
#[derive(Debug, Serialize)]
pub(crate) struct RespondEmailRequest<'a> {
    pub email_content: &'a str,
    pub sender: &'a str,
    /// Original subject; the backend prepends `Re: ` itself.
    pub subject: &'a str,
}

impl<'a> RespondEmailRequest<'a> {
    pub fn new(content: &'a str, recipient: &'a str, subject: &'a str) -> Self {
        Self {
            email_content: content,
            sender: recipient,
            subject: subject.strip_prefix("Re: ").unwrap_or(subject),
        }
    }
}

/// `POST /api/crisis/execute` body.
#[derive(Debug, Serialize)]
pub(crate) struct ExecuteRequest {
    pub crisis: CrisisPayload,
}

/// `{success, error?}` envelope used by the other endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct Ack {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl Ack {
    pub fn into_result(self) -> Result<(), BackendError> {
        if self.success {
            Ok(())
        } else {
            Err(BackendError::Rejected(
                self.error.unwrap_or_else(|| "unknown error".to_string()),
            ))
        }
    }
}
