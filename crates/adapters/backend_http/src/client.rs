//! reqwest-backed implementation of the detection, dispatch and compliance ports.

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crisiswatch_app::ports::{ComplianceRecorder, CrisisDetector, ResponseDispatcher};
use crisiswatch_domain::crisis::{CrisisEvent, DetectionOutcome};
use crisiswatch_domain::error::{ComplianceUpdateError, DetectionError, DispatchError};

use crate::config::BackendConfig;
use crate::error::BackendError;
use crate::wire::{
    Ack, CheckEmailsResponse, CrisisPayload, ExecuteRequest, RespondEmailRequest,
};

const CHECK_EMAILS: &str = "/api/crisis/check-emails";
const RESET_EMAILS: &str = "/api/crisis/reset-emails";
const RESPOND_EMAIL: &str = "/api/crisis/respond-email";
const EXECUTE: &str = "/api/crisis/execute";

/// HTTP client for the crisis backend.
///
/// Cheap to clone: clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Build a client with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send<R: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<R, BackendError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }
        response
            .json::<R>()
            .await
            .map_err(|err| BackendError::Malformed(err.to_string()))
    }

    /// Ask the backend to scan the inbox.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] on transport failure, a non-success status,
    /// `success: false` or an unreadable body.
    #[tracing::instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn check_emails(&self) -> Result<DetectionOutcome, BackendError> {
        let response: CheckEmailsResponse =
            self.send(self.client.post(self.url(CHECK_EMAILS))).await?;
        let outcome = response.into_outcome()?;
        tracing::debug!(
            emails_checked = outcome.emails_checked,
            detected = outcome.is_detected(),
            "inbox checked"
        );
        Ok(outcome)
    }

    /// Clear the backend's processed-message cache.
    ///
    /// # Errors
    ///
    /// See [`Self::check_emails`].
    #[tracing::instrument(skip(self))]
    pub async fn reset_emails(&self) -> Result<(), BackendError> {
        let ack: Ack = self.send(self.client.post(self.url(RESET_EMAILS))).await?;
        ack.into_result()
    }

    /// Send a response email.
    ///
    /// # Errors
    ///
    /// See [`Self::check_emails`].
    #[tracing::instrument(skip(self, content))]
    pub async fn respond_email(
        &self,
        content: &str,
        recipient: &str,
        subject: &str,
    ) -> Result<(), BackendError> {
        let body = RespondEmailRequest::new(content, recipient, subject);
        let ack: Ack = self
            .send(self.client.post(self.url(RESPOND_EMAIL)).json(&body))
            .await?;
        ack.into_result()
    }

    /// Report a handled crisis so compliance metrics get updated.
    ///
    /// # Errors
    ///
    /// See [`Self::check_emails`].
    #[tracing::instrument(skip_all, fields(crisis_type = %crisis.crisis_type))]
    pub async fn execute(
        &self,
        crisis: &CrisisEvent,
        executed: &[String],
    ) -> Result<(), BackendError> {
        let body = ExecuteRequest {
            crisis: CrisisPayload::reporting(crisis, executed),
        };
        let ack: Ack = self
            .send(self.client.post(self.url(EXECUTE)).json(&body))
            .await?;
        ack.into_result()
    }
}

impl CrisisDetector for BackendClient {
    fn check_for_crisis(
        &self,
    ) -> impl Future<Output = Result<DetectionOutcome, DetectionError>> + Send {
        async move { self.check_emails().await.map_err(BackendError::into_detection) }
    }

    fn reset_dedup_cache(&self) -> impl Future<Output = Result<(), DetectionError>> + Send {
        async move { self.reset_emails().await.map_err(BackendError::into_detection) }
    }
}

impl ResponseDispatcher for BackendClient {
    fn send_response(
        &self,
        content: &str,
        recipient: &str,
        subject: &str,
    ) -> impl Future<Output = Result<(), DispatchError>> + Send {
        async move {
            self.respond_email(content, recipient, subject)
                .await
                .map_err(BackendError::into_dispatch)
        }
    }
}

impl ComplianceRecorder for BackendClient {
    fn record_crisis_outcome(
        &self,
        crisis: &CrisisEvent,
        executed: &[String],
    ) -> impl Future<Output = Result<(), ComplianceUpdateError>> + Send {
        async move {
            self.execute(crisis, executed)
                .await
                .map_err(BackendError::into_compliance)
        }
    }
}
