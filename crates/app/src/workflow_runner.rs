//! Workflow runner: executes the response to one crisis.
//!
//! A run walks four phases in a fixed order:
//!
//! ```text
//! Idle ─▶ RunningAutomations ─▶ Drafting ─▶ Dispatching ─▶ UpdatingCompliance ─▶ Idle
//! ```
//!
//! Every requested automation runs, even when an earlier one failed. Only
//! the step executor can fail an automation; dispatch and compliance errors
//! are narrated as warnings and never abort the run.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use crisiswatch_domain::automation::AutomationStatus;
use crisiswatch_domain::catalog::{
    AutomationCatalog, AutomationDefinition, DRAFT_RESPONSE_KEY, SEND_RESPONSE_KEY, StepTemplate,
};
use crisiswatch_domain::crisis::CrisisEvent;
use crisiswatch_domain::draft::{DraftState, EmailDraft, ResponseDrafter};
use crisiswatch_domain::error::{CrisisWatchError, StepError};
use crisiswatch_domain::id::RunId;
use crisiswatch_domain::log::LogSeverity;
use crisiswatch_domain::time::now;

use crate::ports::{ComplianceRecorder, ResponseDispatcher, StepExecutor};
use crate::session::{ActiveRun, RunPhase, Session};

/// Separator line framing banners in the event log.
pub const SEPARATOR: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Lower bound on any step ceiling, whatever its estimate.
const MIN_STEP_CEILING_MS: u64 = 1_000;

/// Runner tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerConfig {
    /// A step may take this many times its estimated duration before it is
    /// failed as timed out.
    pub step_timeout_factor: u32,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            step_timeout_factor: 4,
        }
    }
}

/// Final status of one requested automation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutomationOutcome {
    pub key: String,
    pub status: AutomationStatus,
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub run_id: RunId,
    /// Requested automations in execution order.
    pub automations: Vec<AutomationOutcome>,
    pub draft_state: DraftState,
    pub compliance_recorded: bool,
    /// Requested automations plus drafting and dispatch.
    pub automations_executed: usize,
}

impl RunReport {
    #[must_use]
    pub fn failed_automations(&self) -> usize {
        self.automations
            .iter()
            .filter(|outcome| outcome.status == AutomationStatus::Failed)
            .count()
    }
}

/// Executes crisis workflows against the session.
pub struct WorkflowRunner<X, D, K> {
    catalog: Arc<AutomationCatalog>,
    session: Arc<Session>,
    executor: X,
    dispatcher: D,
    compliance: K,
    drafter: ResponseDrafter,
    config: RunnerConfig,
}

impl<X, D, K> WorkflowRunner<X, D, K>
where
    X: StepExecutor + Send + Sync,
    D: ResponseDispatcher + Send + Sync,
    K: ComplianceRecorder + Send + Sync,
{
    pub fn new(
        catalog: Arc<AutomationCatalog>,
        session: Arc<Session>,
        executor: X,
        dispatcher: D,
        compliance: K,
    ) -> Self {
        Self {
            catalog,
            session,
            executor,
            dispatcher,
            compliance,
            drafter: ResponseDrafter,
            config: RunnerConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn catalog(&self) -> &Arc<AutomationCatalog> {
        &self.catalog
    }

    /// Run every automation requested by `crisis`, then draft, dispatch and
    /// record the response.
    ///
    /// Never fails: per-automation failures are reflected in the returned
    /// [`RunReport`] and in the event log.
    #[tracing::instrument(
        skip(self, crisis),
        fields(crisis_type = %crisis.crisis_type, severity = %crisis.severity)
    )]
    pub async fn execute(&self, crisis: CrisisEvent) -> RunReport {
        let run_id = RunId::new();
        let requested = crisis.automation_keys.len();
        let automations_executed = crisis.reported_automation_count();
        tracing::info!(%run_id, automations = requested, "crisis workflow started");

        self.session.begin_run(ActiveRun {
            run_id,
            crisis: crisis.clone(),
            started_at: now(),
            current_automation: None,
            completed_steps: 0,
            completed_automations: 0,
            total_automations: automations_executed,
        });

        self.session.set_phase(RunPhase::RunningAutomations);
        self.narrate(
            LogSeverity::Info,
            format!("INITIATING {requested} AUTOMATIONS..."),
            "▶",
        );
        let mut automations = Vec::with_capacity(requested);
        for (position, key) in crisis.automation_keys.iter().enumerate() {
            let definition = self.catalog.lookup(key);
            self.narrate(
                LogSeverity::Info,
                format!("[{}/{requested}] Starting: {}", position + 1, definition.name),
                "▶",
            );
            let status = self.run_automation(&definition, &crisis).await;
            automations.push(AutomationOutcome {
                key: key.clone(),
                status,
            });
        }

        let draft = self.draft_response(&crisis).await;
        let draft_state = self.dispatch_response(&draft, &crisis).await;
        let compliance_recorded = self.record_compliance(&crisis).await;

        self.narrate(LogSeverity::Success, SEPARATOR, "");
        self.narrate(LogSeverity::Success, "✅ CRISIS RESPONSE COMPLETE", "");
        self.narrate(
            LogSeverity::Success,
            format!("Total automations executed: {automations_executed}"),
            "✓",
        );
        if draft_state == DraftState::Sent {
            self.narrate(LogSeverity::Success, "Response email sent successfully", "✓");
        } else {
            self.narrate(LogSeverity::Warning, "Response email was not delivered", "!");
        }
        self.narrate(LogSeverity::Success, SEPARATOR, "");
        self.narrate(
            LogSeverity::Info,
            "All systems nominal. Monitoring for new alerts...",
            "$",
        );
        self.session.finish_run();

        let report = RunReport {
            run_id,
            automations,
            draft_state,
            compliance_recorded,
            automations_executed,
        };
        tracing::info!(
            %run_id,
            failed = report.failed_automations(),
            draft_state = ?report.draft_state,
            "crisis workflow finished"
        );
        report
    }

    async fn draft_response(&self, crisis: &CrisisEvent) -> EmailDraft {
        self.session.set_phase(RunPhase::Drafting);
        self.narrate(LogSeverity::Info, SEPARATOR, "");
        self.narrate(LogSeverity::Info, "DRAFTING RESPONSE EMAIL...", "✉");

        let mut draft = EmailDraft::for_crisis(crisis);
        self.session.set_draft(draft.clone());

        let definition = self.catalog.lookup(DRAFT_RESPONSE_KEY);
        self.run_automation(&definition, crisis).await;

        draft.content = self.drafter.draft(crisis);
        draft.state = DraftState::Ready;
        self.session.set_draft(draft.clone());
        self.narrate(
            LogSeverity::Info,
            format!("Response drafted for {}", draft.recipient),
            "✉",
        );
        draft
    }

    async fn dispatch_response(&self, draft: &EmailDraft, crisis: &CrisisEvent) -> DraftState {
        self.session.set_phase(RunPhase::Dispatching);
        let definition = self.catalog.lookup(SEND_RESPONSE_KEY);
        self.run_automation(&definition, crisis).await;

        let state = match self
            .dispatcher
            .send_response(&draft.content, &draft.recipient, &draft.subject)
            .await
        {
            Ok(()) => {
                self.narrate(
                    LogSeverity::Success,
                    format!("✓ Email sent to: {}", draft.recipient),
                    "✉",
                );
                DraftState::Sent
            }
            Err(err) => {
                tracing::warn!(%err, recipient = %draft.recipient, "response dispatch failed");
                self.narrate(
                    LogSeverity::Warning,
                    format!("⚠ Email sending failed: {err}"),
                    "!",
                );
                DraftState::SendFailed
            }
        };
        self.session.update_draft(|stored| stored.state = state);
        state
    }

    async fn record_compliance(&self, crisis: &CrisisEvent) -> bool {
        self.session.set_phase(RunPhase::UpdatingCompliance);
        match self
            .compliance
            .record_crisis_outcome(crisis, &crisis.automation_keys)
            .await
        {
            Ok(()) => {
                self.narrate(LogSeverity::Info, "Compliance score updated", "📋");
                true
            }
            Err(err) => {
                tracing::warn!(%err, "compliance update failed");
                self.narrate(
                    LogSeverity::Warning,
                    format!("⚠ Compliance update failed: {err}"),
                    "!",
                );
                false
            }
        }
    }

    /// Run every step of `definition` in order and return the final status.
    async fn run_automation(
        &self,
        definition: &AutomationDefinition,
        crisis: &CrisisEvent,
    ) -> AutomationStatus {
        let key = definition.key.as_str();
        self.session.update_run(|run| {
            run.current_automation = Some(key.to_string());
            run.completed_steps = 0;
        });

        let status = match self.run_steps(definition, crisis).await {
            Ok(()) => {
                self.finish_automation(definition, AutomationStatus::Success);
                self.narrate(
                    LogSeverity::Success,
                    format!("Automation \"{}\" completed successfully", definition.name),
                    "✓",
                );
                AutomationStatus::Success
            }
            Err(err) => {
                tracing::warn!(%err, automation = key, "automation failed");
                self.finish_automation(definition, AutomationStatus::Failed);
                self.narrate(
                    LogSeverity::Error,
                    format!("✗ {}: {}", definition.name, describe(&err)),
                    "✗",
                );
                AutomationStatus::Failed
            }
        };

        self.session.update_run(|run| {
            run.current_automation = None;
            run.completed_automations += 1;
        });
        status
    }

    async fn run_steps(
        &self,
        definition: &AutomationDefinition,
        crisis: &CrisisEvent,
    ) -> Result<(), CrisisWatchError> {
        self.session
            .update_instance(definition, |instance| instance.begin_run(definition))?;
        for (index, step) in definition.steps.iter().enumerate() {
            self.run_step(definition, index, step, crisis).await?;
            self.session.update_run(|run| run.completed_steps += 1);
        }
        Ok(())
    }

    async fn run_step(
        &self,
        definition: &AutomationDefinition,
        index: usize,
        step: &StepTemplate,
        crisis: &CrisisEvent,
    ) -> Result<(), CrisisWatchError> {
        self.session
            .update_instance(definition, |instance| instance.start_step(index, now()))?;
        self.narrate(LogSeverity::Info, step.narration.as_str(), "→");

        let ceiling_ms = self.ceiling_ms(step);
        let started = Instant::now();
        let outcome = tokio::time::timeout(
            Duration::from_millis(ceiling_ms),
            self.executor.perform(&definition.key, step, crisis),
        )
        .await
        .unwrap_or_else(|_| {
            Err(StepError::TimedOut {
                step: step.name.clone(),
                ceiling_ms,
            })
        });
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        if let Err(err) = outcome {
            self.session
                .update_instance(definition, |instance| instance.fail_step(index))?;
            return Err(err.into());
        }

        self.session.update_instance(definition, |instance| {
            instance.complete_step(index, elapsed_ms)
        })?;
        tracing::debug!(
            automation = %definition.key,
            step = %step.name,
            elapsed_ms,
            "step complete"
        );
        self.narrate(
            LogSeverity::Success,
            format!("✓ {} completed", step.name),
            "✓",
        );
        Ok(())
    }

    fn finish_automation(&self, definition: &AutomationDefinition, status: AutomationStatus) {
        let at = now();
        let result = self.session.update_instance(definition, |instance| {
            if status == AutomationStatus::Success {
                instance.succeed(at)
            } else {
                instance.fail(at)
            }
        });
        if let Err(err) = result {
            tracing::error!(
                %err,
                automation = %definition.key,
                "automation left in unexpected state"
            );
        }
    }

    fn ceiling_ms(&self, step: &StepTemplate) -> u64 {
        step.estimated_duration_ms
            .saturating_mul(u64::from(self.config.step_timeout_factor))
            .max(MIN_STEP_CEILING_MS)
    }

    fn narrate(&self, severity: LogSeverity, message: impl Into<String>, prefix: &str) {
        self.session.log(severity, message, Some(prefix));
    }
}

/// Operator-facing text for a step failure.
fn describe(err: &CrisisWatchError) -> String {
    match err {
        CrisisWatchError::Step(step) => step.to_string(),
        CrisisWatchError::Validation(validation) => validation.to_string(),
        other => other.to_string(),
    }
}
