//! Automation instances: the runtime state of one catalog definition.
//!
//! An [`AutomationInstance`] is rebuilt at the start of every run and then
//! walks a strict state machine:
//!
//! ```text
//! instance:  idle|success|failed ──begin_run──▶ running ──▶ success | failed
//! step:      pending ──▶ running ──▶ complete | failed
//! ```
//!
//! Transitions are checked: an illegal one returns a
//! [`ValidationError`] and leaves the instance untouched, so observed step
//! statuses never regress.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::AutomationDefinition;
use crate::error::ValidationError;
use crate::id::AutomationId;
use crate::time::Timestamp;

/// Lifecycle of an automation across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutomationStatus {
    #[default]
    Idle,
    Running,
    Success,
    Failed,
}

impl fmt::Display for AutomationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Success => "success",
            Self::Failed => "failed",
        })
    }
}

/// Progress of a single step within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    Pending,
    Running,
    Complete,
    Failed,
}

impl StepStatus {
    /// Whether moving from `self` to `next` respects the monotonic order.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Running) | (Self::Running, Self::Complete | Self::Failed)
        )
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Complete => "complete",
            Self::Failed => "failed",
        })
    }
}

/// Runtime state of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepInstance {
    pub name: String,
    pub status: StepStatus,
    pub started_at: Option<Timestamp>,
    /// Measured duration, set when the step completes.
    pub duration_ms: Option<u64>,
}

impl StepInstance {
    fn pending(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: StepStatus::Pending,
            started_at: None,
            duration_ms: None,
        }
    }
}

/// Runtime state of one automation definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationInstance {
    pub definition_id: AutomationId,
    pub key: String,
    pub name: String,
    pub status: AutomationStatus,
    pub steps: Vec<StepInstance>,
    pub last_run_at: Option<Timestamp>,
}

impl AutomationInstance {
    /// A never-run instance for `definition`.
    #[must_use]
    pub fn idle(definition: &AutomationDefinition) -> Self {
        Self {
            definition_id: definition.id,
            key: definition.key.clone(),
            name: definition.name.clone(),
            status: AutomationStatus::Idle,
            steps: Vec::new(),
            last_run_at: None,
        }
    }

    /// Start a new run: rebuild every step as pending and mark the instance running.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::AutomationTransition`] if the instance is
    /// already running.
    pub fn begin_run(&mut self, definition: &AutomationDefinition) -> Result<(), ValidationError> {
        self.transition(AutomationStatus::Running)?;
        self.definition_id = definition.id;
        self.name.clone_from(&definition.name);
        self.steps = definition
            .steps
            .iter()
            .map(|template| StepInstance::pending(&template.name))
            .collect();
        Ok(())
    }

    /// Mark step `index` running.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the index is out of range or the step
    /// is not pending.
    pub fn start_step(&mut self, index: usize, at: Timestamp) -> Result<(), ValidationError> {
        let step = self.step_transition(index, StepStatus::Running)?;
        step.started_at = Some(at);
        Ok(())
    }

    /// Mark step `index` complete with its measured duration.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the index is out of range or the step
    /// is not running.
    pub fn complete_step(&mut self, index: usize, duration_ms: u64) -> Result<(), ValidationError> {
        let step = self.step_transition(index, StepStatus::Complete)?;
        step.duration_ms = Some(duration_ms);
        Ok(())
    }

    /// Mark step `index` failed.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the index is out of range or the step
    /// is not running.
    pub fn fail_step(&mut self, index: usize) -> Result<(), ValidationError> {
        self.step_transition(index, StepStatus::Failed).map(|_| ())
    }

    /// Finish the run successfully.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::AutomationTransition`] if the instance is not running.
    pub fn succeed(&mut self, at: Timestamp) -> Result<(), ValidationError> {
        self.transition(AutomationStatus::Success)?;
        self.last_run_at = Some(at);
        Ok(())
    }

    /// Finish the run as failed.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::AutomationTransition`] if the instance is not running.
    pub fn fail(&mut self, at: Timestamp) -> Result<(), ValidationError> {
        self.transition(AutomationStatus::Failed)?;
        self.last_run_at = Some(at);
        Ok(())
    }

    fn transition(&mut self, to: AutomationStatus) -> Result<(), ValidationError> {
        let allowed = match to {
            AutomationStatus::Running => self.status != AutomationStatus::Running,
            AutomationStatus::Success | AutomationStatus::Failed => {
                self.status == AutomationStatus::Running
            }
            AutomationStatus::Idle => false,
        };
        if !allowed {
            return Err(ValidationError::AutomationTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    fn step_transition(
        &mut self,
        index: usize,
        to: StepStatus,
    ) -> Result<&mut StepInstance, ValidationError> {
        let len = self.steps.len();
        let step = self
            .steps
            .get_mut(index)
            .ok_or(ValidationError::StepOutOfRange { index, len })?;
        if !step.status.can_transition_to(to) {
            return Err(ValidationError::StepTransition {
                index,
                from: step.status,
                to,
            });
        }
        step.status = to;
        Ok(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AutomationCatalog;
    use crate::time::now;

    fn running_instance(key: &str) -> AutomationInstance {
        let catalog = AutomationCatalog::builtin();
        let definition = catalog.lookup(key);
        let mut instance = AutomationInstance::idle(&definition);
        instance.begin_run(&definition).unwrap();
        instance
    }

    #[test]
    fn should_start_idle_without_steps() {
        let catalog = AutomationCatalog::builtin();
        let instance = AutomationInstance::idle(&catalog.lookup("staff_alert"));
        assert_eq!(instance.status, AutomationStatus::Idle);
        assert!(instance.steps.is_empty());
        assert!(instance.last_run_at.is_none());
    }

    #[test]
    fn should_rebuild_pending_steps_when_run_begins() {
        let instance = running_instance("staff_alert");
        assert_eq!(instance.status, AutomationStatus::Running);
        assert_eq!(instance.steps.len(), 4);
        assert!(instance.steps.iter().all(|s| s.status == StepStatus::Pending));
    }

    #[test]
    fn should_walk_step_through_running_to_complete() {
        let mut instance = running_instance("manager_notification");
        instance.start_step(0, now()).unwrap();
        assert_eq!(instance.steps[0].status, StepStatus::Running);
        assert!(instance.steps[0].started_at.is_some());
        instance.complete_step(0, 612).unwrap();
        assert_eq!(instance.steps[0].status, StepStatus::Complete);
        assert_eq!(instance.steps[0].duration_ms, Some(612));
        assert_eq!(instance.steps[1].status, StepStatus::Pending);
    }

    #[test]
    fn should_reject_regression_from_complete_to_running() {
        let mut instance = running_instance("manager_notification");
        instance.start_step(0, now()).unwrap();
        instance.complete_step(0, 10).unwrap();
        let err = instance.start_step(0, now()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::StepTransition {
                index: 0,
                from: StepStatus::Complete,
                to: StepStatus::Running,
            }
        );
        assert_eq!(instance.steps[0].status, StepStatus::Complete);
    }

    #[test]
    fn should_reject_completing_a_pending_step() {
        let mut instance = running_instance("manager_notification");
        assert!(instance.complete_step(1, 10).is_err());
        assert_eq!(instance.steps[1].status, StepStatus::Pending);
    }

    #[test]
    fn should_reject_out_of_range_step() {
        let mut instance = running_instance("manager_notification");
        assert_eq!(
            instance.start_step(9, now()).unwrap_err(),
            ValidationError::StepOutOfRange { index: 9, len: 3 }
        );
    }

    #[test]
    fn should_record_last_run_when_succeeding() {
        let mut instance = running_instance("staff_alert");
        let at = now();
        instance.succeed(at).unwrap();
        assert_eq!(instance.status, AutomationStatus::Success);
        assert_eq!(instance.last_run_at, Some(at));
    }

    #[test]
    fn should_reject_begin_run_while_running() {
        let catalog = AutomationCatalog::builtin();
        let definition = catalog.lookup("staff_alert");
        let mut instance = running_instance("staff_alert");
        assert!(instance.begin_run(&definition).is_err());
    }

    #[test]
    fn should_allow_rerun_after_failure() {
        let catalog = AutomationCatalog::builtin();
        let definition = catalog.lookup("staff_alert");
        let mut instance = running_instance("staff_alert");
        instance.fail(now()).unwrap();
        instance.begin_run(&definition).unwrap();
        assert_eq!(instance.status, AutomationStatus::Running);
    }

    #[test]
    fn should_reject_success_when_idle() {
        let catalog = AutomationCatalog::builtin();
        let mut instance = AutomationInstance::idle(&catalog.lookup("staff_alert"));
        assert!(instance.succeed(now()).is_err());
    }

    #[test]
    fn should_only_allow_forward_step_transitions() {
        use StepStatus::{Complete, Failed, Pending, Running};
        assert!(Pending.can_transition_to(Running));
        assert!(Running.can_transition_to(Complete));
        assert!(Running.can_transition_to(Failed));
        assert!(!Pending.can_transition_to(Complete));
        assert!(!Complete.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Running));
    }
}
