//! Common error types used across the workspace.
//!
//! Each failure class of a crisis response has its own typed error. They are
//! split in two tiers:
//! - [`DetectionError`] is *blocking*: it is surfaced to the operator with
//!   remediation guidance and the scan waits for the next interval.
//! - [`StepError`], [`DispatchError`] and [`ComplianceUpdateError`] are
//!   *narrated only*: they are written to the event log and the pipeline keeps
//!   going.
//!
//! [`CrisisWatchError`] wraps all of them via `#[from]` for code that needs a
//! single error type (the HTTP adapter, the daemon).

use crate::automation::{AutomationStatus, StepStatus};

/// Boxed error coming from a collaborator adapter (HTTP client, …).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error for the crisiswatch workspace.
#[derive(Debug, thiserror::Error)]
pub enum CrisisWatchError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("crisis detection failed")]
    Detection(#[from] DetectionError),

    #[error("automation step failed")]
    Step(#[from] StepError),

    #[error("response dispatch failed")]
    Dispatch(#[from] DispatchError),

    #[error("compliance update failed")]
    Compliance(#[from] ComplianceUpdateError),
}

/// An illegal state transition or malformed value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("step {index} cannot move from {from} to {to}")]
    StepTransition {
        index: usize,
        from: StepStatus,
        to: StepStatus,
    },

    #[error("step index {index} out of range (automation has {len} steps)")]
    StepOutOfRange { index: usize, len: usize },

    #[error("automation cannot move from {from} to {to}")]
    AutomationTransition {
        from: AutomationStatus,
        to: AutomationStatus,
    },

    #[error("unknown severity {0:?}")]
    UnknownSeverity(String),

    #[error("scan interval must be at least one second")]
    ZeroInterval,
}

/// The detection collaborator could not tell whether a crisis is pending.
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("detection backend unreachable: {0}")]
    Unavailable(BoxError),

    #[error("detection backend reported failure: {reason}")]
    Rejected { reason: String },

    #[error("malformed detection response: {0}")]
    Malformed(BoxError),
}

/// A single automation step did not complete.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StepError {
    #[error("{step} failed: {reason}")]
    Failed { step: String, reason: String },

    #[error("{step} exceeded its {ceiling_ms}ms ceiling")]
    TimedOut { step: String, ceiling_ms: u64 },
}

/// The response message could not be delivered.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("{reason}")]
    Rejected { reason: String },

    #[error("dispatch backend unreachable: {0}")]
    Unavailable(BoxError),
}

/// The compliance collaborator did not record the crisis outcome.
#[derive(Debug, thiserror::Error)]
pub enum ComplianceUpdateError {
    #[error("compliance backend rejected the update")]
    Rejected,

    #[error("compliance backend unreachable: {0}")]
    Unavailable(BoxError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_step_transition_error() {
        let err = ValidationError::StepTransition {
            index: 2,
            from: StepStatus::Complete,
            to: StepStatus::Running,
        };
        assert_eq!(err.to_string(), "step 2 cannot move from complete to running");
    }

    #[test]
    fn should_display_dispatch_rejection_as_plain_reason() {
        let err = DispatchError::Rejected {
            reason: "quota exceeded".to_string(),
        };
        assert_eq!(err.to_string(), "quota exceeded");
    }

    #[test]
    fn should_include_source_text_when_detection_unavailable() {
        let err = DetectionError::Unavailable("connection refused".into());
        assert_eq!(
            err.to_string(),
            "detection backend unreachable: connection refused"
        );
    }

    #[test]
    fn should_convert_step_error_into_top_level_error() {
        let err: CrisisWatchError = StepError::TimedOut {
            step: "Calling manager".to_string(),
            ceiling_ms: 2000,
        }
        .into();
        assert!(matches!(err, CrisisWatchError::Step(_)));
    }
}
