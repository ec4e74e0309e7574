//! Compliance port: records that a crisis was handled.

use std::future::Future;
use std::sync::Arc;

use crisiswatch_domain::crisis::CrisisEvent;
use crisiswatch_domain::error::ComplianceUpdateError;

/// Reports a finished crisis response so compliance metrics can be updated.
pub trait ComplianceRecorder {
    /// Record the outcome of `crisis` together with the automation keys that
    /// were executed.
    fn record_crisis_outcome(
        &self,
        crisis: &CrisisEvent,
        executed: &[String],
    ) -> impl Future<Output = Result<(), ComplianceUpdateError>> + Send;
}

impl<T: ComplianceRecorder + Send + Sync> ComplianceRecorder for Arc<T> {
    fn record_crisis_outcome(
        &self,
        crisis: &CrisisEvent,
        executed: &[String],
    ) -> impl Future<Output = Result<(), ComplianceUpdateError>> + Send {
        (**self).record_crisis_outcome(crisis, executed)
    }
}
