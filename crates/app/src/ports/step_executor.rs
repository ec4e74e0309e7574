//! Step executor port: performs the action behind one automation step.

use std::future::Future;
use std::sync::Arc;

use crisiswatch_domain::catalog::StepTemplate;
use crisiswatch_domain::crisis::CrisisEvent;
use crisiswatch_domain::error::StepError;

/// Carries out a single step of an automation.
///
/// The runner bounds every call with a ceiling derived from
/// [`StepTemplate::estimated_duration_ms`]; implementations do not need to
/// enforce their own timeout.
pub trait StepExecutor {
    fn perform(
        &self,
        automation_key: &str,
        step: &StepTemplate,
        crisis: &CrisisEvent,
    ) -> impl Future<Output = Result<(), StepError>> + Send;
}

impl<T: StepExecutor + Send + Sync> StepExecutor for Arc<T> {
    fn perform(
        &self,
        automation_key: &str,
        step: &StepTemplate,
        crisis: &CrisisEvent,
    ) -> impl Future<Output = Result<(), StepError>> + Send {
        (**self).perform(automation_key, step, crisis)
    }
}
