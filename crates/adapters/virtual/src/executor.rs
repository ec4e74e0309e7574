//! Step executor that simulates work by waiting.

use std::future::Future;
use std::time::Duration;

use crisiswatch_app::ports::StepExecutor;
use crisiswatch_domain::catalog::StepTemplate;
use crisiswatch_domain::crisis::CrisisEvent;
use crisiswatch_domain::error::StepError;

/// Waits `estimated_duration_ms × pace_percent / 100` and succeeds.
///
/// A pace of `0` completes every step immediately.
#[derive(Debug, Clone, Copy)]
pub struct PacedStepExecutor {
    pace_percent: u32,
}

impl Default for PacedStepExecutor {
    fn default() -> Self {
        Self { pace_percent: 100 }
    }
}

impl PacedStepExecutor {
    #[must_use]
    pub fn new(pace_percent: u32) -> Self {
        Self { pace_percent }
    }

    fn delay(self, step: &StepTemplate) -> Duration {
        let millis = step.estimated_duration_ms.saturating_mul(u64::from(self.pace_percent)) / 100;
        Duration::from_millis(millis)
    }
}

impl StepExecutor for PacedStepExecutor {
    fn perform(
        &self,
        automation_key: &str,
        step: &StepTemplate,
        _crisis: &CrisisEvent,
    ) -> impl Future<Output = Result<(), StepError>> + Send {
        let delay = self.delay(step);
        tracing::trace!(automation = automation_key, step = %step.name, ?delay, "simulating step");
        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crisiswatch_domain::crisis::Severity;
    use tokio::time::Instant;

    fn crisis() -> CrisisEvent {
        CrisisEvent {
            crisis_type: "Staff Shortage".to_string(),
            severity: Severity::Medium,
            sender: "a@b.c".to_string(),
            subject: "sick".to_string(),
            trigger_keyword: "sick".to_string(),
            automation_keys: vec![],
        }
    }

    #[tokio::test(start_paused = true)]
    async fn should_wait_for_scaled_estimate() {
        let step = StepTemplate::new("Loading", "Loading...", 800);
        let started = Instant::now();
        PacedStepExecutor::new(50)
            .perform("staff_alert", &step, &crisis())
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_millis(400));
        assert!(started.elapsed() < Duration::from_millis(800));
    }

    #[tokio::test(start_paused = true)]
    async fn should_complete_immediately_at_zero_pace() {
        let step = StepTemplate::new("Loading", "Loading...", 800);
        let started = Instant::now();
        PacedStepExecutor::new(0)
            .perform("staff_alert", &step, &crisis())
            .await
            .unwrap();
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
