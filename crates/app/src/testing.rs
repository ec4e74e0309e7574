//! In-memory port doubles shared by the runner and scanner tests.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crisiswatch_domain::catalog::StepTemplate;
use crisiswatch_domain::crisis::{CrisisEvent, DetectionOutcome, Severity};
use crisiswatch_domain::error::{ComplianceUpdateError, DetectionError, DispatchError, StepError};

use crate::ports::{ComplianceRecorder, CrisisDetector, ResponseDispatcher, StepExecutor};

pub fn resignation() -> CrisisEvent {
    CrisisEvent {
        crisis_type: "Staff Resignation".to_string(),
        severity: Severity::High,
        sender: "Jane Doe <jane@example.com>".to_string(),
        subject: "Two weeks notice".to_string(),
        trigger_keyword: "resign".to_string(),
        automation_keys: vec![
            "emergency_hiring".to_string(),
            "schedule_adjustment".to_string(),
        ],
    }
}

pub fn crisis_with_keys(keys: &[&str]) -> CrisisEvent {
    CrisisEvent {
        automation_keys: keys.iter().map(ToString::to_string).collect(),
        ..resignation()
    }
}

// ── Step executor ─────────────────────────────────────────────────

#[derive(Default)]
pub struct ScriptedExecutor {
    /// `(automation key, step name)` that fails.
    pub fail_on: Option<(String, String)>,
    /// Every step sleeps this long before answering.
    pub delay: Option<Duration>,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedExecutor {
    pub fn failing(key: &str, step: &str) -> Self {
        Self {
            fail_on: Some((key.to_string(), step.to_string())),
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }
}

impl StepExecutor for ScriptedExecutor {
    fn perform(
        &self,
        automation_key: &str,
        step: &StepTemplate,
        _crisis: &CrisisEvent,
    ) -> impl Future<Output = Result<(), StepError>> + Send {
        self.calls
            .lock()
            .unwrap()
            .push((automation_key.to_string(), step.name.clone()));
        let fails = self
            .fail_on
            .as_ref()
            .is_some_and(|(key, name)| key == automation_key && *name == step.name);
        let result = if fails {
            Err(StepError::Failed {
                step: step.name.clone(),
                reason: "upstream refused".to_string(),
            })
        } else {
            Ok(())
        };
        let delay = self.delay;
        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            result
        }
    }
}

// ── Dispatcher ────────────────────────────────────────────────────

#[derive(Default)]
pub struct SpyDispatcher {
    /// When set, every send is rejected with this reason.
    pub reject_with: Option<String>,
    /// `(content, recipient, subject)` of every call.
    pub sent: Mutex<Vec<(String, String, String)>>,
}

impl SpyDispatcher {
    pub fn rejecting(reason: &str) -> Self {
        Self {
            reject_with: Some(reason.to_string()),
            ..Self::default()
        }
    }
}

impl ResponseDispatcher for SpyDispatcher {
    fn send_response(
        &self,
        content: &str,
        recipient: &str,
        subject: &str,
    ) -> impl Future<Output = Result<(), DispatchError>> + Send {
        self.sent.lock().unwrap().push((
            content.to_string(),
            recipient.to_string(),
            subject.to_string(),
        ));
        let result = match &self.reject_with {
            Some(reason) => Err(DispatchError::Rejected {
                reason: reason.clone(),
            }),
            None => Ok(()),
        };
        async move { result }
    }
}

// ── Compliance ────────────────────────────────────────────────────

#[derive(Default)]
pub struct SpyCompliance {
    pub fail: bool,
    /// `(crisis type, executed keys)` of every call.
    pub recorded: Mutex<Vec<(String, Vec<String>)>>,
}

impl ComplianceRecorder for SpyCompliance {
    fn record_crisis_outcome(
        &self,
        crisis: &CrisisEvent,
        executed: &[String],
    ) -> impl Future<Output = Result<(), ComplianceUpdateError>> + Send {
        self.recorded
            .lock()
            .unwrap()
            .push((crisis.crisis_type.clone(), executed.to_vec()));
        let result = if self.fail {
            Err(ComplianceUpdateError::Rejected)
        } else {
            Ok(())
        };
        async move { result }
    }
}

// ── Detector ──────────────────────────────────────────────────────

/// Scripted detection answer. `Unreachable` becomes a transport error.
pub enum Answer {
    Clear(u32),
    Crisis(CrisisEvent),
    Unreachable,
}

/// Detector replaying scripted answers, then reporting an empty inbox.
///
/// With `dedup` set it behaves like a real inbox: a crisis is reported once
/// and comes back only after a cache reset.
#[derive(Default)]
pub struct ScriptedDetector {
    pub answers: Mutex<VecDeque<Answer>>,
    pub dedup: Option<CrisisEvent>,
    pub dedup_seen: Mutex<bool>,
    pub checks: AtomicUsize,
    pub resets: AtomicUsize,
    pub reset_fails: bool,
}

impl ScriptedDetector {
    pub fn answering(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn inbox_with(crisis: CrisisEvent) -> Self {
        Self {
            dedup: Some(crisis),
            ..Self::default()
        }
    }

    pub fn with_failing_reset(mut self) -> Self {
        self.reset_fails = true;
        self
    }

    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }
}

impl CrisisDetector for ScriptedDetector {
    fn check_for_crisis(
        &self,
    ) -> impl Future<Output = Result<DetectionOutcome, DetectionError>> + Send {
        self.checks.fetch_add(1, Ordering::SeqCst);
        let result = if let Some(crisis) = &self.dedup {
            let mut seen = self.dedup_seen.lock().unwrap();
            if *seen {
                Ok(DetectionOutcome::clear(1))
            } else {
                *seen = true;
                Ok(DetectionOutcome::detected(1, crisis.clone()))
            }
        } else {
            match self.answers.lock().unwrap().pop_front() {
                None => Ok(DetectionOutcome::clear(0)),
                Some(Answer::Clear(n)) => Ok(DetectionOutcome::clear(n)),
                Some(Answer::Crisis(crisis)) => Ok(DetectionOutcome::detected(3, crisis)),
                Some(Answer::Unreachable) => {
                    Err(DetectionError::Unavailable("connection refused".into()))
                }
            }
        };
        async move { result }
    }

    fn reset_dedup_cache(&self) -> impl Future<Output = Result<(), DetectionError>> + Send {
        self.resets.fetch_add(1, Ordering::SeqCst);
        let result = if self.reset_fails {
            Err(DetectionError::Unavailable("cache service down".into()))
        } else {
            *self.dedup_seen.lock().unwrap() = false;
            Ok(())
        };
        async move { result }
    }
}
