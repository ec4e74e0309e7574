//! Scanner: drives detection, manually or on a fixed interval.
//!
//! ```text
//! Stopped ⇄ IdleWaiting ─tick─▶ Checking ─▶ IdleWaiting
//!                                   └─crisis─▶ Triggering ─▶ IdleWaiting
//! ```
//!
//! At most one detection or workflow run is in flight per session. The busy
//! flag lives in the [`Session`] so observers can see it; it is taken with a
//! check-and-set and released by [`BusyGuard`] on every exit path. A tick that
//! finds the flag set is dropped, not queued.
//!
//! The periodic timer is a spawned task selecting between a fixed-rate
//! interval and a `watch` stop signal. Each tick runs in its own task, so a
//! long run never shifts the schedule; ticks falling inside it are skipped.
//! Stopping cancels a pending deadline right away but lets an in-flight run
//! finish.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crisiswatch_domain::crisis::CrisisEvent;
use crisiswatch_domain::error::{DetectionError, ValidationError};
use crisiswatch_domain::log::LogSeverity;
use crisiswatch_domain::time::now;

use crate::ports::{ComplianceRecorder, CrisisDetector, ResponseDispatcher, StepExecutor};
use crate::session::Session;
use crate::workflow_runner::{RunReport, SEPARATOR, WorkflowRunner};

/// Default wait before the first periodic tick.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(5);

const REMEDIATION: [&str; 3] = [
    "  1. The monitored mail account is connected to the integration provider",
    "  2. The backend server is running and reachable",
    "  3. API credentials are correctly configured",
];

/// Result of one scan attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScanOutcome {
    /// Another scan or run held the busy flag.
    Skipped,
    NoCrisis {
        emails_checked: u32,
    },
    Handled {
        emails_checked: u32,
        report: RunReport,
    },
    /// Detection failed; nothing ran.
    Failed {
        reason: String,
    },
}

/// Holds the session's busy flag for its lifetime.
struct BusyGuard<'a> {
    session: &'a Session,
}

impl<'a> BusyGuard<'a> {
    fn acquire(session: &'a Session) -> Option<Self> {
        if session.try_mark_busy() {
            Some(Self { session })
        } else {
            None
        }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.session.clear_busy();
    }
}

struct Timer {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Periodic and on-demand crisis detection.
pub struct Scanner<DT, X, D, K> {
    detector: DT,
    runner: WorkflowRunner<X, D, K>,
    session: Arc<Session>,
    initial_delay: Duration,
    timer: Mutex<Option<Timer>>,
}

impl<DT, X, D, K> Scanner<DT, X, D, K>
where
    DT: CrisisDetector + Send + Sync + 'static,
    X: StepExecutor + Send + Sync + 'static,
    D: ResponseDispatcher + Send + Sync + 'static,
    K: ComplianceRecorder + Send + Sync + 'static,
{
    pub fn new(detector: DT, runner: WorkflowRunner<X, D, K>) -> Self {
        let session = Arc::clone(runner.session());
        Self {
            detector,
            runner,
            session,
            initial_delay: DEFAULT_INITIAL_DELAY,
            timer: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn runner(&self) -> &WorkflowRunner<X, D, K> {
        &self.runner
    }

    /// Whether the periodic timer is running.
    pub fn is_running(&self) -> bool {
        self.session.scan_state().enabled
    }

    /// Start (or restart) periodic scanning every `interval_seconds`.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ZeroInterval`] when `interval_seconds` is 0.
    pub fn start(self: &Arc<Self>, interval_seconds: u64) -> Result<(), ValidationError> {
        if interval_seconds == 0 {
            return Err(ValidationError::ZeroInterval);
        }
        let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = timer.take() {
            let _ = previous.stop.send(true);
        }

        let (stop, stop_rx) = watch::channel(false);
        let this = Arc::clone(self);
        let interval = Duration::from_secs(interval_seconds);
        let task = tokio::spawn(this.run_timer(interval, stop_rx));
        *timer = Some(Timer { stop, task });

        self.session.set_schedule(true, interval_seconds);
        tracing::info!(interval_seconds, "scanner started");
        Ok(())
    }

    /// Cancel the pending tick. A run already in flight finishes.
    pub fn stop(&self) {
        let previous = self
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(timer) = previous {
            let _ = timer.stop.send(true);
            drop(timer.task);
            tracing::info!("scanner stopped");
        }
        let interval_seconds = self.session.scan_state().interval_seconds;
        self.session.set_schedule(false, interval_seconds);
    }

    /// Clear the log and check the inbox once, narrating every step.
    ///
    /// Returns [`ScanOutcome::Skipped`] without touching anything when a scan
    /// or run is already in flight.
    #[tracing::instrument(skip(self))]
    pub async fn scan_now(&self) -> ScanOutcome {
        let Some(_busy) = BusyGuard::acquire(&self.session) else {
            tracing::debug!("scan requested while busy");
            return ScanOutcome::Skipped;
        };
        self.session.clear_log();
        self.narrated_check().await
    }

    /// Forget already-processed messages, then scan like [`Self::scan_now`].
    #[tracing::instrument(skip(self))]
    pub async fn reset_and_scan(&self) -> ScanOutcome {
        let Some(_busy) = BusyGuard::acquire(&self.session) else {
            tracing::debug!("reset requested while busy");
            return ScanOutcome::Skipped;
        };
        self.session.clear_log();
        self.narrate(LogSeverity::Info, "🔄 Resetting email cache...", "$");
        match self.detector.reset_dedup_cache().await {
            Ok(()) => self.narrate(
                LogSeverity::Success,
                "✓ Email cache cleared - will rescan all emails",
                "✓",
            ),
            Err(err) => {
                tracing::warn!(%err, "dedup cache reset failed");
                self.narrate(
                    LogSeverity::Warning,
                    "⚠ Could not reset cache, continuing with scan...",
                    "!",
                );
            }
        }
        self.narrated_check().await
    }

    async fn run_timer(self: Arc<Self>, interval: Duration, mut stop: watch::Receiver<bool>) {
        let mut ticks = tokio::time::interval_at(Instant::now() + self.initial_delay, interval);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = ticks.tick() => {}
                _ = stop.changed() => break,
            }
            let this = Arc::clone(&self);
            tokio::spawn(async move {
                this.tick().await;
            });
        }
        tracing::debug!("scanner timer exited");
    }

    /// One background check. Quiet unless a crisis shows up.
    async fn tick(&self) -> ScanOutcome {
        let Some(_busy) = BusyGuard::acquire(&self.session) else {
            tracing::debug!("tick skipped, scanner busy");
            return ScanOutcome::Skipped;
        };
        match self.detector.check_for_crisis().await {
            Ok(outcome) => {
                self.session.record_scan(now(), outcome.emails_checked);
                match outcome.crisis {
                    Some(crisis) => {
                        self.session.clear_log();
                        self.respond(outcome.emails_checked, crisis).await
                    }
                    None => {
                        tracing::debug!(emails_checked = outcome.emails_checked, "inbox clear");
                        ScanOutcome::NoCrisis {
                            emails_checked: outcome.emails_checked,
                        }
                    }
                }
            }
            Err(err) => self.detection_failed(&err),
        }
    }

    async fn narrated_check(&self) -> ScanOutcome {
        self.narrate(LogSeverity::Info, SEPARATOR, "");
        self.narrate(LogSeverity::Info, "🔍 SCANNING INBOX FOR CRISIS EMAILS", "");
        self.narrate(LogSeverity::Info, SEPARATOR, "");
        self.narrate(LogSeverity::Info, "Fetching unread emails from inbox...", "$");

        let outcome = match self.detector.check_for_crisis().await {
            Ok(outcome) => outcome,
            Err(err) => return self.detection_failed(&err),
        };
        let emails_checked = outcome.emails_checked;
        self.session.record_scan(now(), emails_checked);
        self.narrate(
            LogSeverity::Info,
            format!("Analyzed {emails_checked} emails"),
            "$",
        );

        match outcome.crisis {
            Some(crisis) => self.respond(emails_checked, crisis).await,
            None => {
                self.narrate(
                    LogSeverity::Success,
                    format!("✓ Scanned {emails_checked} emails"),
                    "✓",
                );
                self.narrate(LogSeverity::Info, "No crisis emails detected in inbox", "$");
                self.narrate(LogSeverity::Info, "System standing by...", "$");
                ScanOutcome::NoCrisis { emails_checked }
            }
        }
    }

    async fn respond(&self, emails_checked: u32, crisis: CrisisEvent) -> ScanOutcome {
        tracing::info!(
            crisis_type = %crisis.crisis_type,
            severity = %crisis.severity,
            trigger = %crisis.trigger_keyword,
            "crisis detected"
        );
        self.narrate(LogSeverity::Error, SEPARATOR, "");
        self.narrate(
            LogSeverity::Error,
            format!("🚨 CRISIS DETECTED: {}", crisis.crisis_type),
            "!",
        );
        self.narrate(LogSeverity::Error, SEPARATOR, "");
        self.narrate(LogSeverity::Warning, format!("From: {}", crisis.sender), "$");
        self.narrate(LogSeverity::Warning, format!("Subject: {}", crisis.subject), "$");
        self.narrate(
            LogSeverity::Warning,
            format!("Severity: {}", crisis.severity),
            "$",
        );
        self.narrate(
            LogSeverity::Warning,
            format!("Trigger: \"{}\"", crisis.trigger_keyword),
            "$",
        );

        let report = self.runner.execute(crisis).await;
        ScanOutcome::Handled {
            emails_checked,
            report,
        }
    }

    fn detection_failed(&self, err: &DetectionError) -> ScanOutcome {
        tracing::warn!(%err, "crisis detection failed");
        self.narrate(LogSeverity::Error, format!("✗ Error: {err}"), "✗");
        self.narrate(LogSeverity::Error, "Please verify:", "$");
        for check in REMEDIATION {
            self.narrate(LogSeverity::Error, check, "$");
        }
        ScanOutcome::Failed {
            reason: err.to_string(),
        }
    }

    fn narrate(&self, severity: LogSeverity, message: impl Into<String>, prefix: &str) {
        self.session.log(severity, message, Some(prefix));
    }
}
