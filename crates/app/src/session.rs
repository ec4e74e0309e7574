//! Session state: everything an observer needs to render the engine.
//!
//! One [`Session`] exists per process. It owns the [`EventLog`], one
//! [`AutomationInstance`] per automation key, the active run, the current
//! draft and the scan metadata. Writers (the runner and the scanner) mutate it
//! through short critical sections; readers take a [`SessionState`] snapshot.
//! No lock is ever held across an `.await`.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::broadcast;

use crisiswatch_domain::automation::AutomationInstance;
use crisiswatch_domain::catalog::{AutomationCatalog, AutomationDefinition};
use crisiswatch_domain::crisis::CrisisEvent;
use crisiswatch_domain::draft::EmailDraft;
use crisiswatch_domain::error::ValidationError;
use crisiswatch_domain::id::{RunId, SessionId};
use crisiswatch_domain::log::{EventLog, LogEntry, LogSeverity};
use crisiswatch_domain::scan::ScanState;
use crisiswatch_domain::time::Timestamp;

use crate::log_bus::LogBus;

const LOG_BUS_CAPACITY: usize = 256;

/// Where the workflow runner currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    #[default]
    Idle,
    RunningAutomations,
    Drafting,
    Dispatching,
    UpdatingCompliance,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::RunningAutomations => "running_automations",
            Self::Drafting => "drafting",
            Self::Dispatching => "dispatching",
            Self::UpdatingCompliance => "updating_compliance",
        })
    }
}

/// The crisis currently being handled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveRun {
    pub run_id: RunId,
    pub crisis: CrisisEvent,
    pub started_at: Timestamp,
    /// Key of the automation whose steps are executing.
    pub current_automation: Option<String>,
    /// Steps completed within the current automation.
    pub completed_steps: usize,
    /// Automations finished so far, pseudo-automations included.
    pub completed_automations: usize,
    pub total_automations: usize,
}

/// Serializable point-in-time view of a [`Session`].
#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    pub session_id: SessionId,
    pub phase: RunPhase,
    pub automation_instances: Vec<AutomationInstance>,
    pub active_run: Option<ActiveRun>,
    pub log_tail: Vec<LogEntry>,
    pub draft: Option<EmailDraft>,
    pub scan_state: ScanState,
}

struct SessionData {
    log: EventLog,
    instances: Vec<AutomationInstance>,
    active_run: Option<ActiveRun>,
    draft: Option<EmailDraft>,
    phase: RunPhase,
    scan: ScanState,
}

/// Shared, mutex-guarded session.
pub struct Session {
    id: SessionId,
    data: Mutex<SessionData>,
    bus: LogBus,
}

impl Session {
    /// A fresh session with one idle instance per catalog definition.
    #[must_use]
    pub fn new(catalog: &AutomationCatalog, interval_seconds: u64) -> Self {
        let instances = catalog
            .definitions()
            .into_iter()
            .map(AutomationInstance::idle)
            .collect();
        Self {
            id: SessionId::new(),
            data: Mutex::new(SessionData {
                log: EventLog::new(),
                instances,
                active_run: None,
                draft: None,
                phase: RunPhase::Idle,
                scan: ScanState::stopped(interval_seconds),
            }),
            bus: LogBus::new(LOG_BUS_CAPACITY),
        }
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    fn data(&self) -> MutexGuard<'_, SessionData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Event log ─────────────────────────────────────────────────

    /// Append a line to the event log and publish it to live subscribers.
    pub fn log(
        &self,
        severity: LogSeverity,
        message: impl Into<String>,
        prefix: Option<&str>,
    ) -> LogEntry {
        let entry = self.data().log.append(severity, message, prefix);
        self.bus.publish(entry.clone());
        entry
    }

    pub fn clear_log(&self) {
        self.data().log.clear();
    }

    /// Every entry currently in the log.
    #[must_use]
    pub fn log_entries(&self) -> Vec<LogEntry> {
        self.data().log.snapshot().to_vec()
    }

    /// Receive entries appended after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.bus.subscribe()
    }

    // ── Automation instances ──────────────────────────────────────

    /// Apply `f` to the instance for `definition.key`, creating it first when
    /// the key has never run before.
    ///
    /// # Errors
    ///
    /// Propagates the [`ValidationError`] returned by `f`.
    pub fn update_instance<T>(
        &self,
        definition: &AutomationDefinition,
        f: impl FnOnce(&mut AutomationInstance) -> Result<T, ValidationError>,
    ) -> Result<T, ValidationError> {
        let mut data = self.data();
        let position = data
            .instances
            .iter()
            .position(|instance| instance.key == definition.key);
        let index = match position {
            Some(index) => index,
            None => {
                data.instances.push(AutomationInstance::idle(definition));
                data.instances.len() - 1
            }
        };
        f(&mut data.instances[index])
    }

    #[must_use]
    pub fn instance(&self, key: &str) -> Option<AutomationInstance> {
        self.data()
            .instances
            .iter()
            .find(|instance| instance.key == key)
            .cloned()
    }

    // ── Run bookkeeping ───────────────────────────────────────────

    pub fn set_phase(&self, phase: RunPhase) {
        self.data().phase = phase;
    }

    #[must_use]
    pub fn phase(&self) -> RunPhase {
        self.data().phase
    }

    pub fn begin_run(&self, run: ActiveRun) {
        let mut data = self.data();
        data.active_run = Some(run);
        data.draft = None;
    }

    pub fn update_run(&self, f: impl FnOnce(&mut ActiveRun)) {
        if let Some(run) = self.data().active_run.as_mut() {
            f(run);
        }
    }

    /// Drop the active run and return to [`RunPhase::Idle`].
    pub fn finish_run(&self) {
        let mut data = self.data();
        data.active_run = None;
        data.phase = RunPhase::Idle;
    }

    pub fn set_draft(&self, draft: EmailDraft) {
        self.data().draft = Some(draft);
    }

    pub fn update_draft(&self, f: impl FnOnce(&mut EmailDraft)) {
        if let Some(draft) = self.data().draft.as_mut() {
            f(draft);
        }
    }

    // ── Scan metadata ─────────────────────────────────────────────

    /// Set the busy flag if it is clear. Returns whether this call set it.
    #[must_use]
    pub fn try_mark_busy(&self) -> bool {
        let mut data = self.data();
        if data.scan.busy {
            return false;
        }
        data.scan.busy = true;
        true
    }

    pub fn clear_busy(&self) {
        self.data().scan.busy = false;
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.data().scan.busy
    }

    pub fn record_scan(&self, at: Timestamp, emails_checked: u32) {
        let mut data = self.data();
        data.scan.last_scan_at = Some(at);
        data.scan.emails_checked = emails_checked;
    }

    pub fn set_schedule(&self, enabled: bool, interval_seconds: u64) {
        let mut data = self.data();
        data.scan.enabled = enabled;
        data.scan.interval_seconds = interval_seconds;
    }

    #[must_use]
    pub fn scan_state(&self) -> ScanState {
        self.data().scan.clone()
    }

    /// Consistent snapshot including the last `log_tail` log entries.
    #[must_use]
    pub fn snapshot(&self, log_tail: usize) -> SessionState {
        let data = self.data();
        SessionState {
            session_id: self.id,
            phase: data.phase,
            automation_instances: data.instances.clone(),
            active_run: data.active_run.clone(),
            log_tail: data.log.tail(log_tail).to_vec(),
            draft: data.draft.clone(),
            scan_state: data.scan.clone(),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("id", &self.id).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crisiswatch_domain::automation::AutomationStatus;

    fn session() -> Session {
        Session::new(&AutomationCatalog::builtin(), 30)
    }

    #[test]
    fn should_start_with_one_idle_instance_per_definition() {
        let catalog = AutomationCatalog::builtin();
        let session = Session::new(&catalog, 30);
        let state = session.snapshot(10);
        assert_eq!(state.automation_instances.len(), catalog.definitions().len());
        assert!(
            state
                .automation_instances
                .iter()
                .all(|i| i.status == AutomationStatus::Idle)
        );
        assert_eq!(state.phase, RunPhase::Idle);
        assert!(state.active_run.is_none());
        assert!(!state.scan_state.enabled);
    }

    #[test]
    fn should_create_instance_for_unknown_key_on_first_update() {
        let catalog = AutomationCatalog::builtin();
        let session = Session::new(&catalog, 30);
        let definition = catalog.lookup("water_shutoff");
        session
            .update_instance(&definition, |i| i.begin_run(&definition))
            .unwrap();
        let instance = session.instance("water_shutoff").unwrap();
        assert_eq!(instance.status, AutomationStatus::Running);
        assert_eq!(instance.name, "Water Shutoff");
    }

    #[test]
    fn should_grant_busy_flag_only_once() {
        let session = session();
        assert!(session.try_mark_busy());
        assert!(!session.try_mark_busy());
        session.clear_busy();
        assert!(session.try_mark_busy());
    }

    #[test]
    fn should_limit_snapshot_to_log_tail() {
        let session = session();
        for i in 0..10 {
            session.log(LogSeverity::Info, format!("line {i}"), None);
        }
        let state = session.snapshot(3);
        let messages: Vec<_> = state.log_tail.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, ["line 7", "line 8", "line 9"]);
        assert_eq!(session.log_entries().len(), 10);
    }

    #[tokio::test]
    async fn should_publish_appended_entries_to_subscribers() {
        let session = session();
        let mut rx = session.subscribe();
        session.log(LogSeverity::Success, "done", Some("✓"));
        let entry = rx.recv().await.unwrap();
        assert_eq!(entry.message, "done");
        assert_eq!(entry.prefix, "✓");
    }

    #[test]
    fn should_serialize_snapshot_with_snake_case_phase() {
        let session = session();
        session.set_phase(RunPhase::UpdatingCompliance);
        let json = serde_json::to_value(session.snapshot(5)).unwrap();
        assert_eq!(json["phase"], "updating_compliance");
        assert_eq!(json["scan_state"]["interval_seconds"], 30);
    }
}
