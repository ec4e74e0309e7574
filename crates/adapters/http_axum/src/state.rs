//! Shared application state for axum handlers.

use std::sync::Arc;

use crisiswatch_app::ports::{
    ComplianceRecorder, CrisisDetector, ResponseDispatcher, StepExecutor,
};
use crisiswatch_app::scanner::Scanner;
use crisiswatch_app::session::Session;
use crisiswatch_domain::catalog::AutomationCatalog;

/// Log entries included in a session snapshot when the caller does not ask.
pub const DEFAULT_LOG_TAIL: usize = 200;

/// Application state shared across all axum handlers.
///
/// Generic over the port implementations wired into the scanner to avoid
/// dynamic dispatch. `Clone` is implemented manually so the underlying types
/// themselves do not need to be `Clone`; only the `Arc` wrappers are cloned.
pub struct AppState<DT, X, D, K> {
    pub scanner: Arc<Scanner<DT, X, D, K>>,
    pub session: Arc<Session>,
    pub catalog: Arc<AutomationCatalog>,
    /// Default `log_tail` for `GET /api/session`.
    pub log_tail: usize,
}

impl<DT, X, D, K> Clone for AppState<DT, X, D, K> {
    fn clone(&self) -> Self {
        Self {
            scanner: Arc::clone(&self.scanner),
            session: Arc::clone(&self.session),
            catalog: Arc::clone(&self.catalog),
            log_tail: self.log_tail,
        }
    }
}

impl<DT, X, D, K> AppState<DT, X, D, K>
where
    DT: CrisisDetector + Send + Sync + 'static,
    X: StepExecutor + Send + Sync + 'static,
    D: ResponseDispatcher + Send + Sync + 'static,
    K: ComplianceRecorder + Send + Sync + 'static,
{
    /// Build the state around an already shared scanner.
    ///
    /// The session and catalog are taken from the scanner so handlers always
    /// observe the instance the scanner writes to.
    pub fn new(scanner: Arc<Scanner<DT, X, D, K>>) -> Self {
        let session = Arc::clone(scanner.session());
        let catalog = Arc::clone(scanner.runner().catalog());
        Self {
            scanner,
            session,
            catalog,
            log_tail: DEFAULT_LOG_TAIL,
        }
    }

    #[must_use]
    pub fn with_log_tail(mut self, log_tail: usize) -> Self {
        self.log_tail = log_tail;
        self
    }
}
