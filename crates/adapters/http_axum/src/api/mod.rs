//! JSON API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod catalog;
#[allow(clippy::missing_errors_doc)]
pub mod scan;
#[allow(clippy::missing_errors_doc)]
pub mod session;
pub mod sse;

use axum::Router;
use axum::routing::{get, post};

use crisiswatch_app::ports::{
    ComplianceRecorder, CrisisDetector, ResponseDispatcher, StepExecutor,
};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<DT, X, D, K>() -> Router<AppState<DT, X, D, K>>
where
    DT: CrisisDetector + Send + Sync + 'static,
    X: StepExecutor + Send + Sync + 'static,
    D: ResponseDispatcher + Send + Sync + 'static,
    K: ComplianceRecorder + Send + Sync + 'static,
{
    Router::new()
        // Observation
        .route("/session", get(session::get::<DT, X, D, K>))
        .route("/catalog", get(catalog::list::<DT, X, D, K>))
        .route("/log/stream", get(sse::stream::<DT, X, D, K>))
        // Scans
        .route("/scan", post(scan::scan_now::<DT, X, D, K>))
        .route("/scan/reset", post(scan::reset_and_scan::<DT, X, D, K>))
        // Scanner schedule
        .route("/scanner/start", post(scan::start::<DT, X, D, K>))
        .route("/scanner/stop", post(scan::stop::<DT, X, D, K>))
}
