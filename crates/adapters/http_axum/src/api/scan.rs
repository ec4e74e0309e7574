//! Scan and scanner-schedule handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crisiswatch_app::ports::{
    ComplianceRecorder, CrisisDetector, ResponseDispatcher, StepExecutor,
};
use crisiswatch_app::scanner::ScanOutcome;
use crisiswatch_domain::scan::ScanState;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for starting the scanner.
#[derive(Debug, Default, Deserialize)]
pub struct StartRequest {
    /// Keeps the current interval when absent.
    pub interval_seconds: Option<u64>,
}

/// Possible responses from the scan endpoints.
pub enum ScanResponse {
    Ok(Json<ScanOutcome>),
    /// Another scan or run was in flight.
    Conflict(Json<ScanOutcome>),
}

impl From<ScanOutcome> for ScanResponse {
    fn from(outcome: ScanOutcome) -> Self {
        match outcome {
            ScanOutcome::Skipped => Self::Conflict(Json(outcome)),
            other => Self::Ok(Json(other)),
        }
    }
}

impl IntoResponse for ScanResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
            Self::Conflict(json) => (StatusCode::CONFLICT, json).into_response(),
        }
    }
}

/// Possible responses from the scanner schedule endpoints.
pub enum ScheduleResponse {
    Ok(Json<ScanState>),
}

impl IntoResponse for ScheduleResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `POST /api/scan`: clear the log and check the inbox now.
pub async fn scan_now<DT, X, D, K>(State(state): State<AppState<DT, X, D, K>>) -> ScanResponse
where
    DT: CrisisDetector + Send + Sync + 'static,
    X: StepExecutor + Send + Sync + 'static,
    D: ResponseDispatcher + Send + Sync + 'static,
    K: ComplianceRecorder + Send + Sync + 'static,
{
    state.scanner.scan_now().await.into()
}

/// `POST /api/scan/reset`: forget processed emails, then scan.
pub async fn reset_and_scan<DT, X, D, K>(
    State(state): State<AppState<DT, X, D, K>>,
) -> ScanResponse
where
    DT: CrisisDetector + Send + Sync + 'static,
    X: StepExecutor + Send + Sync + 'static,
    D: ResponseDispatcher + Send + Sync + 'static,
    K: ComplianceRecorder + Send + Sync + 'static,
{
    state.scanner.reset_and_scan().await.into()
}

/// `POST /api/scanner/start`: start or restart periodic scanning.
pub async fn start<DT, X, D, K>(
    State(state): State<AppState<DT, X, D, K>>,
    Json(req): Json<StartRequest>,
) -> Result<ScheduleResponse, ApiError>
where
    DT: CrisisDetector + Send + Sync + 'static,
    X: StepExecutor + Send + Sync + 'static,
    D: ResponseDispatcher + Send + Sync + 'static,
    K: ComplianceRecorder + Send + Sync + 'static,
{
    let interval_seconds = req
        .interval_seconds
        .unwrap_or_else(|| state.session.scan_state().interval_seconds);
    state.scanner.start(interval_seconds)?;
    Ok(ScheduleResponse::Ok(Json(state.session.scan_state())))
}

/// `POST /api/scanner/stop`: cancel periodic scanning.
pub async fn stop<DT, X, D, K>(State(state): State<AppState<DT, X, D, K>>) -> ScheduleResponse
where
    DT: CrisisDetector + Send + Sync + 'static,
    X: StepExecutor + Send + Sync + 'static,
    D: ResponseDispatcher + Send + Sync + 'static,
    K: ComplianceRecorder + Send + Sync + 'static,
{
    state.scanner.stop();
    ScheduleResponse::Ok(Json(state.session.scan_state()))
}
