//! Session snapshot handler.

use axum::Json;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crisiswatch_app::ports::{
    ComplianceRecorder, CrisisDetector, ResponseDispatcher, StepExecutor,
};
use crisiswatch_app::session::SessionState;

use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SessionQuery {
    /// Number of trailing log entries to include.
    pub log_tail: Option<usize>,
}

/// Possible responses from the session endpoint.
pub enum GetResponse {
    Ok(Json<SessionState>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/session`: current session snapshot.
pub async fn get<DT, X, D, K>(
    State(state): State<AppState<DT, X, D, K>>,
    Query(query): Query<SessionQuery>,
) -> GetResponse
where
    DT: CrisisDetector + Send + Sync + 'static,
    X: StepExecutor + Send + Sync + 'static,
    D: ResponseDispatcher + Send + Sync + 'static,
    K: ComplianceRecorder + Send + Sync + 'static,
{
    let log_tail = query.log_tail.unwrap_or(state.log_tail);
    GetResponse::Ok(Json(state.session.snapshot(log_tail)))
}
