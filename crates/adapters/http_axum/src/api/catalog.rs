//! Automation catalog handler.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};

use crisiswatch_app::ports::{
    ComplianceRecorder, CrisisDetector, ResponseDispatcher, StepExecutor,
};
use crisiswatch_domain::catalog::AutomationDefinition;

use crate::state::AppState;

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<AutomationDefinition>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/catalog`: registered automation definitions, ordered by id.
pub async fn list<DT, X, D, K>(State(state): State<AppState<DT, X, D, K>>) -> ListResponse
where
    DT: CrisisDetector + Send + Sync + 'static,
    X: StepExecutor + Send + Sync + 'static,
    D: ResponseDispatcher + Send + Sync + 'static,
    K: ComplianceRecorder + Send + Sync + 'static,
{
    let definitions = state.catalog.definitions().into_iter().cloned().collect();
    ListResponse::Ok(Json(definitions))
}
