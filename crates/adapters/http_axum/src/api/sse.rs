//! Server-Sent Events (SSE) stream of the event log.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use crisiswatch_app::ports::{
    ComplianceRecorder, CrisisDetector, ResponseDispatcher, StepExecutor,
};

use crate::state::AppState;

/// `GET /api/log/stream`: SSE stream of log entries as they are appended.
///
/// Each entry is sent as a JSON `data:` frame with the entry's severity as
/// the SSE event name. Entries appended before the subscription are not
/// replayed; fetch `/api/session` for those.
pub async fn stream<DT, X, D, K>(
    State(state): State<AppState<DT, X, D, K>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>>
where
    DT: CrisisDetector + Send + Sync + 'static,
    X: StepExecutor + Send + Sync + 'static,
    D: ResponseDispatcher + Send + Sync + 'static,
    K: ComplianceRecorder + Send + Sync + 'static,
{
    let entries = BroadcastStream::new(state.session.subscribe()).filter_map(|result| {
        match result {
            Ok(entry) => match serde_json::to_string(&entry) {
                Ok(json) => Some(Ok(Event::default()
                    .event(entry.severity.to_string())
                    .id(entry.sequence.to_string())
                    .data(json))),
                Err(err) => {
                    tracing::warn!(%err, "failed to serialize log entry for SSE stream");
                    None
                }
            },
            Err(BroadcastStreamRecvError::Lagged(n)) => {
                tracing::warn!(skipped = n, "SSE subscriber lagged, some log entries were dropped");
                None
            }
        }
    });

    Sse::new(entries).keep_alive(KeepAlive::default())
}
