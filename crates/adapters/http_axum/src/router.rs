//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crisiswatch_app::ports::{
    ComplianceRecorder, CrisisDetector, ResponseDispatcher, StepExecutor,
};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Nests API routes under `/api`. Includes a [`TraceLayer`] that logs each
/// HTTP request/response at the `DEBUG` level using the `tracing` ecosystem.
pub fn build<DT, X, D, K>(state: AppState<DT, X, D, K>) -> Router
where
    DT: CrisisDetector + Send + Sync + 'static,
    X: StepExecutor + Send + Sync + 'static,
    D: ResponseDispatcher + Send + Sync + 'static,
    K: ComplianceRecorder + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use crisiswatch_app::scanner::Scanner;
    use crisiswatch_app::session::Session;
    use crisiswatch_app::workflow_runner::WorkflowRunner;
    use crisiswatch_domain::catalog::{AutomationCatalog, StepTemplate};
    use crisiswatch_domain::crisis::{CrisisEvent, DetectionOutcome};
    use crisiswatch_domain::error::{
        ComplianceUpdateError, DetectionError, DispatchError, StepError,
    };
    use crisiswatch_domain::log::LogSeverity;
    use tower::ServiceExt;

    struct StubDetector;
    struct StubExecutor;
    struct StubDispatcher;
    struct StubCompliance;

    impl CrisisDetector for StubDetector {
        async fn check_for_crisis(&self) -> Result<DetectionOutcome, DetectionError> {
            Ok(DetectionOutcome::clear(4))
        }
        async fn reset_dedup_cache(&self) -> Result<(), DetectionError> {
            Ok(())
        }
    }

    impl StepExecutor for StubExecutor {
        async fn perform(
            &self,
            _automation_key: &str,
            _step: &StepTemplate,
            _crisis: &CrisisEvent,
        ) -> Result<(), StepError> {
            Ok(())
        }
    }

    impl ResponseDispatcher for StubDispatcher {
        async fn send_response(
            &self,
            _content: &str,
            _recipient: &str,
            _subject: &str,
        ) -> Result<(), DispatchError> {
            Ok(())
        }
    }

    impl ComplianceRecorder for StubCompliance {
        async fn record_crisis_outcome(
            &self,
            _crisis: &CrisisEvent,
            _executed: &[String],
        ) -> Result<(), ComplianceUpdateError> {
            Ok(())
        }
    }

    type TestState = AppState<StubDetector, StubExecutor, StubDispatcher, StubCompliance>;

    fn test_state() -> TestState {
        let catalog = Arc::new(AutomationCatalog::builtin());
        let session = Arc::new(Session::new(&catalog, 30));
        let runner = WorkflowRunner::new(
            catalog,
            session,
            StubExecutor,
            StubDispatcher,
            StubCompliance,
        );
        AppState::new(Arc::new(Scanner::new(StubDetector, runner)))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn should_return_ok_when_health_check() {
        let app = build(test_state());

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn should_return_idle_session_snapshot() {
        let state = test_state();
        for i in 0..5 {
            state.session.log(LogSeverity::Info, format!("line {i}"), None);
        }
        let app = build(state);

        let response = app
            .oneshot(
                Request::get("/api/session?log_tail=2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["phase"], "idle");
        assert_eq!(json["log_tail"].as_array().unwrap().len(), 2);
        assert_eq!(json["log_tail"][1]["message"], "line 4");
        assert_eq!(json["scan_state"]["busy"], false);
    }

    #[tokio::test]
    async fn should_list_catalog_in_id_order() {
        let app = build(test_state());

        let response = app
            .oneshot(Request::get("/api/catalog").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let definitions = json.as_array().unwrap();
        assert_eq!(
            definitions.len(),
            AutomationCatalog::builtin().definitions().len()
        );
        assert_eq!(definitions[0]["id"], 1);
        assert_eq!(definitions[0]["key"], "emergency_hiring");
    }

    #[tokio::test]
    async fn should_return_outcome_when_scan_requested() {
        let app = build(test_state());

        let response = app.oneshot(post_json("/api/scan", "")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["outcome"], "no_crisis");
        assert_eq!(json["emails_checked"], 4);
    }

    #[tokio::test]
    async fn should_return_conflict_when_scan_requested_while_busy() {
        let state = test_state();
        assert!(state.session.try_mark_busy());
        let app = build(state);

        let response = app.oneshot(post_json("/api/scan", "")).await.unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(response).await["outcome"], "skipped");
    }

    #[tokio::test]
    async fn should_reject_zero_interval_when_starting_scanner() {
        let app = build(test_state());

        let response = app
            .oneshot(post_json("/api/scanner/start", r#"{"interval_seconds":0}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_toggle_schedule_when_scanner_started_and_stopped() {
        let state = test_state();
        let app = build(state.clone());

        let response = app
            .clone()
            .oneshot(post_json("/api/scanner/start", r#"{"interval_seconds":12}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["enabled"], true);
        assert_eq!(json["interval_seconds"], 12);

        let response = app
            .oneshot(post_json("/api/scanner/stop", ""))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["enabled"], false);
        assert!(!state.scanner.is_running());
    }

    #[tokio::test]
    async fn should_open_event_stream_for_log() {
        let app = build(test_state());

        let response = app
            .oneshot(Request::get("/api/log/stream").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/event-stream"
        );
    }
}
