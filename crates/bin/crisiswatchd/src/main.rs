//! # crisiswatchd: crisiswatch daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Initialize `tracing` output
//! - Construct the collaborator adapters for the selected backend mode
//! - Construct the session, workflow runner and scanner, injecting adapters
//!   via port traits
//! - Build the axum router around the scanner
//! - Start the periodic scan, bind to a TCP port and serve
//! - Handle graceful shutdown (SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crisiswatch_adapter_backend_http::BackendClient;
use crisiswatch_adapter_http_axum::state::AppState;
use crisiswatch_adapter_virtual::{Outbox, PacedStepExecutor, VirtualInbox};
use crisiswatch_app::ports::{
    ComplianceRecorder, CrisisDetector, ResponseDispatcher, StepExecutor,
};
use crisiswatch_app::scanner::Scanner;
use crisiswatch_app::session::Session;
use crisiswatch_app::workflow_runner::{RunnerConfig, WorkflowRunner};
use crisiswatch_domain::catalog::AutomationCatalog;

use config::{BackendMode, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    let catalog = Arc::new(AutomationCatalog::builtin());
    let session = Arc::new(Session::new(&catalog, config.scanner.interval_secs));
    let executor = PacedStepExecutor::new(config.runner.step_pace_percent);

    match config.backend.mode {
        BackendMode::Http => {
            let client = BackendClient::new(&config.backend.http)?;
            tracing::info!(base_url = client.base_url(), "using crisis backend");
            let runner = build_runner(
                &config,
                catalog,
                session,
                executor,
                client.clone(),
                client.clone(),
            );
            serve(&config, build_scanner(&config, client, runner)).await
        }
        BackendMode::Virtual => {
            tracing::info!("using virtual inbox and outbox");
            let outbox = Arc::new(Outbox::default());
            let runner = build_runner(
                &config,
                catalog,
                session,
                executor,
                Arc::clone(&outbox),
                outbox,
            );
            serve(
                &config,
                build_scanner(&config, VirtualInbox::with_demo_messages(), runner),
            )
            .await
        }
    }
}

fn build_runner<X, D, K>(
    config: &Config,
    catalog: Arc<AutomationCatalog>,
    session: Arc<Session>,
    executor: X,
    dispatcher: D,
    compliance: K,
) -> WorkflowRunner<X, D, K>
where
    X: StepExecutor + Send + Sync,
    D: ResponseDispatcher + Send + Sync,
    K: ComplianceRecorder + Send + Sync,
{
    WorkflowRunner::new(catalog, session, executor, dispatcher, compliance).with_config(
        RunnerConfig {
            step_timeout_factor: config.runner.step_timeout_factor,
        },
    )
}

fn build_scanner<DT, X, D, K>(
    config: &Config,
    detector: DT,
    runner: WorkflowRunner<X, D, K>,
) -> Scanner<DT, X, D, K>
where
    DT: CrisisDetector + Send + Sync + 'static,
    X: StepExecutor + Send + Sync + 'static,
    D: ResponseDispatcher + Send + Sync + 'static,
    K: ComplianceRecorder + Send + Sync + 'static,
{
    Scanner::new(detector, runner)
        .with_initial_delay(Duration::from_secs(config.scanner.initial_delay_secs))
}

async fn serve<DT, X, D, K>(
    config: &Config,
    scanner: Scanner<DT, X, D, K>,
) -> Result<(), Box<dyn std::error::Error>>
where
    DT: CrisisDetector + Send + Sync + 'static,
    X: StepExecutor + Send + Sync + 'static,
    D: ResponseDispatcher + Send + Sync + 'static,
    K: ComplianceRecorder + Send + Sync + 'static,
{
    let scanner = Arc::new(scanner);
    if config.scanner.enabled {
        scanner.start(config.scanner.interval_secs)?;
        tracing::info!(
            interval_secs = config.scanner.interval_secs,
            "periodic scan started"
        );
    }

    let state = AppState::new(Arc::clone(&scanner)).with_log_tail(config.runner.log_tail);
    let app = crisiswatch_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "crisiswatchd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scanner.stop();
    tracing::info!("crisiswatchd stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to listen for shutdown signal");
    }
}
