use crate::cli::ServeArgs;
use crate::infra::{AppState, FraudStorage, LoanStorage};
use crate::routes::{with_fraud_routes, with_loan_routes};
use axum::{Extension, Router};
use axum_prometheus::PrometheusMetricLayer;
use loan_desk::config::{AppConfig, ServerConfig};
use loan_desk::error::AppError;
use loan_desk::fraud::{FraudAuthorityClient, FraudDecisionService};
use loan_desk::loans::LoanOrchestrator;
use loan_desk::telemetry;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};

fn apply_overrides(server: &mut ServerConfig, args: &mut ServeArgs) {
    if let Some(host) = args.host.take() {
        server.host = host;
    }
    if let Some(port) = args.port.take() {
        server.port = port;
    }
}

pub(crate) async fn run_fraud_authority(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    apply_overrides(&mut config.fraud_server, &mut args);
    telemetry::init(&config.telemetry)?;

    let store = Arc::new(FraudStorage::open(config.storage.fraud_database.as_deref())?);
    let service = Arc::new(FraudDecisionService::new(store));

    serve(
        "fraud-authority",
        &config,
        &config.fraud_server,
        with_fraud_routes(service),
    )
    .await
}

pub(crate) async fn run_loan_intake(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    apply_overrides(&mut config.loan_server, &mut args);
    telemetry::init(&config.telemetry)?;

    let store = Arc::new(LoanStorage::open(config.storage.loan_database.as_deref())?);
    let fraud = FraudAuthorityClient::from_config(&config.fraud_authority)?;
    info!(
        authority = fraud.base_url(),
        timeout_ms = config.fraud_authority.timeout.as_millis() as u64,
        "fraud authority client configured"
    );
    let orchestrator = Arc::new(LoanOrchestrator::new(fraud, store));

    serve(
        "loan-intake",
        &config,
        &config.loan_server,
        with_loan_routes(orchestrator),
    )
    .await
}

async fn serve(
    service: &'static str,
    config: &AppConfig,
    server: &ServerConfig,
    routes: Router,
) -> Result<(), AppError> {
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        service,
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = routes
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, service, "listening");

    let shutdown_flag = readiness_flag.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            wait_for_shutdown(tokio::signal::ctrl_c(), service).await;
            shutdown_flag.store(false, Ordering::Release);
            info!(service, "shutting down");
        })
        .await?;
    Ok(())
}

/// Resolves once the shutdown signal fires. If the handler cannot be installed the
/// server keeps running until the process is killed.
async fn wait_for_shutdown<F>(signal: F, service: &'static str)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(err) = signal.await {
        error!(service, error = %err, "failed to install shutdown signal handler");
        std::future::pending::<()>().await;
    }
}
