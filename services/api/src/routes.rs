use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json, Router};
use loan_desk::fraud::{fraud_router, FraudDecisionService, FraudLookupStore};
use loan_desk::loans::{loan_router, LoanOrchestrator, LoanStore};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_fraud_routes<S>(service: Arc<FraudDecisionService<S>>) -> Router
where
    S: FraudLookupStore + 'static,
{
    with_probe_routes(fraud_router(service))
}

pub(crate) fn with_loan_routes<S>(orchestrator: Arc<LoanOrchestrator<S>>) -> Router
where
    S: LoanStore + 'static,
{
    with_probe_routes(loan_router(orchestrator))
}

fn with_probe_routes(router: Router) -> Router {
    router
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready", "service": state.service })
    } else {
        json!({ "status": "initializing", "service": state.service })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::FraudStorage;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    fn state(ready: bool) -> AppState {
        let recorder = PrometheusBuilder::new().build_recorder();
        AppState {
            service: "fraud-authority",
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(recorder.handle()),
        }
    }

    fn fraud_app(state: AppState) -> Router {
        let store = Arc::new(FraudStorage::open(None).expect("memory store"));
        with_fraud_routes(Arc::new(FraudDecisionService::new(store))).layer(Extension(state))
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn readiness_tracks_flag() {
        let state = state(false);
        let app = fraud_app(state.clone());

        let response = app
            .clone()
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        state.readiness.store(true, Ordering::Release);
        let response = app
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn fraud_app_serves_check_alongside_probes() {
        let app = fraud_app(state(true));

        let response = app
            .oneshot(
                Request::get("/fraud/check?customerId=7")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        assert_eq!(&body[..], b"APPROVED");
    }

    #[tokio::test]
    async fn metrics_endpoint_uses_prometheus_content_type() {
        let response = metrics_endpoint(Extension(state(true))).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain; version=0.0.4"
        );
    }
}
