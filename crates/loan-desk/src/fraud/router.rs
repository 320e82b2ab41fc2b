use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::domain::CustomerId;
use super::service::FraudDecisionService;
use super::store::FraudLookupStore;

pub const FRAUD_CHECK_PATH: &str = "/fraud/check";

#[derive(Debug, Deserialize)]
pub struct FraudCheckParams {
    #[serde(rename = "customerId")]
    pub customer_id: CustomerId,
}

/// Router exposing the fraud decision over `GET /fraud/check?customerId=<int>`.
pub fn fraud_router<S>(service: Arc<FraudDecisionService<S>>) -> Router
where
    S: FraudLookupStore + 'static,
{
    Router::new()
        .route(FRAUD_CHECK_PATH, get(check_handler::<S>))
        .with_state(service)
}

pub(crate) async fn check_handler<S>(
    State(service): State<Arc<FraudDecisionService<S>>>,
    Query(params): Query<FraudCheckParams>,
) -> Response
where
    S: FraudLookupStore + 'static,
{
    info!(customer_id = %params.customer_id, "checking for fraud");
    match service.decide(params.customer_id).await {
        Ok(verdict) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            verdict.as_str(),
        )
            .into_response(),
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
