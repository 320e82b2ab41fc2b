use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tracing::warn;

use super::domain::LoanApplication;
use super::repository::LoanStore;
use super::service::LoanOrchestrator;

pub const LOAN_PATH: &str = "/loan";

/// Router exposing loan listing and application intake.
pub fn loan_router<S>(orchestrator: Arc<LoanOrchestrator<S>>) -> Router
where
    S: LoanStore + 'static,
{
    Router::new()
        .route(
            LOAN_PATH,
            get(list_handler::<S>).post(apply_handler::<S>),
        )
        .with_state(orchestrator)
}

pub(crate) async fn list_handler<S>(
    State(orchestrator): State<Arc<LoanOrchestrator<S>>>,
) -> Response
where
    S: LoanStore + 'static,
{
    match orchestrator.list_all_loans().await {
        Ok(loans) => (StatusCode::OK, Json(loans)).into_response(),
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn apply_handler<S>(
    State(orchestrator): State<Arc<LoanOrchestrator<S>>>,
    Json(application): Json<LoanApplication>,
) -> Response
where
    S: LoanStore + 'static,
{
    // Outcome travels in the message; the status is 200 either way.
    let message = match orchestrator.apply_loan(application).await {
        Ok(receipt) => receipt.message(),
        Err(error) => {
            warn!(kind = error.kind(), %error, "loan application failed");
            format!("Loan application failed: {error}")
        }
    };
    (StatusCode::OK, message).into_response()
}
