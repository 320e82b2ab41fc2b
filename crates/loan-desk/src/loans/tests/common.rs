use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;

use crate::fraud::{
    fraud_router, CustomerId, FraudAuthorityClient, FraudDecisionService, FraudRecord,
    FraudTransport, TransportError, TransportResponse, Verdict,
};
use crate::loans::{Loan, LoanApplication, LoanId, LoanOrchestrator, LoanStore, NewLoan};
use crate::storage::{InMemoryFraudStore, InMemoryLoanStore, StorageError};

pub(super) const AUTHORITY_URL: &str = "http://fraud.test:8081";

/// Serves fraud checks from an in-process fraud router instead of the network.
pub(super) struct RouterTransport {
    router: Router,
    pub(super) calls: Mutex<usize>,
}

impl RouterTransport {
    pub(super) fn new(store: InMemoryFraudStore) -> Self {
        let service = Arc::new(FraudDecisionService::new(Arc::new(store)));
        Self {
            router: fraud_router(service),
            calls: Mutex::new(0),
        }
    }
}

#[async_trait]
impl FraudTransport for RouterTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
        *self.calls.lock().unwrap() += 1;
        let path = url
            .strip_prefix(AUTHORITY_URL)
            .ok_or_else(|| TransportError::Request(format!("unknown host in {url}")))?;
        let response = self
            .router
            .clone()
            .oneshot(Request::get(path).body(Body::empty()).unwrap())
            .await
            .map_err(|err| TransportError::Request(err.to_string()))?;
        let status = response.status().as_u16();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|err| TransportError::Request(err.to_string()))?;
        Ok(TransportResponse {
            status,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

/// Replies with the same canned response to every request.
pub(super) struct StaticTransport {
    pub(super) status: u16,
    pub(super) body: String,
}

#[async_trait]
impl FraudTransport for StaticTransport {
    async fn get(&self, _url: &str) -> Result<TransportResponse, TransportError> {
        Ok(TransportResponse {
            status: self.status,
            body: self.body.clone(),
        })
    }
}

/// Stands in for an authority that cannot be reached.
pub(super) struct UnreachableTransport;

#[async_trait]
impl FraudTransport for UnreachableTransport {
    async fn get(&self, _url: &str) -> Result<TransportResponse, TransportError> {
        Err(TransportError::Request("connection refused".to_string()))
    }
}

/// Loan store whose writes always fail.
#[derive(Default)]
pub(super) struct ReadOnlyLoanStore {
    inner: InMemoryLoanStore,
}

impl LoanStore for ReadOnlyLoanStore {
    fn find_all(&self) -> Result<Vec<Loan>, StorageError> {
        self.inner.find_all()
    }

    fn save(&self, _loan: NewLoan) -> Result<LoanId, StorageError> {
        Err(StorageError::Unavailable("disk full".to_string()))
    }
}

/// Loan store that cannot be reached at all.
pub(super) struct UnavailableLoanStore;

impl LoanStore for UnavailableLoanStore {
    fn find_all(&self) -> Result<Vec<Loan>, StorageError> {
        Err(StorageError::Unavailable("connection refused".to_string()))
    }

    fn save(&self, _loan: NewLoan) -> Result<LoanId, StorageError> {
        Err(StorageError::Unavailable("connection refused".to_string()))
    }
}

pub(super) fn fraud_store_flagging(customer: i32) -> InMemoryFraudStore {
    InMemoryFraudStore::with_records([FraudRecord::new(
        1,
        "fr-0001",
        CustomerId(customer),
        Verdict::Rejected,
    )])
}

pub(super) fn client_over(transport: Arc<dyn FraudTransport>) -> FraudAuthorityClient {
    FraudAuthorityClient::new(AUTHORITY_URL, transport)
}

pub(super) fn build_orchestrator(
    fraud: InMemoryFraudStore,
) -> (
    LoanOrchestrator<InMemoryLoanStore>,
    Arc<InMemoryLoanStore>,
    Arc<RouterTransport>,
) {
    let transport = Arc::new(RouterTransport::new(fraud));
    let store = Arc::new(InMemoryLoanStore::default());
    let orchestrator = LoanOrchestrator::new(client_over(transport.clone()), store.clone());
    (orchestrator, store, transport)
}

pub(super) fn application() -> LoanApplication {
    LoanApplication {
        customer_name: "Ana".to_string(),
        customer_id: CustomerId(7),
        amount: Decimal::new(100_000, 2),
    }
}

pub(super) async fn read_body(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    serde_json::from_str(&read_body(response).await).expect("json body")
}

pub(super) fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(response.status(), expected, "unexpected status");
}
