use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, instrument, warn};

use super::domain::{CustomerId, UnknownVerdict, Verdict};
use super::router::FRAUD_CHECK_PATH;
use crate::config::FraudAuthorityConfig;

pub const FRAUD_CALL_DURATION_METRIC: &str = "loan_desk_fraud_authority_call_duration_seconds";

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("request failed: {0}")]
    Request(String),
    #[error("http client could not be built: {0}")]
    Build(String),
}

/// Low-level request carrier, injected so tests can stand in for the network.
#[async_trait]
pub trait FraudTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError>;
}

/// `reqwest` transport with a bounded per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpFraudTransport {
    client: Client,
    timeout: Duration,
}

impl HttpFraudTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| TransportError::Build(err.to_string()))?;
        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl FraudTransport for HttpFraudTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
        let response = self.client.get(url).send().await.map_err(|err| {
            if err.is_timeout() {
                TransportError::Timeout(self.timeout)
            } else {
                TransportError::Request(err.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|err| {
            if err.is_timeout() {
                TransportError::Timeout(self.timeout)
            } else {
                TransportError::Request(err.to_string())
            }
        })?;

        Ok(TransportResponse { status, body })
    }
}

/// The fraud authority call failed; the application it belongs to must not proceed.
#[derive(Debug, thiserror::Error)]
pub enum RemoteEvaluationError {
    #[error("fraud authority unreachable: {0}")]
    Transport(#[from] TransportError),
    #[error("fraud authority answered with status {status}")]
    Status { status: u16, body: String },
    #[error("fraud authority returned an invalid verdict: {0}")]
    InvalidVerdict(#[from] UnknownVerdict),
}

/// Outbound caller of the fraud authority, bound to one base address.
#[derive(Clone)]
pub struct FraudAuthorityClient {
    base_url: String,
    transport: Arc<dyn FraudTransport>,
}

impl FraudAuthorityClient {
    pub fn new(base_url: impl Into<String>, transport: Arc<dyn FraudTransport>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            transport,
        }
    }

    /// Client over HTTP using the configured address and timeout.
    pub fn from_config(config: &FraudAuthorityConfig) -> Result<Self, TransportError> {
        let transport = HttpFraudTransport::new(config.timeout)?;
        Ok(Self::new(config.base_url.clone(), Arc::new(transport)))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn check_url(&self, customer_id: CustomerId) -> String {
        format!(
            "{}{}?customerId={}",
            self.base_url, FRAUD_CHECK_PATH, customer_id
        )
    }

    /// One attempt, no retry. Any failure is returned to the caller untouched.
    #[instrument(skip(self), fields(customer_id = %customer_id, authority = %self.base_url))]
    pub async fn evaluate(&self, customer_id: CustomerId) -> Result<Verdict, RemoteEvaluationError> {
        info!("calling fraud authority");
        let started = Instant::now();
        let result = self.call(customer_id).await;
        record_call(&result, started.elapsed());
        result
    }

    async fn call(&self, customer_id: CustomerId) -> Result<Verdict, RemoteEvaluationError> {
        let url = self.check_url(customer_id);

        let response = self
            .transport
            .get(&url)
            .await
            .inspect_err(|err| warn!(error = %err, "fraud authority call failed"))?;

        if !response.is_success() {
            warn!(status = response.status, "fraud authority returned an error status");
            return Err(RemoteEvaluationError::Status {
                status: response.status,
                body: response.body,
            });
        }

        let verdict = response.body.parse::<Verdict>()?;
        info!(%verdict, "fraud authority response");
        Ok(verdict)
    }
}

fn call_outcome(result: &Result<Verdict, RemoteEvaluationError>) -> &'static str {
    match result {
        Ok(Verdict::Approved) => "approved",
        Ok(Verdict::Rejected) => "rejected",
        Err(RemoteEvaluationError::Transport(TransportError::Timeout(_))) => "timeout",
        Err(RemoteEvaluationError::Transport(_)) => "unreachable",
        Err(RemoteEvaluationError::Status { .. }) => "error_status",
        Err(RemoteEvaluationError::InvalidVerdict(_)) => "invalid_verdict",
    }
}

fn record_call(result: &Result<Verdict, RemoteEvaluationError>, elapsed: Duration) {
    metrics::histogram!(
        FRAUD_CALL_DURATION_METRIC,
        "outcome" => call_outcome(result)
    )
    .record(elapsed.as_secs_f64());
}

impl std::fmt::Debug for FraudAuthorityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FraudAuthorityClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
