use std::sync::Arc;

use tracing::{info, warn};

use super::domain::{LoanApplication, LoanReceipt, LoanSummary, NewLoan, ValidationError};
use super::repository::LoanStore;
use crate::fraud::{FraudAuthorityClient, RemoteEvaluationError};
use crate::storage::{run_blocking, StorageError};

pub const LOAN_APPLICATIONS_METRIC: &str = "loan_desk_loan_applications_total";

/// Composes the fraud authority client and the loan store into the application workflow.
pub struct LoanOrchestrator<S> {
    fraud: FraudAuthorityClient,
    store: Arc<S>,
}

impl<S> LoanOrchestrator<S>
where
    S: LoanStore + 'static,
{
    pub fn new(fraud: FraudAuthorityClient, store: Arc<S>) -> Self {
        Self { fraud, store }
    }

    /// Summaries of every stored loan, in store order.
    pub async fn list_all_loans(&self) -> Result<Vec<LoanSummary>, LoanServiceError> {
        let store = Arc::clone(&self.store);
        let loans = run_blocking("find_all", move || store.find_all()).await?;
        Ok(loans.iter().map(|loan| loan.summary()).collect())
    }

    /// Obtain a verdict from the fraud authority, then persist the decided loan.
    ///
    /// The fraud call happens before anything is written: if it fails the application
    /// is abandoned and no loan exists for it. Only the store write is transactional.
    pub async fn apply_loan(
        &self,
        application: LoanApplication,
    ) -> Result<LoanReceipt, LoanServiceError> {
        let result = self.process(application).await;
        let outcome = match &result {
            Ok(receipt) => receipt.verdict.as_str(),
            Err(error) => error.kind(),
        };
        metrics::counter!(LOAN_APPLICATIONS_METRIC, "outcome" => outcome).increment(1);
        result
    }

    async fn process(&self, application: LoanApplication) -> Result<LoanReceipt, LoanServiceError> {
        application.validate()?;

        let customer_id = application.customer_id;
        let verdict = self
            .fraud
            .evaluate(customer_id)
            .await
            .inspect_err(|err| warn!(%customer_id, error = %err, "loan application aborted"))?;

        let loan = NewLoan::from_application(application, verdict);
        let store = Arc::clone(&self.store);
        let loan_id = run_blocking("save", move || store.save(loan))
            .await
            .inspect_err(|err| warn!(%customer_id, error = %err, "loan could not be stored"))?;

        info!(%customer_id, %loan_id, %verdict, "loan application recorded");
        Ok(LoanReceipt { loan_id, verdict })
    }
}

/// Error raised by the loan orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum LoanServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    RemoteEvaluation(#[from] RemoteEvaluationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl LoanServiceError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            LoanServiceError::Validation(_) => "invalid",
            LoanServiceError::RemoteEvaluation(_) => "fraud_check_failed",
            LoanServiceError::Storage(_) => "storage_failed",
        }
    }
}
