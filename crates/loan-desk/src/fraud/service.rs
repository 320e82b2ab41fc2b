use std::sync::Arc;

use tracing::{debug, warn};

use super::domain::{CustomerId, Verdict};
use super::store::FraudLookupStore;
use crate::storage::{run_blocking, StorageError};

/// Turns the lookup store's answer into a verdict.
pub struct FraudDecisionService<S> {
    store: Arc<S>,
}

impl<S> FraudDecisionService<S>
where
    S: FraudLookupStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// `Rejected` iff the customer has any fraud record. Storage failures are never
    /// turned into a verdict.
    pub async fn decide(&self, customer_id: CustomerId) -> Result<Verdict, StorageError> {
        let store = Arc::clone(&self.store);
        let flagged = run_blocking("exists_for_customer", move || {
            store.exists_for_customer(customer_id)
        })
        .await
        .inspect_err(|err| warn!(%customer_id, error = %err, "fraud lookup failed"))?;

        let verdict = if flagged {
            Verdict::Rejected
        } else {
            Verdict::Approved
        };
        debug!(%customer_id, %verdict, "fraud decision made");
        Ok(verdict)
    }
}
