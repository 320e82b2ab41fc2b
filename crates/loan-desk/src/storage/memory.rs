use std::sync::{Arc, Mutex, MutexGuard};

use tracing::instrument;

use crate::fraud::{CustomerId, FraudLookupStore, FraudRecord};
use crate::loans::{Loan, LoanId, LoanStore, LoanToken, NewLoan};

use super::StorageError;

fn lock<'a, T>(mutex: &'a Mutex<T>, name: &str) -> Result<MutexGuard<'a, T>, StorageError> {
    mutex
        .lock()
        .map_err(|_| StorageError::Unavailable(format!("{name} mutex poisoned")))
}

/// Fraud records held in process memory.
#[derive(Default, Clone)]
pub struct InMemoryFraudStore {
    records: Arc<Mutex<Vec<FraudRecord>>>,
}

impl InMemoryFraudStore {
    pub fn with_records(records: impl IntoIterator<Item = FraudRecord>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records.into_iter().collect())),
        }
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FraudLookupStore for InMemoryFraudStore {
    #[instrument(skip(self), fields(store = "memory", customer_id = %customer_id))]
    fn exists_for_customer(&self, customer_id: CustomerId) -> Result<bool, StorageError> {
        let guard = lock(&self.records, "fraud store")?;
        Ok(guard
            .iter()
            .any(|record| record.customer_id == customer_id))
    }
}

#[derive(Default)]
struct LoanTable {
    rows: Vec<Loan>,
    last_id: i64,
}

/// Loans held in process memory, listed in insertion order.
#[derive(Default, Clone)]
pub struct InMemoryLoanStore {
    table: Arc<Mutex<LoanTable>>,
}

impl LoanStore for InMemoryLoanStore {
    #[instrument(skip(self), fields(store = "memory"))]
    fn find_all(&self) -> Result<Vec<Loan>, StorageError> {
        let guard = lock(&self.table, "loan store")?;
        Ok(guard.rows.clone())
    }

    #[instrument(skip(self, loan), fields(store = "memory", customer_id = %loan.customer_id, verdict = %loan.verdict))]
    fn save(&self, loan: NewLoan) -> Result<LoanId, StorageError> {
        let mut guard = lock(&self.table, "loan store")?;
        guard.last_id += 1;
        let id = LoanId(guard.last_id);
        guard.rows.push(Loan::new(id, LoanToken::generate(), loan));
        Ok(id)
    }
}
