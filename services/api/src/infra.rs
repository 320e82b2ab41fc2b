use loan_desk::fraud::{CustomerId, FraudLookupStore};
use loan_desk::loans::{Loan, LoanId, LoanStore, NewLoan};
use loan_desk::storage::{
    InMemoryFraudStore, InMemoryLoanStore, SqliteFraudStore, SqliteLoanStore, StorageError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) service: &'static str,
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Fraud record backend picked from `FRAUD_DATABASE_PATH`.
pub(crate) enum FraudStorage {
    Memory(InMemoryFraudStore),
    Sqlite(SqliteFraudStore),
}

impl FraudStorage {
    pub(crate) fn open(path: Option<&Path>) -> Result<Self, StorageError> {
        match path {
            Some(path) => Ok(Self::Sqlite(SqliteFraudStore::open(path)?)),
            None => {
                warn!("FRAUD_DATABASE_PATH not set; serving from an empty in-memory fraud store");
                Ok(Self::Memory(InMemoryFraudStore::default()))
            }
        }
    }
}

impl FraudLookupStore for FraudStorage {
    fn exists_for_customer(&self, customer_id: CustomerId) -> Result<bool, StorageError> {
        match self {
            FraudStorage::Memory(store) => store.exists_for_customer(customer_id),
            FraudStorage::Sqlite(store) => store.exists_for_customer(customer_id),
        }
    }
}

/// Loan backend picked from `LOAN_DATABASE_PATH`.
pub(crate) enum LoanStorage {
    Memory(InMemoryLoanStore),
    Sqlite(SqliteLoanStore),
}

impl LoanStorage {
    pub(crate) fn open(path: Option<&Path>) -> Result<Self, StorageError> {
        match path {
            Some(path) => Ok(Self::Sqlite(SqliteLoanStore::open(path)?)),
            None => {
                info!("LOAN_DATABASE_PATH not set; loans are kept in memory");
                Ok(Self::Memory(InMemoryLoanStore::default()))
            }
        }
    }
}

impl LoanStore for LoanStorage {
    fn find_all(&self) -> Result<Vec<Loan>, StorageError> {
        match self {
            LoanStorage::Memory(store) => store.find_all(),
            LoanStorage::Sqlite(store) => store.find_all(),
        }
    }

    fn save(&self, loan: NewLoan) -> Result<LoanId, StorageError> {
        match self {
            LoanStorage::Memory(store) => store.save(loan),
            LoanStorage::Sqlite(store) => store.save(loan),
        }
    }
}
