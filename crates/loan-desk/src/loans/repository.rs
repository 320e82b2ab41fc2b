use std::sync::Arc;

use super::domain::{Loan, LoanId, NewLoan};
use crate::storage::StorageError;

/// Storage abstraction so the orchestrator can be exercised in isolation.
pub trait LoanStore: Send + Sync {
    /// Every stored loan, in the order the backend yields them.
    fn find_all(&self) -> Result<Vec<Loan>, StorageError>;

    /// Persists the loan under a freshly generated loan token and returns its internal id.
    fn save(&self, loan: NewLoan) -> Result<LoanId, StorageError>;
}

impl<S> LoanStore for Arc<S>
where
    S: LoanStore + ?Sized,
{
    fn find_all(&self) -> Result<Vec<Loan>, StorageError> {
        (**self).find_all()
    }

    fn save(&self, loan: NewLoan) -> Result<LoanId, StorageError> {
        (**self).save(loan)
    }
}
