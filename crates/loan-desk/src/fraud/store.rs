use std::sync::Arc;

use super::domain::CustomerId;
use crate::storage::StorageError;

/// Lookup abstraction so the decision service can be exercised in isolation.
pub trait FraudLookupStore: Send + Sync {
    /// True when at least one fraud record names the customer, however many there are.
    fn exists_for_customer(&self, customer_id: CustomerId) -> Result<bool, StorageError>;
}

impl<S> FraudLookupStore for Arc<S>
where
    S: FraudLookupStore + ?Sized,
{
    fn exists_for_customer(&self, customer_id: CustomerId) -> Result<bool, StorageError> {
        (**self).exists_for_customer(customer_id)
    }
}
