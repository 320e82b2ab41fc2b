//! Storage backends for fraud records and loans.
//!
//! Both services run against either the in-memory stores (development and tests) or a
//! SQLite file per store, selected through [`crate::config::StorageConfig`].

pub mod memory;
pub mod sqlite;

use std::time::{Duration, Instant};

pub use memory::{InMemoryFraudStore, InMemoryLoanStore};
pub use sqlite::{SqliteFraudStore, SqliteLoanStore};

pub const STORAGE_DURATION_METRIC: &str = "loan_desk_storage_operation_duration_seconds";

/// Read or write failure in either store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage query failed: {0}")]
    Query(#[from] rusqlite::Error),
    #[error("stored row is malformed: {0}")]
    Corrupt(String),
}

/// Runs a store call on the blocking pool and records how long it took.
///
/// Store implementations are synchronous and may hold a mutex across disk I/O, so async
/// callers hand them off here instead of calling them on a runtime worker. A panicking
/// store call surfaces as [`StorageError::Unavailable`].
pub async fn run_blocking<T, E, F>(operation: &'static str, op: F) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: From<StorageError> + Send + 'static,
{
    let span = tracing::Span::current();
    let started = Instant::now();
    let joined = tokio::task::spawn_blocking(move || span.in_scope(op)).await;

    let outcome = match &joined {
        Ok(Ok(_)) => "ok",
        _ => "error",
    };
    record_duration(operation, outcome, started.elapsed());

    joined.map_err(|err| {
        E::from(StorageError::Unavailable(format!(
            "{operation} did not complete: {err}"
        )))
    })?
}

fn record_duration(operation: &'static str, outcome: &'static str, elapsed: Duration) {
    metrics::histogram!(
        STORAGE_DURATION_METRIC,
        "operation" => operation,
        "outcome" => outcome
    )
    .record(elapsed.as_secs_f64());
}
