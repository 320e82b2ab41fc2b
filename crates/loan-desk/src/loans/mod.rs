//! Loan intake: application workflow, loan storage contract, and HTTP routes.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Loan, LoanApplication, LoanId, LoanReceipt, LoanSummary, LoanToken, NewLoan, ValidationError,
};
pub use repository::LoanStore;
pub use router::loan_router;
pub use service::{LoanOrchestrator, LoanServiceError};
