//! Loan intake and fraud authority services.
//!
//! The fraud authority answers whether a customer has been flagged; loan intake
//! asks it synchronously for every application and persists the verdict.

pub mod config;
pub mod error;
pub mod fraud;
pub mod loans;
pub mod storage;
pub mod telemetry;
