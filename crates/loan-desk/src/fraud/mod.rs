//! Fraud authority: record lookup, verdict decision, the check endpoint, and the
//! client loan intake uses to reach it.

pub mod client;
pub mod domain;
pub mod router;
pub mod service;
pub mod store;


pub use client::{
    FraudAuthorityClient, FraudTransport, HttpFraudTransport, RemoteEvaluationError,
    TransportError, TransportResponse,
};
pub use domain::{CustomerId, FraudRecord, UnknownVerdict, Verdict};
pub use router::fraud_router;
pub use service::FraudDecisionService;
pub use store::FraudLookupStore;
