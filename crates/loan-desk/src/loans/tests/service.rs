use super::common::*;
use crate::fraud::{RemoteEvaluationError, Verdict};
use crate::loans::{LoanOrchestrator, LoanServiceError, LoanStore, ValidationError};
use crate::storage::{InMemoryFraudStore, InMemoryLoanStore, SqliteLoanStore, StorageError};
use rust_decimal::Decimal;
use std::sync::Arc;

#[tokio::test]
async fn apply_approves_customer_without_fraud_records() {
    let (orchestrator, store, _) = build_orchestrator(InMemoryFraudStore::default());

    let receipt = orchestrator
        .apply_loan(application())
        .await
        .expect("application succeeds");

    assert_eq!(receipt.verdict, Verdict::Approved);
    let loans = store.find_all().expect("list");
    assert_eq!(loans.len(), 1);
    assert_eq!(loans[0].id, receipt.loan_id);
    assert_eq!(loans[0].customer_name, "Ana");
    assert_eq!(loans[0].amount, Decimal::new(100_000, 2));
    assert_eq!(loans[0].verdict, Verdict::Approved);
}

#[tokio::test]
async fn apply_rejects_flagged_customer_but_still_records_the_loan() {
    let (orchestrator, store, _) = build_orchestrator(fraud_store_flagging(7));

    let receipt = orchestrator
        .apply_loan(application())
        .await
        .expect("application succeeds");

    assert_eq!(receipt.verdict, Verdict::Rejected);
    let loans = store.find_all().expect("list");
    assert_eq!(loans.len(), 1);
    assert_eq!(loans[0].verdict, Verdict::Rejected);
}

#[tokio::test]
async fn apply_asks_the_authority_exactly_once() {
    let (orchestrator, _, transport) = build_orchestrator(InMemoryFraudStore::default());

    orchestrator
        .apply_loan(application())
        .await
        .expect("application succeeds");

    assert_eq!(*transport.calls.lock().unwrap(), 1);
}

#[tokio::test]
async fn unreachable_authority_aborts_without_persisting() {
    let store = Arc::new(InMemoryLoanStore::default());
    let orchestrator =
        LoanOrchestrator::new(client_over(Arc::new(UnreachableTransport)), store.clone());

    match orchestrator.apply_loan(application()).await {
        Err(LoanServiceError::RemoteEvaluation(RemoteEvaluationError::Transport(_))) => {}
        other => panic!("expected remote evaluation failure, got {other:?}"),
    }
    assert!(store.find_all().expect("list").is_empty());
}

#[tokio::test]
async fn authority_storage_failure_aborts_without_persisting() {
    struct BrokenFraudStore;

    impl crate::fraud::FraudLookupStore for BrokenFraudStore {
        fn exists_for_customer(
            &self,
            _customer_id: crate::fraud::CustomerId,
        ) -> Result<bool, StorageError> {
            Err(StorageError::Unavailable("fraud db down".to_string()))
        }
    }

    // The authority answers 500; loan intake must treat that like any other failed call.
    let service = Arc::new(crate::fraud::FraudDecisionService::new(Arc::new(
        BrokenFraudStore,
    )));
    let router = crate::fraud::fraud_router(service);
    let response = tower::ServiceExt::oneshot(
        router,
        axum::http::Request::get("/fraud/check?customerId=7")
            .body(axum::body::Body::empty())
            .unwrap(),
    )
    .await
    .expect("route executes");
    assert_eq!(response.status().as_u16(), 500);

    let store = Arc::new(InMemoryLoanStore::default());
    let transport = Arc::new(StaticTransport {
        status: 500,
        body: read_body(response).await,
    });
    let orchestrator = LoanOrchestrator::new(client_over(transport), store.clone());

    match orchestrator.apply_loan(application()).await {
        Err(LoanServiceError::RemoteEvaluation(RemoteEvaluationError::Status {
            status: 500,
            ..
        })) => {}
        other => panic!("expected status failure, got {other:?}"),
    }
    assert!(store.find_all().expect("list").is_empty());
}

#[tokio::test]
async fn store_write_failure_is_fatal() {
    let transport = Arc::new(RouterTransport::new(InMemoryFraudStore::default()));
    let store = Arc::new(ReadOnlyLoanStore::default());
    let orchestrator = LoanOrchestrator::new(client_over(transport), store.clone());

    match orchestrator.apply_loan(application()).await {
        Err(LoanServiceError::Storage(StorageError::Unavailable(_))) => {}
        other => panic!("expected storage failure, got {other:?}"),
    }
    assert!(store.find_all().expect("list").is_empty());
}

#[tokio::test]
async fn negative_amount_is_rejected_before_calling_the_authority() {
    let (orchestrator, store, transport) = build_orchestrator(InMemoryFraudStore::default());
    let mut request = application();
    request.amount = Decimal::new(-1, 0);

    match orchestrator.apply_loan(request).await {
        Err(LoanServiceError::Validation(ValidationError::NegativeAmount(_))) => {}
        other => panic!("expected validation failure, got {other:?}"),
    }
    assert_eq!(*transport.calls.lock().unwrap(), 0);
    assert!(store.find_all().expect("list").is_empty());
}

#[tokio::test]
async fn list_returns_summaries_in_store_order() {
    let (orchestrator, _, _) = build_orchestrator(fraud_store_flagging(8));
    for (name, customer) in [("Ana", 7), ("Luis", 8)] {
        let mut request = application();
        request.customer_name = name.to_string();
        request.customer_id = crate::fraud::CustomerId(customer);
        orchestrator.apply_loan(request).await.expect("applies");
    }

    let summaries = orchestrator.list_all_loans().await.expect("list");

    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].customer_name, "Ana");
    assert_eq!(summaries[0].loan_status, Verdict::Approved);
    assert_eq!(summaries[1].customer_name, "Luis");
    assert_eq!(summaries[1].loan_status, Verdict::Rejected);
    assert_ne!(summaries[0].loan_id, summaries[1].loan_id);
}

#[tokio::test]
async fn list_propagates_storage_failure() {
    let orchestrator = LoanOrchestrator::new(
        client_over(Arc::new(UnreachableTransport)),
        Arc::new(UnavailableLoanStore),
    );

    assert!(matches!(
        orchestrator.list_all_loans().await,
        Err(LoanServiceError::Storage(_))
    ));
}

#[tokio::test]
async fn sqlite_store_is_driven_from_the_blocking_pool() {
    let transport = Arc::new(RouterTransport::new(InMemoryFraudStore::default()));
    let store = Arc::new(SqliteLoanStore::open_in_memory().expect("store opens"));
    let orchestrator = LoanOrchestrator::new(client_over(transport), store);

    let receipt = orchestrator
        .apply_loan(application())
        .await
        .expect("application succeeds");
    let summaries = orchestrator.list_all_loans().await.expect("list");

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].loan_status, receipt.verdict);
    assert_eq!(summaries[0].amount, Decimal::new(100_000, 2));
}

#[tokio::test]
async fn panicking_store_write_is_a_storage_failure() {
    struct PanickingLoanStore;

    impl LoanStore for PanickingLoanStore {
        fn find_all(&self) -> Result<Vec<crate::loans::Loan>, StorageError> {
            Ok(Vec::new())
        }

        fn save(&self, _loan: crate::loans::NewLoan) -> Result<crate::loans::LoanId, StorageError> {
            panic!("driver crashed")
        }
    }

    let transport = Arc::new(RouterTransport::new(InMemoryFraudStore::default()));
    let orchestrator = LoanOrchestrator::new(client_over(transport), Arc::new(PanickingLoanStore));

    match orchestrator.apply_loan(application()).await {
        Err(LoanServiceError::Storage(StorageError::Unavailable(message))) => {
            assert!(message.contains("save"))
        }
        other => panic!("expected storage failure, got {other:?}"),
    }
}

#[test]
fn error_kinds_label_each_failure() {
    let invalid = LoanServiceError::from(ValidationError::NegativeAmount(Decimal::NEGATIVE_ONE));
    let storage = LoanServiceError::from(StorageError::Unavailable("down".to_string()));

    assert_eq!(invalid.kind(), "invalid");
    assert_eq!(storage.kind(), "storage_failed");
}

#[test]
fn receipt_message_names_loan_and_verdict() {
    let receipt = crate::loans::LoanReceipt {
        loan_id: crate::loans::LoanId(3),
        verdict: Verdict::Rejected,
    };
    let message = receipt.message();
    assert!(message.contains('3'));
    assert!(message.contains("REJECTED"));
}
