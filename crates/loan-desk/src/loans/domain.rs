use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::fraud::{CustomerId, Verdict};

/// Store-assigned internal identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(pub i64);

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Business-facing loan identifier, generated by the store at insert time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanToken(pub String);

impl LoanToken {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Inbound `POST /loan` body.
///
/// Only the applicant's fields are read. A `loanId` or `loanStatus` sent by the client is
/// ignored during deserialization since both are assigned server side.
///
/// `amount` may arrive as a JSON number or a string; numbers are read from their literal
/// digits, never through `f64`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanApplication {
    pub customer_name: String,
    pub customer_id: CustomerId,
    #[serde(deserialize_with = "rust_decimal::serde::arbitrary_precision::deserialize")]
    pub amount: Decimal,
}

/// Application payload that breaks a loan invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("loan amount must not be negative (got {0})")]
    NegativeAmount(Decimal),
}

impl LoanApplication {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.amount < Decimal::ZERO {
            return Err(ValidationError::NegativeAmount(self.amount));
        }
        Ok(())
    }
}

/// A decided application ready for persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLoan {
    pub customer_name: String,
    pub customer_id: CustomerId,
    pub amount: Decimal,
    pub verdict: Verdict,
}

impl NewLoan {
    pub fn from_application(application: LoanApplication, verdict: Verdict) -> Self {
        Self {
            customer_name: application.customer_name,
            customer_id: application.customer_id,
            amount: application.amount,
            verdict,
        }
    }
}

/// A persisted loan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loan {
    pub id: LoanId,
    pub token: LoanToken,
    pub customer_name: String,
    pub customer_id: CustomerId,
    pub amount: Decimal,
    pub verdict: Verdict,
}

impl Loan {
    pub fn new(id: LoanId, token: LoanToken, loan: NewLoan) -> Self {
        Self {
            id,
            token,
            customer_name: loan.customer_name,
            customer_id: loan.customer_id,
            amount: loan.amount,
            verdict: loan.verdict,
        }
    }

    pub fn summary(&self) -> LoanSummary {
        LoanSummary {
            loan_id: self.token.clone(),
            customer_name: self.customer_name.clone(),
            customer_id: self.customer_id,
            amount: self.amount,
            loan_status: self.verdict,
        }
    }
}

/// Listing view returned by `GET /loan`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanSummary {
    pub loan_id: LoanToken,
    pub customer_name: String,
    pub customer_id: CustomerId,
    pub amount: Decimal,
    pub loan_status: Verdict,
}

/// Outcome of a successful application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanReceipt {
    pub loan_id: LoanId,
    pub verdict: Verdict,
}

impl LoanReceipt {
    pub fn message(&self) -> String {
        format!(
            "Loan application {} processed successfully with status {}",
            self.loan_id, self.verdict
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn parse(body: &str) -> LoanApplication {
        serde_json::from_str(body).expect("application parses")
    }

    #[test]
    fn numeric_amount_keeps_every_digit() {
        let application =
            parse(r#"{"customerName":"Ana","customerId":7,"amount":9007199254740993.01}"#);

        assert_eq!(
            application.amount,
            Decimal::from_str("9007199254740993.01").unwrap()
        );
    }

    #[test]
    fn string_amount_is_accepted() {
        let application = parse(r#"{"customerName":"Ana","customerId":7,"amount":"1000.00"}"#);

        assert_eq!(application.amount, Decimal::new(100_000, 2));
        assert_eq!(application.amount.to_string(), "1000.00");
    }

    #[test]
    fn server_assigned_fields_are_ignored() {
        let application = parse(
            r#"{"loanId":"mine","customerName":"Ana","customerId":7,"amount":5,"loanStatus":"APPROVED"}"#,
        );

        assert_eq!(application.customer_id, CustomerId(7));
        assert_eq!(application.amount, Decimal::new(5, 0));
    }

    #[test]
    fn negative_amount_fails_validation() {
        let application = parse(r#"{"customerName":"Ana","customerId":7,"amount":-0.01}"#);

        assert_eq!(
            application.validate(),
            Err(ValidationError::NegativeAmount(Decimal::new(-1, 2)))
        );
    }
}
