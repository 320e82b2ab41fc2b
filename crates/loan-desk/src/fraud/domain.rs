use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Customer identifier shared by the fraud authority and loan intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub i32);

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of a fraud check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Approved,
    Rejected,
}

impl Verdict {
    /// Wire token used on the check endpoint and in storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Approved => "APPROVED",
            Verdict::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized verdict '{0}'")]
pub struct UnknownVerdict(pub String);

impl FromStr for Verdict {
    type Err = UnknownVerdict;

    /// Accepts the bare token as well as a JSON-quoted one, ignoring case and whitespace.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let token = raw.trim().trim_matches('"').trim();
        if token.eq_ignore_ascii_case("APPROVED") {
            Ok(Verdict::Approved)
        } else if token.eq_ignore_ascii_case("REJECTED") {
            Ok(Verdict::Rejected)
        } else {
            Err(UnknownVerdict(raw.to_string()))
        }
    }
}

/// A stored fraud flag. Records are created outside this system and only read here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FraudRecord {
    pub id: i64,
    pub fraud_record_id: String,
    pub customer_id: CustomerId,
    pub status: Verdict,
}

impl FraudRecord {
    pub fn new(
        id: i64,
        fraud_record_id: impl Into<String>,
        customer_id: CustomerId,
        status: Verdict,
    ) -> Self {
        Self {
            id,
            fraud_record_id: fraud_record_id.into(),
            customer_id,
            status,
        }
    }
}
