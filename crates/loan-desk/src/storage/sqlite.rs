use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use tracing::{info, instrument};

use crate::fraud::{CustomerId, FraudLookupStore, Verdict};
use crate::loans::{Loan, LoanId, LoanStore, LoanToken, NewLoan};

use super::StorageError;

const FRAUD_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS fraud_records (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        fraud_record_id TEXT NOT NULL,
        customer_id INTEGER NOT NULL,
        loan_status TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_fraud_records_customer ON fraud_records(customer_id);";

const LOAN_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS loans (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        loan_id TEXT UNIQUE NOT NULL,
        customer_name TEXT NOT NULL,
        customer_id INTEGER NOT NULL,
        amount TEXT NOT NULL,
        loan_status TEXT NOT NULL
    );";

fn open(path: &Path, schema: &str) -> Result<Connection, StorageError> {
    let conn = Connection::open(path)?;
    conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
    conn.execute_batch(schema)?;
    info!(path = %path.display(), "sqlite store ready");
    Ok(conn)
}

fn open_in_memory(schema: &str) -> Result<Connection, StorageError> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch(schema)?;
    Ok(conn)
}

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, StorageError> {
    conn.lock()
        .map_err(|_| StorageError::Unavailable("sqlite connection mutex poisoned".to_string()))
}

/// Fraud records in a SQLite `fraud_records` table.
#[derive(Clone)]
pub struct SqliteFraudStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteFraudStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = open(path.as_ref(), FRAUD_SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = open_in_memory(FRAUD_SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

impl FraudLookupStore for SqliteFraudStore {
    #[instrument(skip(self), fields(store = "sqlite", customer_id = %customer_id))]
    fn exists_for_customer(&self, customer_id: CustomerId) -> Result<bool, StorageError> {
        let conn = lock(&self.conn)?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM fraud_records WHERE customer_id = ?1",
            params![customer_id.0],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

/// Loans in a SQLite `loans` table, listed by internal id.
#[derive(Clone)]
pub struct SqliteLoanStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteLoanStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = open(path.as_ref(), LOAN_SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = open_in_memory(LOAN_SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

struct LoanRow {
    id: i64,
    token: String,
    customer_name: String,
    customer_id: i32,
    amount: String,
    loan_status: String,
}

impl TryFrom<LoanRow> for Loan {
    type Error = StorageError;

    fn try_from(row: LoanRow) -> Result<Self, Self::Error> {
        let amount = Decimal::from_str(&row.amount).map_err(|err| {
            StorageError::Corrupt(format!("loan {} amount '{}': {err}", row.id, row.amount))
        })?;
        let verdict = Verdict::from_str(&row.loan_status)
            .map_err(|err| StorageError::Corrupt(format!("loan {}: {err}", row.id)))?;

        Ok(Loan {
            id: LoanId(row.id),
            token: LoanToken(row.token),
            customer_name: row.customer_name,
            customer_id: CustomerId(row.customer_id),
            amount,
            verdict,
        })
    }
}

impl LoanStore for SqliteLoanStore {
    #[instrument(skip(self), fields(store = "sqlite"))]
    fn find_all(&self) -> Result<Vec<Loan>, StorageError> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT id, loan_id, customer_name, customer_id, amount, loan_status
             FROM loans
             ORDER BY id",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(LoanRow {
                    id: row.get(0)?,
                    token: row.get(1)?,
                    customer_name: row.get(2)?,
                    customer_id: row.get(3)?,
                    amount: row.get(4)?,
                    loan_status: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(Loan::try_from).collect()
    }

    #[instrument(skip(self, loan), fields(store = "sqlite", customer_id = %loan.customer_id, verdict = %loan.verdict))]
    fn save(&self, loan: NewLoan) -> Result<LoanId, StorageError> {
        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO loans (loan_id, customer_name, customer_id, amount, loan_status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                LoanToken::generate().as_str(),
                loan.customer_name,
                loan.customer_id.0,
                loan.amount.to_string(),
                loan.verdict.as_str(),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(LoanId(id))
    }
}
