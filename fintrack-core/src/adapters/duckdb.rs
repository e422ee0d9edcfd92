//! DuckDB repository implementation

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use chrono::{NaiveDateTime, Utc};
use duckdb::{params, Connection};
use rust_decimal::Decimal;

use crate::domain::result::{Error, Result};
use crate::domain::{Owner, OwnerId, Transaction, TransactionDraft, TransactionId, TransactionKind};
use crate::migrations::MIGRATIONS;
use crate::ports::{Repository, StoredCredential};
use crate::services::{MigrationResult, MigrationService};

/// Maximum number of retries when database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400, 800ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// Column list shared by every transaction read
const TRANSACTION_COLUMNS: &str = "transaction_id, owner_id, kind, amount::VARCHAR, description,
     transaction_date, created_at::VARCHAR, updated_at::VARCHAR";

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("could not set lock on file")
        || lower.contains("file is already open")
}

/// Check if an error message is a UNIQUE/PRIMARY KEY violation
fn is_unique_violation(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    lower.contains("duplicate key") || lower.contains("unique constraint")
}

/// Format a timestamp the way it is bound into `CAST(? AS TIMESTAMP)`
pub(crate) fn format_timestamp(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}

/// Parse a TIMESTAMP column read back as VARCHAR
fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .map_err(|_| Error::database(format!("unreadable timestamp '{}'", s)))
}

/// Drop the zero padding of a `DECIMAL(38, 10)` rendered as text
///
/// A 28-digit amount plus ten padding zeros is more digits than a `Decimal`
/// holds, while the trimmed form always fits.
fn trim_fraction(amount: &str) -> &str {
    if amount.contains('.') {
        amount.trim_end_matches('0').trim_end_matches('.')
    } else {
        amount
    }
}

/// Raw transaction columns, converted outside the row callback
struct TransactionRow {
    id: i64,
    owner_id: i64,
    kind: String,
    amount: String,
    description: String,
    date: String,
    created_at: String,
    updated_at: String,
}

impl TransactionRow {
    fn read(row: &duckdb::Row) -> duckdb::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            kind: row.get(2)?,
            amount: row.get(3)?,
            description: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
            date: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = Error;

    fn try_from(row: TransactionRow) -> Result<Self> {
        let kind = TransactionKind::from_str(&row.kind).map_err(|_| {
            Error::database(format!("transaction {} has unknown kind '{}'", row.id, row.kind))
        })?;
        let amount = Decimal::from_str(trim_fraction(&row.amount))
            .map_err(|_| {
                Error::database(format!(
                    "transaction {} has unreadable amount '{}'",
                    row.id, row.amount
                ))
            })?
            .normalize();

        Ok(Transaction {
            id: TransactionId(row.id),
            owner_id: OwnerId(row.owner_id),
            kind,
            amount,
            description: row.description,
            date: row.date,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

/// DuckDB repository implementation
///
/// A single connection behind a mutex. Every method holds the lock for its
/// whole body, which makes each repository call atomic with respect to the
/// others in this process.
pub struct DuckDbRepository {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl DuckDbRepository {
    /// Open (or create) a database file
    ///
    /// Includes retry logic with exponential backoff for file locking errors,
    /// which occur when another process holds the database file.
    pub fn new(db_path: &Path) -> Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: Some(db_path.to_path_buf()),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        tracing::warn!(
                            delay_ms = delay.as_millis() as u64,
                            attempt = attempt + 1,
                            max_retries = MAX_RETRIES,
                            error = %err_msg,
                            "database busy, retrying"
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            Error::database(format!("Failed to open database after {} retries", MAX_RETRIES))
        }))
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let conn = Connection::open_in_memory_with_flags(config)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: None,
        })
    }

    /// Attempt to open a database connection (called by new() with retry logic)
    fn try_open_connection(db_path: &Path) -> Result<Connection> {
        // Extension autoloading stays off; nothing here needs an extension
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Ok(Connection::open_with_flags(db_path, config)?)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::database(format!("Lock poisoned: {}", e)))
    }

    /// Run database migrations using the MigrationService
    pub fn run_migrations(&self) -> Result<MigrationResult> {
        let conn = self.conn()?;
        MigrationService::new(&conn, MIGRATIONS).run_pending()
    }

    /// Path of the database file, `None` for in-memory databases
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Registered owners across the whole store
    pub fn count_owners(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM owners", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Transactions across the whole store, for maintenance and tests
    pub fn count_all_transactions(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count)
    }

    fn query_ids(&self, sql: &str, owner: OwnerId) -> Result<Vec<TransactionId>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let ids = stmt.query_map(params![owner.0], |row| row.get::<_, i64>(0))?;

        let mut result = Vec::new();
        for id in ids {
            result.push(TransactionId(id?));
        }
        Ok(result)
    }
}

impl Repository for DuckDbRepository {
    fn ensure_schema(&self) -> Result<()> {
        self.run_migrations()?;
        Ok(())
    }

    // === Owner operations ===

    fn insert_owner(&self, username: &str, credential_hash: &str) -> Result<OwnerId> {
        let conn = self.conn()?;

        let existing: i64 = conn.query_row(
            "SELECT COUNT(*) FROM owners WHERE username = ?",
            params![username],
            |row| row.get(0),
        )?;
        if existing > 0 {
            return Err(Error::DuplicateUsername(username.to_string()));
        }

        // The UNIQUE constraint still guards against writers in other processes
        let id: i64 = conn
            .query_row(
                "INSERT INTO owners (username, credential_hash, created_at)
                 VALUES (?, ?, CAST(? AS TIMESTAMP))
                 RETURNING owner_id",
                params![
                    username,
                    credential_hash,
                    format_timestamp(Utc::now().naive_utc())
                ],
                |row| row.get(0),
            )
            .map_err(|e| {
                if is_unique_violation(&e.to_string()) {
                    Error::DuplicateUsername(username.to_string())
                } else {
                    Error::from(e)
                }
            })?;

        Ok(OwnerId(id))
    }

    fn find_credential(&self, username: &str) -> Result<Option<StoredCredential>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT owner_id, credential_hash FROM owners WHERE username = ?")?;
        let mut rows = stmt.query(params![username])?;

        match rows.next()? {
            Some(row) => Ok(Some(StoredCredential {
                owner_id: OwnerId(row.get(0)?),
                credential_hash: row.get(1)?,
            })),
            None => Ok(None),
        }
    }

    fn get_owner(&self, id: OwnerId) -> Result<Option<Owner>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT owner_id, username, created_at::VARCHAR FROM owners WHERE owner_id = ?",
        )?;
        let mut rows = stmt.query(params![id.0])?;

        match rows.next()? {
            Some(row) => {
                let created: String = row.get(2)?;
                Ok(Some(Owner {
                    id: OwnerId(row.get(0)?),
                    username: row.get(1)?,
                    created_at: parse_timestamp(&created)?,
                }))
            }
            None => Ok(None),
        }
    }

    // === Transaction operations ===

    fn insert_transaction(
        &self,
        owner: OwnerId,
        draft: &TransactionDraft,
    ) -> Result<TransactionId> {
        let conn = self.conn()?;

        let owner_exists: i64 = conn.query_row(
            "SELECT COUNT(*) FROM owners WHERE owner_id = ?",
            params![owner.0],
            |row| row.get(0),
        )?;
        if owner_exists == 0 {
            return Err(Error::not_found(format!("owner {}", owner)));
        }

        let now = format_timestamp(Utc::now().naive_utc());
        let id: i64 = conn.query_row(
            "INSERT INTO transactions
                 (owner_id, kind, amount, description, transaction_date, created_at, updated_at)
             VALUES (?, ?, CAST(? AS DECIMAL(38, 10)), ?, ?,
                     CAST(? AS TIMESTAMP), CAST(? AS TIMESTAMP))
             RETURNING transaction_id",
            params![
                owner.0,
                draft.kind.as_str(),
                draft.amount.to_string(),
                draft.description,
                draft.date,
                now,
                now,
            ],
            |row| row.get(0),
        )?;

        Ok(TransactionId(id))
    }

    fn list_transactions(&self, owner: OwnerId) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM transactions WHERE owner_id = ? ORDER BY transaction_id",
            TRANSACTION_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![owner.0], TransactionRow::read)?;

        let mut transactions = Vec::new();
        for row in rows {
            transactions.push(Transaction::try_from(row?)?);
        }
        Ok(transactions)
    }

    fn get_transaction(&self, owner: OwnerId, id: TransactionId) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM transactions WHERE transaction_id = ? AND owner_id = ?",
            TRANSACTION_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params![id.0, owner.0])?;

        match rows.next()? {
            Some(row) => Ok(Some(Transaction::try_from(TransactionRow::read(row)?)?)),
            None => Ok(None),
        }
    }

    fn update_transaction(
        &self,
        owner: OwnerId,
        id: TransactionId,
        draft: &TransactionDraft,
    ) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE transactions
             SET kind = ?,
                 amount = CAST(? AS DECIMAL(38, 10)),
                 description = ?,
                 transaction_date = ?,
                 updated_at = CAST(? AS TIMESTAMP)
             WHERE transaction_id = ? AND owner_id = ?",
            params![
                draft.kind.as_str(),
                draft.amount.to_string(),
                draft.description,
                draft.date,
                format_timestamp(Utc::now().naive_utc()),
                id.0,
                owner.0,
            ],
        )?;
        Ok(changed > 0)
    }

    fn delete_transaction(&self, owner: OwnerId, id: TransactionId) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM transactions WHERE transaction_id = ? AND owner_id = ?",
            params![id.0, owner.0],
        )?;
        Ok(deleted > 0)
    }

    // === Health checks ===

    fn check_invalid_kinds(&self, owner: OwnerId) -> Result<Vec<TransactionId>> {
        self.query_ids(
            "SELECT transaction_id FROM transactions
             WHERE owner_id = ? AND kind NOT IN ('Income', 'Expense')
             ORDER BY transaction_id",
            owner,
        )
    }

    fn check_negative_amounts(&self, owner: OwnerId) -> Result<Vec<TransactionId>> {
        self.query_ids(
            "SELECT transaction_id FROM transactions
             WHERE owner_id = ? AND amount < 0
             ORDER BY transaction_id",
            owner,
        )
    }

    fn check_empty_dates(&self, owner: OwnerId) -> Result<Vec<TransactionId>> {
        self.query_ids(
            "SELECT transaction_id FROM transactions
             WHERE owner_id = ? AND trim(transaction_date) = ''
             ORDER BY transaction_id",
            owner,
        )
    }

    fn count_transactions(&self, owner: OwnerId) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE owner_id = ?",
            params![owner.0],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn repo() -> DuckDbRepository {
        let repo = DuckDbRepository::open_in_memory().unwrap();
        repo.ensure_schema().unwrap();
        repo
    }

    fn draft(kind: &str, amount: &str, description: &str, date: &str) -> TransactionDraft {
        TransactionDraft::parse(kind, amount, description, date).unwrap()
    }

    #[test]
    fn test_retryable_error_detection() {
        assert!(is_retryable_error(
            "The process cannot access the file because it is being used by another process"
        ));
        assert!(is_retryable_error("IO Error: Could not set lock on file \"x.duckdb\""));
        assert!(is_retryable_error("database is locked"));
        assert!(!is_retryable_error("Permission denied"));
        assert!(!is_retryable_error("Catalog Error: Table does not exist"));
    }

    #[test]
    fn test_trim_fraction() {
        assert_eq!(trim_fraction("200.5000000000"), "200.5");
        assert_eq!(trim_fraction("1000.0000000000"), "1000");
        assert_eq!(trim_fraction("0.0000000000"), "0");
        assert_eq!(trim_fraction("100"), "100");
    }

    #[test]
    fn test_largest_amount_round_trips() {
        let repo = repo();
        let owner = repo.insert_owner("max", "h").unwrap();
        let id = repo
            .insert_transaction(
                owner,
                &draft("Income", "9999999999999999999999999999", "", "2024-01-01"),
            )
            .unwrap();

        let tx = repo.get_transaction(owner, id).unwrap().unwrap();
        assert_eq!(tx.amount.to_string(), "9999999999999999999999999999");
    }

    #[test]
    fn test_timestamp_round_trip_format() {
        let dt = NaiveDateTime::parse_from_str("2024-05-06 07:08:09", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(format_timestamp(dt), "2024-05-06 07:08:09.000000");
        assert_eq!(parse_timestamp("2024-05-06 07:08:09").unwrap(), dt);
        assert_eq!(parse_timestamp("2024-05-06 07:08:09.000000").unwrap(), dt);
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_owner_insert_and_lookup() {
        let repo = repo();
        let id = repo.insert_owner("alice", "$argon2id$fake").unwrap();

        let cred = repo.find_credential("alice").unwrap().unwrap();
        assert_eq!(cred.owner_id, id);
        assert_eq!(cred.credential_hash, "$argon2id$fake");
        assert!(repo.find_credential("nobody").unwrap().is_none());

        let owner = repo.get_owner(id).unwrap().unwrap();
        assert_eq!(owner.username, "alice");
        assert!(repo.get_owner(OwnerId(id.0 + 100)).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_owner_rejected() {
        let repo = repo();
        repo.insert_owner("bob", "h1").unwrap();
        let err = repo.insert_owner("bob", "h2").unwrap_err();
        assert!(matches!(err, Error::DuplicateUsername(name) if name == "bob"));
        assert_eq!(repo.count_owners().unwrap(), 1);
    }

    #[test]
    fn test_transaction_round_trip_preserves_amount() {
        let repo = repo();
        let owner = repo.insert_owner("carol", "h").unwrap();
        let id = repo
            .insert_transaction(owner, &draft("Expense", "0.0000000001", "tiny", "2024-01-01"))
            .unwrap();

        let tx = repo.get_transaction(owner, id).unwrap().unwrap();
        assert_eq!(tx.amount, dec!(0.0000000001));
        assert_eq!(tx.kind, TransactionKind::Expense);
        assert_eq!(tx.description, "tiny");
        assert_eq!(tx.date, "2024-01-01");
        assert_eq!(tx.owner_id, owner);
    }

    #[test]
    fn test_insert_for_missing_owner_is_not_found() {
        let repo = repo();
        let err = repo
            .insert_transaction(OwnerId(999), &draft("Income", "1", "", "2024-01-01"))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(repo.count_all_transactions().unwrap(), 0);
    }

    #[test]
    fn test_scoped_update_and_delete() {
        let repo = repo();
        let alice = repo.insert_owner("alice", "h").unwrap();
        let mallory = repo.insert_owner("mallory", "h").unwrap();
        let id = repo
            .insert_transaction(alice, &draft("Income", "10", "pay", "2024-01-01"))
            .unwrap();

        let replacement = draft("Expense", "99", "stolen", "2024-02-02");
        assert!(!repo.update_transaction(mallory, id, &replacement).unwrap());
        assert!(!repo.delete_transaction(mallory, id).unwrap());
        assert!(repo.get_transaction(mallory, id).unwrap().is_none());

        let untouched = repo.get_transaction(alice, id).unwrap().unwrap();
        assert_eq!(untouched.amount, dec!(10));

        assert!(repo.update_transaction(alice, id, &replacement).unwrap());
        let updated = repo.get_transaction(alice, id).unwrap().unwrap();
        assert_eq!(updated.kind, TransactionKind::Expense);
        assert_eq!(updated.description, "stolen");

        assert!(repo.delete_transaction(alice, id).unwrap());
        assert!(!repo.delete_transaction(alice, id).unwrap());
    }

    #[test]
    fn test_health_checks_clean_store() {
        let repo = repo();
        let owner = repo.insert_owner("dave", "h").unwrap();
        repo.insert_transaction(owner, &draft("Income", "5", "", "2024-01-01"))
            .unwrap();

        assert!(repo.check_invalid_kinds(owner).unwrap().is_empty());
        assert!(repo.check_negative_amounts(owner).unwrap().is_empty());
        assert!(repo.check_empty_dates(owner).unwrap().is_empty());
        assert_eq!(repo.count_transactions(owner).unwrap(), 1);
    }

    #[test]
    fn test_health_checks_flag_bad_rows_of_one_owner() {
        let repo = repo();
        let owner = repo.insert_owner("erin", "h").unwrap();
        let neighbour = repo.insert_owner("frank", "h").unwrap();
        {
            // Row written by some other tool, bypassing validation
            let conn = repo.conn().unwrap();
            conn.execute(
                "INSERT INTO transactions
                     (owner_id, kind, amount, description, transaction_date,
                      created_at, updated_at)
                 VALUES (?, 'Transfer', -5, '', ' ',
                         CAST('2024-01-01' AS TIMESTAMP), CAST('2024-01-01' AS TIMESTAMP))",
                params![owner.0],
            )
            .unwrap();
        }

        assert_eq!(repo.check_invalid_kinds(owner).unwrap().len(), 1);
        assert_eq!(repo.check_negative_amounts(owner).unwrap().len(), 1);
        assert_eq!(repo.check_empty_dates(owner).unwrap().len(), 1);
        assert_eq!(repo.count_transactions(owner).unwrap(), 1);
        assert!(matches!(
            repo.list_transactions(owner),
            Err(Error::Database(_))
        ));

        // Another owner's checks never see the row
        assert!(repo.check_invalid_kinds(neighbour).unwrap().is_empty());
        assert!(repo.check_negative_amounts(neighbour).unwrap().is_empty());
        assert!(repo.check_empty_dates(neighbour).unwrap().is_empty());
        assert_eq!(repo.count_transactions(neighbour).unwrap(), 0);
    }
}
