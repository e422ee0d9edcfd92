//! Event log kept in `logs.duckdb`, separate from the ledger
//!
//! Rows hold event names, command names and error codes. Usernames,
//! credentials, amounts, descriptions and dates never reach this table, and
//! errors caused by user input keep their kind but not their message.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use duckdb::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};
use crate::log_migrations::LOG_MIGRATIONS;
use crate::services::MigrationService;

/// File name of the event log inside the data directory
pub const LOG_DB_FILENAME: &str = "logs.duckdb";

/// Column order read by `LogEntry::from_row`
const ENTRY_COLUMNS: &str =
    "id, timestamp, app_version, platform, event, command, error_kind, error_message";

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Row id: milliseconds in the high bits, a 16-bit sequence in the low bits
fn next_id() -> u64 {
    let millis = now_ms().max(0) as u64;
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed) & 0xFFFF;
    (millis << 16) | seq
}

/// Unix time in milliseconds
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Event to append; version and platform are filled in by the service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl LogEvent {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            command: None,
            error_kind: None,
            error_message: None,
        }
    }

    /// CLI subcommand that produced the event
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Attach a core error
    ///
    /// User errors can echo back what was typed, so only their kind is kept.
    pub fn with_error(mut self, error: &Error) -> Self {
        self.error_kind = Some(error.kind().to_string());
        self.error_message = if error.is_user_error() {
            None
        } else {
            Some(error.to_string())
        };
        self
    }

    /// Attach a free-form error that did not come from the core
    pub fn with_error_message(
        mut self,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.error_kind = Some(kind.into());
        self.error_message = Some(message.into());
        self
    }
}

/// Stored row of `sys_logs`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: i64,
    pub app_version: String,
    pub platform: String,
    pub event: String,
    pub command: Option<String>,
    pub error_kind: Option<String>,
    pub error_message: Option<String>,
}

impl LogEntry {
    fn from_row(row: &duckdb::Row) -> duckdb::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            app_version: row.get(2)?,
            platform: row.get(3)?,
            event: row.get(4)?,
            command: row.get(5)?,
            error_kind: row.get(6)?,
            error_message: row.get(7)?,
        })
    }
}

/// Counts shown by `logs stats`
#[derive(Debug, Clone, Serialize)]
pub struct LogStats {
    pub total: u64,
    pub errors: u64,
    pub oldest: Option<i64>,
    pub newest: Option<i64>,
}

/// Append-only event log with simple queries for `ft logs`
pub struct LoggingService {
    conn: Mutex<Connection>,
    db_path: PathBuf,
    app_version: String,
    platform: &'static str,
}

impl LoggingService {
    /// Open `logs.duckdb` under `data_dir`, creating and migrating it as needed
    pub fn new(data_dir: &Path, app_version: impl Into<String>) -> Result<Self> {
        let db_path = data_dir.join(LOG_DB_FILENAME);
        let conn = Connection::open(&db_path)?;

        let service = Self {
            conn: Mutex::new(conn),
            db_path,
            app_version: app_version.into(),
            platform: std::env::consts::OS,
        };

        {
            let conn = service.conn()?;
            MigrationService::new(&conn, LOG_MIGRATIONS).run_pending()?;
        }

        Ok(service)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::database(format!("Lock poisoned: {}", e)))
    }

    /// Append one event
    pub fn log(&self, event: LogEvent) -> Result<()> {
        let sql = format!(
            "INSERT INTO sys_logs ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            ENTRY_COLUMNS
        );
        self.conn()?.execute(
            &sql,
            params![
                next_id(),
                now_ms(),
                &self.app_version,
                self.platform,
                &event.event,
                &event.command,
                &event.error_kind,
                &event.error_message,
            ],
        )?;

        Ok(())
    }

    pub fn log_event(&self, name: &str) -> Result<()> {
        self.log(LogEvent::new(name))
    }

    /// Record a successful CLI command
    pub fn log_command(&self, command: &str) -> Result<()> {
        self.log(LogEvent::new("command_executed").with_command(command))
    }

    /// Record a failed CLI command
    pub fn log_error(&self, event: &str, command: &str, error: &Error) -> Result<()> {
        self.log(LogEvent::new(event).with_command(command).with_error(error))
    }

    /// Latest `limit` entries, newest first
    pub fn get_recent(&self, limit: usize) -> Result<Vec<LogEntry>> {
        self.entries(false, limit)
    }

    /// Latest `limit` entries that carry an error, newest first
    pub fn get_errors(&self, limit: usize) -> Result<Vec<LogEntry>> {
        self.entries(true, limit)
    }

    fn entries(&self, errors_only: bool, limit: usize) -> Result<Vec<LogEntry>> {
        let filter = if errors_only {
            "WHERE error_kind IS NOT NULL"
        } else {
            ""
        };
        let sql = format!(
            "SELECT {} FROM sys_logs {} ORDER BY id DESC LIMIT ?",
            ENTRY_COLUMNS, filter
        );

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([limit as i64], LogEntry::from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, duckdb::Error>>()?)
    }

    pub fn count(&self) -> Result<u64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM sys_logs", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Totals and time span of the log
    pub fn stats(&self) -> Result<LogStats> {
        let conn = self.conn()?;
        let (total, errors, oldest, newest): (i64, i64, Option<i64>, Option<i64>) = conn
            .query_row(
                "SELECT COUNT(*), COUNT(error_kind), MIN(timestamp), MAX(timestamp) FROM sys_logs",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )?;

        Ok(LogStats {
            total: total as u64,
            errors: errors as u64,
            oldest,
            newest,
        })
    }

    /// Remove entries older than `timestamp_ms`; returns how many went
    pub fn delete_before(&self, timestamp_ms: i64) -> Result<u64> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM sys_logs WHERE timestamp < ?", [timestamp_ms])?;
        Ok(deleted as u64)
    }

    /// Copy the log database to `destination`
    ///
    /// The lock is held across the checkpoint and the copy so no write lands
    /// in between.
    pub fn export(&self, destination: &Path) -> Result<PathBuf> {
        let conn = self.conn()?;
        conn.execute("CHECKPOINT", [])?;
        std::fs::copy(&self.db_path, destination)?;
        Ok(destination.to_path_buf())
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}
