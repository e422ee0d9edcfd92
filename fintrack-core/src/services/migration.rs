//! Migration service - manages database schema migrations
//!
//! Migrations are SQL files embedded at compile time and applied in name
//! order. The first one creates `sys_migrations`, which records every
//! applied name so reopening a database is a no-op. The ledger database and
//! the log database each pass their own set.

use std::collections::BTreeSet;

use chrono::Utc;
use duckdb::{params, Connection};

use crate::adapters::duckdb::format_timestamp;
use crate::domain::result::Result;

/// Embedded migrations as `(file name, sql)` pairs
pub type MigrationSet = &'static [(&'static str, &'static str)];

/// Result of running migrations
#[derive(Debug)]
pub struct MigrationResult {
    /// Names of newly applied migrations
    pub applied: Vec<String>,
    /// Count of migrations that were already applied
    pub already_applied: usize,
}

/// Applies a migration set to one connection
pub struct MigrationService<'a> {
    conn: &'a Connection,
    migrations: MigrationSet,
}

impl<'a> MigrationService<'a> {
    pub fn new(conn: &'a Connection, migrations: MigrationSet) -> Self {
        Self { conn, migrations }
    }

    /// Apply every migration not yet recorded, each in its own transaction
    pub fn run_pending(&self) -> Result<MigrationResult> {
        let recorded = self.recorded()?;
        let mut applied = Vec::new();

        for (name, sql) in self.migrations {
            if recorded.contains(*name) {
                continue;
            }
            self.apply(name, sql)?;
            tracing::debug!(migration = *name, "applied migration");
            applied.push(name.to_string());
        }

        Ok(MigrationResult {
            applied,
            already_applied: recorded.len(),
        })
    }

    /// Names recorded in sys_migrations, in order
    pub fn get_applied(&self) -> Result<Vec<String>> {
        Ok(self.recorded()?.into_iter().collect())
    }

    /// Names of migrations that `run_pending` would apply
    pub fn get_pending(&self) -> Result<Vec<String>> {
        let recorded = self.recorded()?;
        Ok(self
            .migrations
            .iter()
            .map(|(name, _)| *name)
            .filter(|name| !recorded.contains(*name))
            .map(String::from)
            .collect())
    }

    fn recorded(&self) -> Result<BTreeSet<String>> {
        let tables: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = 'sys_migrations'",
            [],
            |row| row.get(0),
        )?;
        if tables == 0 {
            return Ok(BTreeSet::new());
        }

        let mut stmt = self
            .conn
            .prepare("SELECT migration_name FROM sys_migrations")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<std::result::Result<BTreeSet<String>, duckdb::Error>>()?)
    }

    /// Run one migration and record it atomically
    fn apply(&self, name: &str, sql: &str) -> Result<()> {
        self.conn.execute_batch("BEGIN TRANSACTION")?;
        let outcome = self.conn.execute_batch(sql).and_then(|_| {
            self.conn.execute(
                "INSERT INTO sys_migrations (migration_name, applied_at)
                 VALUES (?, CAST(? AS TIMESTAMP))",
                params![name, format_timestamp(Utc::now().naive_utc())],
            )
        });

        match outcome {
            Ok(_) => {
                self.conn.execute_batch("COMMIT")?;
                Ok(())
            }
            Err(e) => {
                if let Err(rollback) = self.conn.execute_batch("ROLLBACK") {
                    tracing::warn!(migration = name, error = %rollback, "rollback failed");
                }
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_migrations::LOG_MIGRATIONS;
    use crate::migrations::MIGRATIONS;

    #[test]
    fn test_fresh_database_gets_everything_once() {
        let conn = Connection::open_in_memory().unwrap();
        let service = MigrationService::new(&conn, MIGRATIONS);
        assert_eq!(service.get_pending().unwrap().len(), MIGRATIONS.len());

        let first = service.run_pending().unwrap();
        assert_eq!(first.applied.len(), MIGRATIONS.len());
        assert_eq!(first.already_applied, 0);
        assert!(service.get_pending().unwrap().is_empty());

        let second = service.run_pending().unwrap();
        assert!(second.applied.is_empty());
        assert_eq!(second.already_applied, MIGRATIONS.len());
        assert_eq!(service.get_applied().unwrap().len(), MIGRATIONS.len());
    }

    #[test]
    fn test_failed_migration_is_not_recorded() {
        static BROKEN: &[(&str, &str)] = &[
            ("000_migrations.sql", include_str!("../migrations/000_migrations.sql")),
            ("001_broken.sql", "CREATE TABLE half (id INTEGER); SELECT * FROM missing_table;"),
        ];
        let conn = Connection::open_in_memory().unwrap();
        let service = MigrationService::new(&conn, BROKEN);

        assert!(service.run_pending().is_err());
        assert_eq!(service.get_pending().unwrap(), vec!["001_broken.sql"]);

        let half: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = 'half'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(half, 0);
    }

    #[test]
    fn test_log_migrations_apply() {
        let conn = Connection::open_in_memory().unwrap();
        let result = MigrationService::new(&conn, LOG_MIGRATIONS)
            .run_pending()
            .unwrap();
        assert_eq!(result.applied.len(), LOG_MIGRATIONS.len());

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM sys_logs", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
