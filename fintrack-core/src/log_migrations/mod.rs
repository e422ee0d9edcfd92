//! Event log schema for logs.duckdb

use crate::services::migration::MigrationSet;

pub const LOG_MIGRATIONS: MigrationSet = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    ("001_initial_schema.sql", include_str!("001_initial_schema.sql")),
];
