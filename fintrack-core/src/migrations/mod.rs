//! Ledger schema, embedded with include_str!
//!
//! New files are named `NNN_description.sql` and appended below; entries
//! are applied in this order and never edited once released.

use crate::services::migration::MigrationSet;

pub const MIGRATIONS: MigrationSet = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    ("001_initial_schema.sql", include_str!("001_initial_schema.sql")),
];
