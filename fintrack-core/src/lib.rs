//! Fintrack Core - ledger and reporting logic for personal finance
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core business entities (Owner, Transaction, report values)
//! - **ports**: Trait definitions for external dependencies (Repository)
//! - **services**: Business logic orchestration
//! - **adapters**: Concrete implementations (DuckDB)
//!
//! Every ledger and report operation takes an explicit [`OwnerId`], obtained
//! from [`CredentialService::authenticate`]. There is no "current owner".

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use adapters::duckdb::DuckDbRepository;
use config::Config;
use ports::Repository;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, Result};
pub use domain::{
    Argon2Params, BalancePoint, KindTotals, Owner, OwnerId, SnapshotRow, Summary, Transaction,
    TransactionId, TransactionKind, TrendPoint,
};

/// Main context for Fintrack operations
///
/// This is the primary entry point for all business logic. It holds
/// the database connection, configuration, and all services.
pub struct FintrackContext {
    pub config: Config,
    pub data_dir: PathBuf,
    pub repository: Arc<DuckDbRepository>,
    pub credential_service: CredentialService,
    pub ledger_service: LedgerService,
    pub report_service: ReportService,
    pub export_service: ExportService,
    pub status_service: StatusService,
    pub doctor_service: DoctorService,
}

impl FintrackContext {
    /// Open the data directory with its settings.json
    pub fn new(data_dir: &Path) -> anyhow::Result<Self> {
        let config = Config::load(data_dir)?;
        Self::with_config(data_dir, config)
    }

    /// Open the data directory with an explicit configuration
    pub fn with_config(data_dir: &Path, config: Config) -> anyhow::Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create {}", data_dir.display()))?;

        let db_path = config.db_path(data_dir);
        let repository = Arc::new(
            DuckDbRepository::new(&db_path)
                .with_context(|| format!("Failed to open {}", db_path.display()))?,
        );

        // Initialize schema
        repository.ensure_schema()?;

        let shared: Arc<dyn Repository> = repository.clone();

        Ok(Self {
            credential_service: CredentialService::new(Arc::clone(&shared), config.argon2),
            ledger_service: LedgerService::new(Arc::clone(&shared)),
            report_service: ReportService::new(Arc::clone(&shared)),
            export_service: ExportService::new(Arc::clone(&shared)),
            status_service: StatusService::new(Arc::clone(&shared)),
            doctor_service: DoctorService::new(shared),
            config,
            data_dir: data_dir.to_path_buf(),
            repository,
        })
    }
}
