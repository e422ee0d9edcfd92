//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

mod credential;
mod doctor;
mod export;
mod ledger;
pub mod logging;
pub mod migration;
mod report;
mod status;

pub use credential::CredentialService;
pub use doctor::{CheckResult, CheckStatus, DoctorResult, DoctorService, DoctorSummary};
pub use export::ExportService;
pub use ledger::LedgerService;
pub use logging::{LogEntry, LogEvent, LogStats, LoggingService};
pub use migration::{MigrationResult, MigrationService};
pub use report::ReportService;
pub use status::{DateRange, StatusService, StatusSummary};
