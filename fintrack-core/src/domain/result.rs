//! Result and error types for the core library

use thiserror::Error;

/// Core library error type
///
/// The first five variants are the caller-facing failures of the ledger
/// operations. `Overflow` is returned by reports whose totals do not fit a
/// `Decimal`. The rest are infrastructure failures.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Username already exists: {0}")]
    DuplicateUsername(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Total exceeds the supported range: {0}")]
    Overflow(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an invalid amount error
    pub fn invalid_amount(msg: impl Into<String>) -> Self {
        Self::InvalidAmount(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an overflow error for an aggregate that no longer fits a Decimal
    pub fn overflow(msg: impl Into<String>) -> Self {
        Self::Overflow(msg.into())
    }

    /// Create a database error
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Stable machine-readable code, used by the event log
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "invalid_input",
            Error::InvalidAmount(_) => "invalid_amount",
            Error::DuplicateUsername(_) => "duplicate_username",
            Error::InvalidCredentials => "invalid_credentials",
            Error::NotFound(_) => "not_found",
            Error::Overflow(_) => "overflow",
            Error::Database(_) => "database",
            Error::Credential(_) => "credential",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
            Error::Csv(_) => "csv",
        }
    }

    /// True for failures caused by the caller's input rather than the system
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidInput(_)
                | Error::InvalidAmount(_)
                | Error::DuplicateUsername(_)
                | Error::InvalidCredentials
                | Error::NotFound(_)
        )
    }
}

impl From<duckdb::Error> for Error {
    fn from(e: duckdb::Error) -> Self {
        Self::Database(e.to_string())
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;
