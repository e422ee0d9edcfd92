//! CLI command implementations

pub mod add;
pub mod config;
pub mod delete;
pub mod doctor;
pub mod edit;
pub mod export;
pub mod list;
pub mod login;
pub mod logs;
pub mod register;
pub mod report;
pub mod status;
pub mod summary;

use std::path::PathBuf;

use anyhow::{Context, Result};
use dialoguer::{Input, Password};
use fintrack_core::services::{LogEvent, LoggingService};
use fintrack_core::{FintrackContext, OwnerId};

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let data_dir = get_data_dir().ok()?;
    std::fs::create_dir_all(&data_dir).ok()?;
    match LoggingService::new(&data_dir, env!("CARGO_PKG_VERSION")) {
        Ok(service) => Some(service),
        Err(e) => {
            tracing::warn!(error = %e, "event log unavailable");
            None
        }
    }
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        if let Err(e) = l.log(event) {
            tracing::warn!(error = %e, "failed to write event log");
        }
    }
}

/// Get the data directory from environment or default
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("FINTRACK_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(".fintrack"))
}

/// Open the fintrack context for the data directory
pub fn get_context() -> Result<FintrackContext> {
    let data_dir = get_data_dir()?;
    FintrackContext::new(&data_dir).context("Failed to initialize fintrack context")
}

/// Username and password from flags or environment, prompted when missing
pub struct Credentials {
    user: Option<String>,
    password: Option<String>,
}

impl Credentials {
    pub fn new(user: Option<String>, password: Option<String>) -> Self {
        Self { user, password }
    }

    pub fn username(&mut self) -> Result<String> {
        if let Some(user) = &self.user {
            return Ok(user.clone());
        }
        let user: String = Input::new().with_prompt("Username").interact_text()?;
        self.user = Some(user.clone());
        Ok(user)
    }

    pub fn password(&mut self) -> Result<String> {
        if let Some(password) = &self.password {
            return Ok(password.clone());
        }
        let password = Password::new().with_prompt("Password").interact()?;
        self.password = Some(password.clone());
        Ok(password)
    }

    /// Password for a new account, asked twice when prompted
    pub fn new_password(&mut self) -> Result<String> {
        if let Some(password) = &self.password {
            return Ok(password.clone());
        }
        let password = Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()?;
        self.password = Some(password.clone());
        Ok(password)
    }

    /// Authenticate against the context and return the owner id
    pub fn authenticate(&mut self, ctx: &FintrackContext) -> Result<OwnerId> {
        let username = self.username()?;
        let password = self.password()?;
        Ok(ctx.credential_service.authenticate(&username, &password)?)
    }
}

/// Open the context and sign in in one step
pub fn get_owner_context(credentials: &mut Credentials) -> Result<(FintrackContext, OwnerId)> {
    let ctx = get_context()?;
    let owner = credentials.authenticate(&ctx)?;
    Ok((ctx, owner))
}
