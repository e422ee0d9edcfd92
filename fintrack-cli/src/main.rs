//! Fintrack CLI - personal income and expense tracking in your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{
    add, config, delete, doctor, edit, export, get_logger, list, log_event, login, logs, register,
    report, status, summary, Credentials,
};
use fintrack_core::services::{LogEvent, LoggingService};

/// Fintrack - personal income and expense tracking in your terminal
#[derive(Parser)]
#[command(name = "ft", version, about, long_about = None)]
struct Cli {
    /// Username to act as
    #[arg(long, short, global = true, env = "FINTRACK_USER")]
    user: Option<String>,

    /// Password (prompted when omitted)
    #[arg(long, global = true, env = "FINTRACK_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new user
    Register {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check a username and password
    Login,

    /// Record an income or expense
    Add {
        /// Income or Expense
        #[arg(long, short)]
        kind: Option<String>,
        /// Amount, always positive
        #[arg(long, short)]
        amount: Option<String>,
        /// Free-text description
        #[arg(long, short)]
        description: Option<String>,
        /// Date (defaults to today, YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List transactions
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change every field of a transaction
    Edit {
        /// Transaction ID
        id: i64,
        /// Income or Expense
        #[arg(long, short)]
        kind: Option<String>,
        /// Amount, always positive
        #[arg(long, short)]
        amount: Option<String>,
        /// Free-text description
        #[arg(long, short)]
        description: Option<String>,
        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },

    /// Delete a transaction
    Delete {
        /// Transaction ID
        id: i64,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Show income, expenses and balance
    Summary {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Totals and time series for charts
    Report {
        #[command(subcommand)]
        command: report::ReportCommands,
    },

    /// Export transactions to CSV or JSON
    Export {
        /// Output format
        #[arg(long, value_enum, default_value = "csv")]
        format: export::ExportFormat,
        /// Output file (stdout if omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Show transaction counts and date range
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check your transactions for rows other tools may have broken
    Doctor {
        /// List the transaction ids behind each problem
        #[arg(long, short)]
        verbose: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or change settings
    Config {
        #[command(subcommand)]
        command: Option<config::ConfigCommands>,
    },

    /// View and manage application logs
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    /// Command name as recorded in the event log
    fn name(&self) -> &'static str {
        match self {
            Commands::Register { .. } => "register",
            Commands::Login => "login",
            Commands::Add { .. } => "add",
            Commands::List { .. } => "list",
            Commands::Edit { .. } => "edit",
            Commands::Delete { .. } => "delete",
            Commands::Summary { .. } => "summary",
            Commands::Report { .. } => "report",
            Commands::Export { .. } => "export",
            Commands::Status { .. } => "status",
            Commands::Doctor { .. } => "doctor",
            Commands::Config { .. } => "config",
            Commands::Logs { .. } => "logs",
        }
    }
}

/// Diagnostics go to stderr, filtered by FINTRACK_LOG (default: warn)
fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("FINTRACK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let command_name = cli.command.name();
    let logger = get_logger();

    match run(cli, logger.as_ref()) {
        Ok(()) => {
            log_event(&logger, LogEvent::new("command_executed").with_command(command_name));
            ExitCode::SUCCESS
        }
        Err(e) => {
            let event = LogEvent::new("command_failed").with_command(command_name);
            let event = match e.downcast_ref::<fintrack_core::Error>() {
                Some(core_error) => event.with_error(core_error),
                None => event.with_error_message("cli", format!("{:#}", e)),
            };
            log_event(&logger, event);

            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, logger: Option<&LoggingService>) -> Result<()> {
    let credentials = Credentials::new(cli.user, cli.password);

    match cli.command {
        Commands::Register { json } => register::run(credentials, json),
        Commands::Login => login::run(credentials),
        Commands::Add {
            kind,
            amount,
            description,
            date,
            json,
        } => add::run(credentials, kind, amount, description, date, json),
        Commands::List { json } => list::run(credentials, json),
        Commands::Edit {
            id,
            kind,
            amount,
            description,
            date,
        } => edit::run(credentials, id, kind, amount, description, date),
        Commands::Delete { id, force } => delete::run(credentials, id, force),
        Commands::Summary { json } => summary::run(credentials, json),
        Commands::Report { command } => report::run(credentials, command),
        Commands::Export { format, output } => export::run(credentials, format, output),
        Commands::Status { json } => status::run(credentials, json),
        Commands::Doctor { verbose, json } => doctor::run(credentials, verbose, json),
        Commands::Config { command } => config::run(command),
        Commands::Logs { command } => logs::run(command, logger),
    }
}
