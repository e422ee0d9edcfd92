//! Logs command - inspect and prune the event log

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{Local, TimeZone};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;

use super::get_data_dir;
use crate::output;
use fintrack_core::services::logging::now_ms;
use fintrack_core::services::{LogEntry, LoggingService};

const DAY_MS: i64 = 86_400_000;

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Print the latest events
    List {
        /// How many events to print
        #[arg(short = 'n', long, default_value_t = 50)]
        limit: usize,
        /// Only events that carry an error
        #[arg(long)]
        errors: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Drop events older than a number of days
    Clear {
        /// Age in days; newer events are kept
        #[arg(long, default_value_t = 30)]
        days: u32,
        /// Do not ask for confirmation
        #[arg(long, short)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Copy logs.duckdb somewhere, e.g. to attach to a bug report
    Export {
        /// Destination file
        path: PathBuf,
    },
    /// Entry counts, time span and file size
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn local_time(timestamp_ms: i64) -> String {
    match Local.timestamp_millis_opt(timestamp_ms).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => format!("@{}", timestamp_ms),
    }
}

fn print_entries(entries: &[LogEntry]) {
    let mut table = output::create_table();
    table.set_header(vec!["When", "Event", "Command", "Error"]);
    for entry in entries {
        let error = match (&entry.error_kind, &entry.error_message) {
            (Some(kind), Some(message)) => format!("{}: {}", kind.red(), message),
            (Some(kind), None) => kind.red().to_string(),
            _ => String::new(),
        };
        table.add_row(vec![
            local_time(entry.timestamp),
            entry.event.clone(),
            entry.command.clone().unwrap_or_default(),
            error,
        ]);
    }
    println!("{}", table);
}

/// Takes the logger opened in `main` rather than opening logs.duckdb again
pub fn run(command: LogsCommands, logger: Option<&LoggingService>) -> Result<()> {
    let Some(log) = logger else {
        bail!(
            "Could not open the event log in {}",
            get_data_dir()?.display()
        );
    };

    match command {
        LogsCommands::List {
            limit,
            errors,
            json,
        } => {
            let entries = if errors {
                log.get_errors(limit)?
            } else {
                log.get_recent(limit)?
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                output::info("The event log is empty.");
            } else {
                print_entries(&entries);
            }
        }
        LogsCommands::Clear { days, force, json } => {
            let confirmed = force
                || json
                || Confirm::new()
                    .with_prompt(format!("Remove events older than {} day(s)?", days))
                    .default(false)
                    .interact()?;
            if !confirmed {
                output::warning("Cancelled.");
                return Ok(());
            }

            let removed = log.delete_before(now_ms() - i64::from(days) * DAY_MS)?;
            if json {
                println!("{}", serde_json::json!({ "removed": removed }));
            } else {
                output::success(&format!("Removed {} event(s)", removed));
            }
        }
        LogsCommands::Export { path } => {
            let written = log
                .export(&path)
                .with_context(|| format!("Could not copy the event log to {}", path.display()))?;
            output::success(&format!("Event log copied to {}", written.display()));
        }
        LogsCommands::Stats { json } => {
            let stats = log.stats()?;
            let size = std::fs::metadata(log.db_path())
                .map(|meta| meta.len())
                .unwrap_or(0);

            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "stats": stats,
                        "path": log.db_path(),
                        "sizeBytes": size,
                    })
                );
                return Ok(());
            }

            println!("{}", "Event log".bold());
            println!("  Events: {} ({} with errors)", stats.total, stats.errors);
            if let (Some(oldest), Some(newest)) = (stats.oldest, stats.newest) {
                println!("  From {} to {}", local_time(oldest), local_time(newest));
            }
            println!("  File: {} ({})", log.db_path().display(), output::format_size(size));
        }
    }

    Ok(())
}
