//! Doctor command - integrity checks over your own transactions

use anyhow::{bail, Result};
use colored::Colorize;
use comfy_table::{Cell, Color};

use super::{get_owner_context, Credentials};
use crate::output;
use fintrack_core::services::CheckStatus;

fn status_cell(status: CheckStatus) -> Cell {
    match status {
        CheckStatus::Pass => Cell::new("ok").fg(Color::Green),
        CheckStatus::Warning => Cell::new("warning").fg(Color::Yellow),
        CheckStatus::Error => Cell::new("error").fg(Color::Red),
    }
}

pub fn run(mut credentials: Credentials, verbose: bool, json: bool) -> Result<()> {
    let (ctx, owner) = get_owner_context(&mut credentials)?;
    let report = ctx.doctor_service.run_checks(owner)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", "Ledger integrity".bold());

        let mut table = output::create_table();
        table.set_header(vec!["Check", "Result", "Details"]);
        for (name, check) in &report.checks {
            let mut details = check.message.clone();
            if verbose && !check.transaction_ids.is_empty() {
                let ids: Vec<String> =
                    check.transaction_ids.iter().map(|id| id.to_string()).collect();
                details.push_str(&format!("\nids: {}", ids.join(", ")));
            }
            table.add_row(vec![
                Cell::new(name),
                status_cell(check.status),
                Cell::new(details),
            ]);
        }
        println!("{}", table);

        let summary = &report.summary;
        println!(
            "{} ok, {} warning(s), {} error(s) across {} transaction(s)",
            summary.passed.to_string().green(),
            summary.warnings.to_string().yellow(),
            summary.errors.to_string().red(),
            summary.transactions,
        );
    }

    if !report.is_healthy() {
        bail!("{} integrity check(s) failed", report.summary.errors);
    }
    Ok(())
}
