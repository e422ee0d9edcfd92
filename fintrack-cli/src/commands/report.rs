//! Report command - totals and chart-ready series

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use serde_json::json;

use super::{get_owner_context, Credentials};
use crate::output;
use fintrack_core::domain::report::round_money;
use fintrack_core::TransactionKind;

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Total per type with its share of the whole
    Totals {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Expenses per date
    Trend {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Running balance after each date
    Balance {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(mut credentials: Credentials, command: ReportCommands) -> Result<()> {
    let (ctx, owner) = get_owner_context(&mut credentials)?;
    let symbol = ctx.config.currency_symbol.clone();

    match command {
        ReportCommands::Totals { json } => {
            let totals = ctx.report_service.totals_by_kind(owner)?;

            if json {
                let rows: Vec<_> = totals
                    .iter()
                    .map(|(kind, total)| {
                        json!({
                            "type": kind,
                            "total": total,
                            "share": totals.share(kind).map(round_money),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
                return Ok(());
            }

            if totals.is_empty() {
                output::info("No transactions yet.");
                return Ok(());
            }

            println!("{}", "Totals by type".bold());
            let mut table = output::create_table();
            table.set_header(vec!["Type", "Total", "Share"]);
            for kind in TransactionKind::ALL {
                if let Some(total) = totals.get(kind) {
                    let share = totals
                        .share(kind)
                        .map(|s| format!("{}%", round_money(s)))
                        .unwrap_or_else(|| "-".to_string());
                    table.add_row(vec![
                        output::colored_kind(kind).to_string(),
                        output::format_money(total, &symbol),
                        share,
                    ]);
                }
            }
            println!("{}", table);
        }
        ReportCommands::Trend { json } => {
            let trend = ctx.report_service.expense_trend(owner)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&trend)?);
                return Ok(());
            }

            if trend.is_empty() {
                output::info("No expenses yet.");
                return Ok(());
            }

            println!("{}", "Expenses by date".bold());
            let mut table = output::create_table();
            table.set_header(vec!["Date", "Expenses"]);
            for point in &trend {
                table.add_row(vec![
                    point.date.clone(),
                    output::format_money(point.total, &symbol),
                ]);
            }
            println!("{}", table);
        }
        ReportCommands::Balance { json } => {
            let points = ctx.report_service.running_balance(owner)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&points)?);
                return Ok(());
            }

            if points.is_empty() {
                output::info("No transactions yet.");
                return Ok(());
            }

            println!("{}", "Running balance".bold());
            let mut table = output::create_table();
            table.set_header(vec!["Date", "Balance"]);
            for point in &points {
                table.add_row(vec![
                    point.date.clone(),
                    output::colored_money(point.balance, &symbol).to_string(),
                ]);
            }
            println!("{}", table);
        }
    }

    Ok(())
}
