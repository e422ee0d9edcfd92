//! Status command - transaction counts and date range

use anyhow::Result;
use colored::Colorize;

use super::{get_owner_context, Credentials};
use crate::output;

pub fn run(mut credentials: Credentials, json: bool) -> Result<()> {
    let (ctx, owner) = get_owner_context(&mut credentials)?;
    let status = ctx.status_service.get_status(owner)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "Ledger Status".bold());
    println!();

    let mut table = output::create_table();
    table.add_row(vec!["Transactions", &status.transaction_count.to_string()]);
    table.add_row(vec!["Income", &status.income_count.to_string()]);
    table.add_row(vec!["Expenses", &status.expense_count.to_string()]);
    println!("{}", table);

    let range = &status.date_range;
    if let (Some(earliest), Some(latest)) = (&range.earliest, &range.latest) {
        println!();
        println!("Date range: {} to {}", earliest, latest);
    }
    if let Some(path) = ctx.repository.db_path() {
        println!("{}", format!("Database: {}", path.display()).dimmed());
    }

    Ok(())
}
