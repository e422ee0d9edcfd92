//! Summary command - income, expenses and balance

use anyhow::Result;
use colored::Colorize;

use super::{get_owner_context, Credentials};
use crate::output;

pub fn run(mut credentials: Credentials, json: bool) -> Result<()> {
    let (ctx, owner) = get_owner_context(&mut credentials)?;
    let summary = ctx.report_service.summary(owner)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary.rounded())?);
        return Ok(());
    }

    let symbol = &ctx.config.currency_symbol;
    println!("{}", "Summary".bold());

    let mut table = output::create_table();
    table.add_row(vec![
        "Total income".to_string(),
        output::format_money(summary.total_income, symbol),
    ]);
    table.add_row(vec![
        "Total expenses".to_string(),
        output::format_money(summary.total_expenses, symbol),
    ]);
    table.add_row(vec![
        "Balance".to_string(),
        output::colored_money(summary.balance, symbol).to_string(),
    ]);
    println!("{}", table);
    Ok(())
}
