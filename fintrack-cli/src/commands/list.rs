//! List command - show the signed-in user's transactions

use anyhow::Result;

use super::{get_owner_context, Credentials};
use crate::output;

pub fn run(mut credentials: Credentials, json: bool) -> Result<()> {
    let (ctx, owner) = get_owner_context(&mut credentials)?;
    let transactions = ctx.ledger_service.list_transactions(owner)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&transactions)?);
        return Ok(());
    }

    if transactions.is_empty() {
        output::info("No transactions yet. Add one with `ft add`.");
        return Ok(());
    }

    let symbol = &ctx.config.currency_symbol;
    let mut table = output::create_table();
    table.set_header(vec!["ID", "Type", "Amount", "Description", "Date"]);
    for tx in &transactions {
        table.add_row(vec![
            tx.id.to_string(),
            output::colored_kind(tx.kind).to_string(),
            output::format_money(tx.amount, symbol),
            tx.description.clone(),
            tx.date.clone(),
        ]);
    }

    println!("{}", table);
    println!("{} transaction(s)", transactions.len());
    Ok(())
}
