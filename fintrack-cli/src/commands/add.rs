//! Add command - record an income or expense

use anyhow::Result;
use chrono::Local;
use dialoguer::{Input, Select};
use serde_json::json;

use super::{get_owner_context, Credentials};
use crate::output;
use fintrack_core::TransactionKind;

pub fn run(
    mut credentials: Credentials,
    kind: Option<String>,
    amount: Option<String>,
    description: Option<String>,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let (ctx, owner) = get_owner_context(&mut credentials)?;

    let kind = match kind {
        Some(k) => k,
        None => prompt_kind(None)?,
    };
    let amount = match amount {
        Some(a) => a,
        None => Input::<String>::new().with_prompt("Amount").interact_text()?,
    };
    let description = match description {
        Some(d) => d,
        None => Input::<String>::new()
            .with_prompt("Description")
            .allow_empty(true)
            .interact_text()?,
    };
    let date = date.unwrap_or_else(today);

    let id = ctx
        .ledger_service
        .add_transaction(owner, &kind, &amount, &description, &date)?;

    if json {
        println!("{}", json!({ "transaction_id": id }));
    } else {
        output::success(&format!("Added transaction {}", id));
    }
    Ok(())
}

/// Today's local date in ISO form
pub fn today() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Pick Income or Expense from a list
pub fn prompt_kind(current: Option<TransactionKind>) -> Result<String> {
    let items: Vec<&str> = TransactionKind::ALL.iter().map(|k| k.as_str()).collect();
    let default = current
        .and_then(|c| TransactionKind::ALL.iter().position(|k| *k == c))
        .unwrap_or(0);

    let selection = Select::new()
        .with_prompt("Type")
        .items(&items)
        .default(default)
        .interact()?;
    Ok(items[selection].to_string())
}
