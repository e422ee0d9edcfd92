//! Edit command - replace every field of a transaction

use anyhow::Result;
use dialoguer::Input;

use super::add::prompt_kind;
use super::{get_owner_context, Credentials};
use crate::output;
use fintrack_core::TransactionId;

pub fn run(
    mut credentials: Credentials,
    id: i64,
    kind: Option<String>,
    amount: Option<String>,
    description: Option<String>,
    date: Option<String>,
) -> Result<()> {
    let (ctx, owner) = get_owner_context(&mut credentials)?;
    let id = TransactionId(id);

    // Current values pre-fill any field not given on the command line
    let current = ctx.ledger_service.get_transaction(owner, id)?;

    let kind = match kind {
        Some(k) => k,
        None => prompt_kind(Some(current.kind))?,
    };
    let amount = match amount {
        Some(a) => a,
        None => Input::<String>::new()
            .with_prompt("Amount")
            .with_initial_text(current.amount.to_string())
            .interact_text()?,
    };
    let description = match description {
        Some(d) => d,
        None => Input::<String>::new()
            .with_prompt("Description")
            .with_initial_text(current.description.clone())
            .interact_text()?,
    };
    let date = match date {
        Some(d) => d,
        None => Input::<String>::new()
            .with_prompt("Date")
            .with_initial_text(current.date.clone())
            .interact_text()?,
    };

    ctx.ledger_service
        .update_transaction(owner, id, &kind, &amount, &description, &date)?;

    output::success(&format!("Updated transaction {}", id));
    Ok(())
}
