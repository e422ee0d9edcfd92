//! Delete command - remove a transaction permanently

use anyhow::Result;
use dialoguer::Confirm;

use super::{get_owner_context, Credentials};
use crate::output;
use fintrack_core::TransactionId;

pub fn run(mut credentials: Credentials, id: i64, force: bool) -> Result<()> {
    let (ctx, owner) = get_owner_context(&mut credentials)?;
    let id = TransactionId(id);

    if !force
        && !Confirm::new()
            .with_prompt(format!("Delete transaction {}?", id))
            .default(false)
            .interact()?
    {
        output::warning("Cancelled.");
        return Ok(());
    }

    ctx.ledger_service.delete_transaction(owner, id)?;
    output::success(&format!("Deleted transaction {}", id));
    Ok(())
}
