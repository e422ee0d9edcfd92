//! Login command - verify a username and password

use anyhow::Result;

use super::{get_context, Credentials};
use crate::output;

pub fn run(mut credentials: Credentials) -> Result<()> {
    let ctx = get_context()?;
    let owner_id = credentials.authenticate(&ctx)?;
    let owner = ctx.credential_service.get_owner(owner_id)?;
    output::success(&format!("Welcome, {}!", owner.username));
    Ok(())
}
