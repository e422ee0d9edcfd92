//! Register command - create a new user

use anyhow::Result;
use serde_json::json;

use super::{get_context, Credentials};
use crate::output;

pub fn run(mut credentials: Credentials, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let username = credentials.username()?;
    let password = credentials.new_password()?;

    let owner = ctx.credential_service.register(&username, &password)?;

    if json {
        println!("{}", json!({ "owner_id": owner }));
    } else {
        output::success(&format!("Registered {}", username.trim()));
    }
    Ok(())
}
