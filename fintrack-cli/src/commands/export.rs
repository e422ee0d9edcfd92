//! Export command - write transactions as CSV or JSON

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ValueEnum;

use super::{get_owner_context, Credentials};
use crate::output;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

pub fn run(
    mut credentials: Credentials,
    format: ExportFormat,
    path: Option<PathBuf>,
) -> Result<()> {
    let (ctx, owner) = get_owner_context(&mut credentials)?;

    let Some(path) = path else {
        let stdout = io::stdout().lock();
        match format {
            ExportFormat::Csv => ctx.export_service.write_csv(owner, stdout)?,
            ExportFormat::Json => ctx.export_service.write_json(owner, stdout)?,
        };
        return Ok(());
    };

    let file = File::create(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let writer = BufWriter::new(file);
    let rows = match format {
        ExportFormat::Csv => ctx.export_service.write_csv(owner, writer)?,
        ExportFormat::Json => ctx.export_service.write_json(owner, writer)?,
    };

    output::success(&format!("Exported {} transaction(s) to {}", rows, path.display()));
    Ok(())
}
