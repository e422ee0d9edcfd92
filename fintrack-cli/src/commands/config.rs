//! Config command - show or change settings.json

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use super::get_data_dir;
use crate::output;
use fintrack_core::config::Config;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the current settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set the currency symbol used when printing amounts
    Currency {
        /// Symbol, e.g. $ or €
        symbol: String,
    },
}

pub fn run(command: Option<ConfigCommands>) -> Result<()> {
    let data_dir = get_data_dir()?;
    std::fs::create_dir_all(&data_dir)?;
    let mut config = Config::load(&data_dir)?;

    match command {
        Some(ConfigCommands::Currency { symbol }) => {
            let symbol = symbol.trim();
            if symbol.is_empty() {
                anyhow::bail!("Currency symbol cannot be empty");
            }
            config.currency_symbol = symbol.to_string();
            config.save(&data_dir)?;
            output::success(&format!("Currency symbol set to {}", symbol));
        }
        Some(ConfigCommands::Show { json: true }) => {
            println!(
                "{}",
                serde_json::json!({
                    "dataDir": data_dir.to_string_lossy(),
                    "dbPath": config.db_path(&data_dir).to_string_lossy(),
                    "currencySymbol": config.currency_symbol,
                    "argon2": config.argon2,
                })
            );
        }
        Some(ConfigCommands::Show { json: false }) | None => {
            println!("{}", "Settings".bold());
            println!("  Data directory: {}", data_dir.display());
            println!("  Database: {}", config.db_path(&data_dir).display());
            println!("  Currency symbol: {}", config.currency_symbol);
            println!(
                "  Argon2: {} KiB, {} passes, {} lanes",
                config.argon2.memory_cost, config.argon2.time_cost, config.argon2.parallelism
            );
        }
    }

    Ok(())
}
