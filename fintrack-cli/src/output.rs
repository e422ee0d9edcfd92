//! Terminal output helpers shared by the commands

use colored::{ColoredString, Colorize};
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use fintrack_core::domain::report::round_money;
use fintrack_core::TransactionKind;
use rust_decimal::Decimal;

pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Errors go to stderr
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Compact UTF-8 table that wraps to the terminal width
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Format an amount with the currency symbol and two decimals, e.g. `-$20.00`
pub fn format_money(amount: Decimal, symbol: &str) -> String {
    let mut rounded = round_money(amount.abs());
    rounded.rescale(2);
    if amount.is_sign_negative() && !rounded.is_zero() {
        format!("-{}{}", symbol, rounded)
    } else {
        format!("{}{}", symbol, rounded)
    }
}

/// Money colored by sign: green when positive, red when negative
pub fn colored_money(amount: Decimal, symbol: &str) -> ColoredString {
    let text = format_money(amount, symbol);
    if amount.is_sign_negative() && !amount.is_zero() {
        text.red()
    } else if amount.is_zero() {
        text.normal()
    } else {
        text.green()
    }
}

/// Transaction type colored like its effect on the balance
pub fn colored_kind(kind: TransactionKind) -> ColoredString {
    match kind {
        TransactionKind::Income => kind.as_str().green(),
        TransactionKind::Expense => kind.as_str().red(),
    }
}

/// File size in the largest binary unit that keeps the value above one
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];

    if bytes < 1024 {
        return format!("{} bytes", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}
