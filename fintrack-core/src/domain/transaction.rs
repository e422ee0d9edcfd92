//! Transaction domain model

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::owner::OwnerId;
use super::result::{Error, Result};

/// Number of fractional digits the store keeps for an amount
pub const AMOUNT_SCALE: u32 = 10;

/// Surrogate id of a transaction. Ids grow with insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub i64);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a transaction adds to or subtracts from the balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub const ALL: [TransactionKind; 2] = [TransactionKind::Income, TransactionKind::Expense];

    /// Canonical name, as stored and exported
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
        }
    }

    /// Amount with the sign implied by the kind
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            TransactionKind::Income => amount,
            TransactionKind::Expense => -amount,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        TransactionKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                Error::invalid_input(format!(
                    "transaction type must be Income or Expense, got '{}'",
                    trimmed
                ))
            })
    }
}

/// A single ledger entry belonging to one owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub owner_id: OwnerId,
    pub kind: TransactionKind,
    /// Never negative; the sign comes from `kind`
    pub amount: Decimal,
    pub description: String,
    /// Opaque sortable date string (ISO `YYYY-MM-DD` sorts correctly)
    pub date: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Transaction {
    /// Amount with the sign implied by the kind
    pub fn signed_amount(&self) -> Decimal {
        self.kind.signed(self.amount)
    }
}

/// Validated field values for an add or a full update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDraft {
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub description: String,
    pub date: String,
}

impl TransactionDraft {
    /// Validate raw user input
    ///
    /// Checks, in order: kind, amount, date. The description is kept verbatim
    /// and may be empty.
    pub fn parse(kind: &str, amount: &str, description: &str, date: &str) -> Result<Self> {
        let kind: TransactionKind = kind.parse()?;
        let amount = parse_amount(amount)?;

        let date = date.trim();
        if date.is_empty() {
            return Err(Error::invalid_input("date is required"));
        }

        Ok(Self {
            kind,
            amount,
            description: description.to_string(),
            date: date.to_string(),
        })
    }

    /// Updates replace every field, so the description must be supplied too
    pub fn require_description(self) -> Result<Self> {
        if self.description.trim().is_empty() {
            return Err(Error::invalid_input("description is required"));
        }
        Ok(self)
    }
}

/// Parse a user-entered amount into a non-negative decimal
///
/// Accepts plain and scientific notation with surrounding whitespace. Zero is
/// valid; negatives and anything finer than [`AMOUNT_SCALE`] digits are not.
pub fn parse_amount(raw: &str) -> Result<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_amount("amount is required"));
    }

    let parsed = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| Error::invalid_amount(format!("'{}' is not a number", trimmed)))?;

    if parsed.is_zero() {
        return Ok(Decimal::ZERO);
    }
    if parsed.is_sign_negative() {
        return Err(Error::invalid_amount(format!(
            "'{}' is negative; use the Expense type instead",
            trimmed
        )));
    }

    let normalized = parsed.normalize();
    if normalized >= Decimal::from_i128_with_scale(10_i128.pow(38 - AMOUNT_SCALE), 0) {
        return Err(Error::invalid_amount(format!("'{}' is too large", trimmed)));
    }
    if normalized.scale() > AMOUNT_SCALE {
        return Err(Error::invalid_amount(format!(
            "'{}' has more than {} decimal places",
            trimmed, AMOUNT_SCALE
        )));
    }

    Ok(normalized)
}
