//! Derived report values
//!
//! Everything here is a pure function of a slice of transactions. Sums are
//! exact decimal arithmetic; rounding is only applied through
//! [`round_money`] when a value is presented. A sum that would leave the
//! `Decimal` range is reported as [`Error::Overflow`] rather than wrapping or
//! panicking.

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};
use super::transaction::{Transaction, TransactionKind};

/// Round a monetary value to cents for display
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn add(total: Decimal, amount: Decimal, what: &str) -> Result<Decimal> {
    total
        .checked_add(amount)
        .ok_or_else(|| Error::overflow(what.to_string()))
}

/// Income, expenses and the resulting balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Summary {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub balance: Decimal,
}

impl Summary {
    pub fn from_transactions(transactions: &[Transaction]) -> Result<Self> {
        let mut total_income = Decimal::ZERO;
        let mut total_expenses = Decimal::ZERO;
        for tx in transactions {
            match tx.kind {
                TransactionKind::Income => {
                    total_income = add(total_income, tx.amount, "total income")?
                }
                TransactionKind::Expense => {
                    total_expenses = add(total_expenses, tx.amount, "total expenses")?
                }
            }
        }

        // Both totals are non-negative, so the difference always fits
        let balance = total_income
            .checked_sub(total_expenses)
            .ok_or_else(|| Error::overflow("balance"))?;

        Ok(Self {
            total_income,
            total_expenses,
            balance,
        })
    }

    /// Copy with every field rounded to cents
    pub fn rounded(&self) -> Self {
        Self {
            total_income: round_money(self.total_income),
            total_expenses: round_money(self.total_expenses),
            balance: round_money(self.balance),
        }
    }
}

/// Total amount per kind, only for kinds that occur in the data
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KindTotals(BTreeMap<TransactionKind, Decimal>);

impl KindTotals {
    /// Fails when a per-kind total or the grand total leaves the `Decimal` range
    pub fn from_transactions(transactions: &[Transaction]) -> Result<Self> {
        let mut totals = BTreeMap::new();
        for tx in transactions {
            let total = totals.entry(tx.kind).or_insert(Decimal::ZERO);
            *total = add(*total, tx.amount, "total by type")?;
        }

        let totals = Self(totals);
        totals
            .grand_total()
            .ok_or_else(|| Error::overflow("total of all types"))?;
        Ok(totals)
    }

    /// Total for a kind, `None` when no transaction of that kind exists
    pub fn get(&self, kind: TransactionKind) -> Option<Decimal> {
        self.0.get(&kind).copied()
    }

    /// Total for a kind with missing kinds read as zero
    pub fn get_or_zero(&self, kind: TransactionKind) -> Decimal {
        self.get(kind).unwrap_or(Decimal::ZERO)
    }

    fn grand_total(&self) -> Option<Decimal> {
        self.0
            .values()
            .try_fold(Decimal::ZERO, |sum, total| sum.checked_add(*total))
    }

    /// Percentage of the grand total taken by `kind`
    ///
    /// `None` when the kind is absent or every total is zero. Divides before
    /// scaling, so the result never exceeds 100 whatever the magnitudes.
    pub fn share(&self, kind: TransactionKind) -> Option<Decimal> {
        let part = self.get(kind)?;
        let whole = self.grand_total()?;
        if whole.is_zero() {
            return None;
        }
        part.checked_div(whole)?.checked_mul(Decimal::ONE_HUNDRED)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TransactionKind, Decimal)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Total spent on one date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    pub total: Decimal,
}

/// Expense totals per date, ascending by date string
pub fn expense_trend(transactions: &[Transaction]) -> Result<Vec<TrendPoint>> {
    let mut by_date: BTreeMap<&str, Decimal> = BTreeMap::new();
    for tx in transactions.iter().filter(|t| t.kind == TransactionKind::Expense) {
        let total = by_date.entry(tx.date.as_str()).or_insert(Decimal::ZERO);
        *total = add(*total, tx.amount, "expenses for one date")?;
    }

    Ok(by_date
        .into_iter()
        .map(|(date, total)| TrendPoint {
            date: date.to_string(),
            total,
        })
        .collect())
}

/// Balance at the end of one date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalancePoint {
    pub date: String,
    pub balance: Decimal,
}

/// Cumulative balance after each date that has transactions, ascending
pub fn running_balance(transactions: &[Transaction]) -> Result<Vec<BalancePoint>> {
    let mut daily_change: BTreeMap<&str, Decimal> = BTreeMap::new();
    for tx in transactions {
        let change = daily_change.entry(tx.date.as_str()).or_insert(Decimal::ZERO);
        *change = add(*change, tx.signed_amount(), "change for one date")?;
    }

    let mut balance = Decimal::ZERO;
    let mut points = Vec::with_capacity(daily_change.len());
    for (date, change) in daily_change {
        balance = add(balance, change, "running balance")?;
        points.push(BalancePoint {
            date: date.to_string(),
            balance,
        });
    }
    Ok(points)
}

/// The four reportable fields handed to CSV/PDF renderers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRow {
    #[serde(rename = "Type")]
    pub kind: TransactionKind,
    #[serde(rename = "Amount")]
    pub amount: Decimal,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Date")]
    pub date: String,
}

impl From<&Transaction> for SnapshotRow {
    fn from(tx: &Transaction) -> Self {
        Self {
            kind: tx.kind,
            amount: tx.amount,
            description: tx.description.clone(),
            date: tx.date.clone(),
        }
    }
}
