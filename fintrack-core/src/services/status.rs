//! Status service - transaction counts and date range for an owner

use std::sync::Arc;

use serde::Serialize;

use crate::domain::result::Result;
use crate::domain::{OwnerId, TransactionKind};
use crate::ports::Repository;

/// Status service for owner summaries
pub struct StatusService {
    repository: Arc<dyn Repository>,
}

impl StatusService {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self { repository }
    }

    /// Get the status summary of one owner
    pub fn get_status(&self, owner: OwnerId) -> Result<StatusSummary> {
        let transactions = self.repository.list_transactions(owner)?;

        let income_count = transactions
            .iter()
            .filter(|t| t.kind == TransactionKind::Income)
            .count();
        let dates = transactions.iter().map(|t| t.date.as_str());

        Ok(StatusSummary {
            transaction_count: transactions.len(),
            income_count,
            expense_count: transactions.len() - income_count,
            date_range: DateRange {
                earliest: dates.clone().min().map(str::to_string),
                latest: dates.max().map(str::to_string),
            },
        })
    }
}

#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub transaction_count: usize,
    pub income_count: usize,
    pub expense_count: usize,
    pub date_range: DateRange,
}

#[derive(Debug, Serialize)]
pub struct DateRange {
    pub earliest: Option<String>,
    pub latest: Option<String>,
}
