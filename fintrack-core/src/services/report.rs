//! Report service - summaries and chart-ready series

use std::sync::Arc;

use crate::domain::report::{self, BalancePoint, KindTotals, Summary, TrendPoint};
use crate::domain::result::Result;
use crate::domain::OwnerId;
use crate::ports::Repository;

/// Read-side aggregations over one owner's transactions
///
/// Nothing is cached; each call works from a fresh read of the store. Totals
/// too large for a `Decimal` come back as `Error::Overflow`.
pub struct ReportService {
    repository: Arc<dyn Repository>,
}

impl ReportService {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self { repository }
    }

    /// Income, expenses and balance
    pub fn summary(&self, owner: OwnerId) -> Result<Summary> {
        let transactions = self.repository.list_transactions(owner)?;
        Summary::from_transactions(&transactions)
    }

    /// Total per kind, omitting kinds with no rows
    pub fn totals_by_kind(&self, owner: OwnerId) -> Result<KindTotals> {
        let transactions = self.repository.list_transactions(owner)?;
        KindTotals::from_transactions(&transactions)
    }

    /// Expense totals per date
    pub fn expense_trend(&self, owner: OwnerId) -> Result<Vec<TrendPoint>> {
        let transactions = self.repository.list_transactions(owner)?;
        report::expense_trend(&transactions)
    }

    /// Balance after each date
    pub fn running_balance(&self, owner: OwnerId) -> Result<Vec<BalancePoint>> {
        let transactions = self.repository.list_transactions(owner)?;
        report::running_balance(&transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::duckdb::DuckDbRepository;
    use crate::domain::result::Error;
    use crate::domain::{TransactionDraft, TransactionKind};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn setup() -> (Arc<DuckDbRepository>, ReportService, OwnerId) {
        let repo = Arc::new(DuckDbRepository::open_in_memory().unwrap());
        repo.ensure_schema().unwrap();
        let owner = repo.insert_owner("alice", "h").unwrap();
        (repo.clone(), ReportService::new(repo), owner)
    }

    fn add(repo: &DuckDbRepository, owner: OwnerId, kind: &str, amount: &str, date: &str) {
        let draft = TransactionDraft::parse(kind, amount, "", date).unwrap();
        repo.insert_transaction(owner, &draft).unwrap();
    }

    #[test]
    fn test_empty_owner() {
        let (_repo, reports, owner) = setup();
        let summary = reports.summary(owner).unwrap();
        assert_eq!(summary.total_income, Decimal::ZERO);
        assert_eq!(summary.total_expenses, Decimal::ZERO);
        assert_eq!(summary.balance, Decimal::ZERO);
        assert!(reports.totals_by_kind(owner).unwrap().is_empty());
        assert!(reports.expense_trend(owner).unwrap().is_empty());
        assert!(reports.running_balance(owner).unwrap().is_empty());
    }

    #[test]
    fn test_alice_scenario() {
        let (repo, reports, owner) = setup();
        add(&repo, owner, "Income", "1000.00", "2024-01-01");
        add(&repo, owner, "Expense", "200.50", "2024-01-02");

        let summary = reports.summary(owner).unwrap();
        assert_eq!(summary.total_income, dec!(1000.00));
        assert_eq!(summary.total_expenses, dec!(200.50));
        assert_eq!(summary.balance, dec!(799.50));

        let trend = reports.expense_trend(owner).unwrap();
        assert_eq!(trend.len(), 1);
        assert_eq!(trend[0].date, "2024-01-02");
        assert_eq!(trend[0].total, dec!(200.50));

        let balance = reports.running_balance(owner).unwrap();
        assert_eq!(balance.len(), 2);
        assert_eq!(balance[0].balance, dec!(1000));
        assert_eq!(balance[1].balance, dec!(799.50));
    }

    #[test]
    fn test_totals_omit_absent_kinds() {
        let (repo, reports, owner) = setup();
        add(&repo, owner, "Expense", "0.1", "2024-01-01");
        add(&repo, owner, "Expense", "0.2", "2024-01-01");

        let totals = reports.totals_by_kind(owner).unwrap();
        assert_eq!(totals.len(), 1);
        assert_eq!(totals.get(TransactionKind::Expense), Some(dec!(0.3)));
        assert_eq!(totals.get(TransactionKind::Income), None);
    }

    #[test]
    fn test_totals_beyond_decimal_range_are_errors() {
        let (repo, reports, owner) = setup();
        for _ in 0..8 {
            add(&repo, owner, "Income", "9999999999999999999999999999", "2024-01-01");
        }

        assert!(matches!(reports.summary(owner), Err(Error::Overflow(_))));
        assert!(matches!(reports.totals_by_kind(owner), Err(Error::Overflow(_))));
        assert!(matches!(reports.running_balance(owner), Err(Error::Overflow(_))));
        // No expenses, so the trend has nothing to add up
        assert!(reports.expense_trend(owner).unwrap().is_empty());
    }

    #[test]
    fn test_share_of_large_amounts() {
        let (repo, reports, owner) = setup();
        add(&repo, owner, "Income", "1000000000000000000000000000", "2024-01-01");

        let totals = reports.totals_by_kind(owner).unwrap();
        assert_eq!(totals.share(TransactionKind::Income), Some(dec!(100)));
    }
}
