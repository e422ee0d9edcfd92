//! Export service - canonical rows for CSV/PDF renderers

use std::io::Write;
use std::sync::Arc;

use crate::domain::result::Result;
use crate::domain::{OwnerId, SnapshotRow};
use crate::ports::Repository;

/// Produces the reportable row set of an owner
pub struct ExportService {
    repository: Arc<dyn Repository>,
}

impl ExportService {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self { repository }
    }

    /// Kind, amount, description and date of every transaction, in list order
    pub fn snapshot_rows(&self, owner: OwnerId) -> Result<Vec<SnapshotRow>> {
        let transactions = self.repository.list_transactions(owner)?;
        Ok(transactions.iter().map(SnapshotRow::from).collect())
    }

    /// Write the rows as CSV with a `Type,Amount,Description,Date` header
    ///
    /// Returns the number of data rows written.
    pub fn write_csv<W: Write>(&self, owner: OwnerId, writer: W) -> Result<usize> {
        let rows = self.snapshot_rows(owner)?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        // serialize() only emits a header once a row is written
        if rows.is_empty() {
            csv_writer.write_record(["Type", "Amount", "Description", "Date"])?;
        }
        for row in &rows {
            csv_writer.serialize(row)?;
        }
        csv_writer.flush()?;

        tracing::debug!(owner_id = owner.0, rows = rows.len(), "exported csv");
        Ok(rows.len())
    }

    /// Write the rows as a pretty-printed JSON array
    pub fn write_json<W: Write>(&self, owner: OwnerId, mut writer: W) -> Result<usize> {
        let rows = self.snapshot_rows(owner)?;
        serde_json::to_writer_pretty(&mut writer, &rows)?;
        writer.write_all(b"\n")?;

        tracing::debug!(owner_id = owner.0, rows = rows.len(), "exported json");
        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::duckdb::DuckDbRepository;
    use crate::domain::{TransactionDraft, TransactionKind};
    use rust_decimal_macros::dec;

    fn setup() -> (Arc<DuckDbRepository>, ExportService, OwnerId) {
        let repo = Arc::new(DuckDbRepository::open_in_memory().unwrap());
        repo.ensure_schema().unwrap();
        let owner = repo.insert_owner("alice", "h").unwrap();
        (repo.clone(), ExportService::new(repo), owner)
    }

    fn add(
        repo: &DuckDbRepository,
        owner: OwnerId,
        kind: &str,
        amount: &str,
        desc: &str,
        date: &str,
    ) {
        let draft = TransactionDraft::parse(kind, amount, desc, date).unwrap();
        repo.insert_transaction(owner, &draft).unwrap();
    }

    #[test]
    fn test_snapshot_rows_follow_list_order() {
        let (repo, export, owner) = setup();
        add(&repo, owner, "Expense", "5", "late", "2024-12-31");
        add(&repo, owner, "Income", "7.25", "early", "2024-01-01");

        let rows = export.snapshot_rows(owner).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].kind, TransactionKind::Expense);
        assert_eq!(rows[0].description, "late");
        assert_eq!(rows[1].amount, dec!(7.25));
    }

    #[test]
    fn test_csv_header_and_quoting() {
        let (repo, export, owner) = setup();
        add(&repo, owner, "Income", "1000.00", "salary, january", "2024-01-01");

        let mut out = Vec::new();
        assert_eq!(export.write_csv(owner, &mut out).unwrap(), 1);
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Type,Amount,Description,Date"));
        assert_eq!(lines.next(), Some("Income,1000,\"salary, january\",2024-01-01"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_csv_empty_still_has_header() {
        let (_repo, export, owner) = setup();
        let mut out = Vec::new();
        assert_eq!(export.write_csv(owner, &mut out).unwrap(), 0);
        assert_eq!(String::from_utf8(out).unwrap(), "Type,Amount,Description,Date\n");
    }

    #[test]
    fn test_json_rows() {
        let (repo, export, owner) = setup();
        add(&repo, owner, "Expense", "200.50", "groceries", "2024-01-02");

        let mut out = Vec::new();
        export.write_json(owner, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["Type"], "Expense");
        assert_eq!(value[0]["Amount"], "200.5");
        assert_eq!(value[0]["Description"], "groceries");
        assert_eq!(value[0]["Date"], "2024-01-02");
    }
}
