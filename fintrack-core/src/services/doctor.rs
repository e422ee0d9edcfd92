//! Doctor service - database health checks

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::domain::result::Result;
use crate::domain::{OwnerId, TransactionId};
use crate::ports::Repository;

/// Doctor service for integrity checks over one owner's rows
///
/// Reports only transaction ids, never row contents.
pub struct DoctorService {
    repository: Arc<dyn Repository>,
}

impl DoctorService {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self { repository }
    }

    /// Run all health checks against the rows of `owner`
    pub fn run_checks(&self, owner: OwnerId) -> Result<DoctorResult> {
        let mut checks = BTreeMap::new();

        let invalid_kinds = self.repository.check_invalid_kinds(owner)?;
        checks.insert(
            "transaction_kinds".to_string(),
            CheckResult::from_ids(
                invalid_kinds,
                CheckStatus::Error,
                "All transactions are Income or Expense",
                "transaction(s) have an unknown type",
            ),
        );

        let negative = self.repository.check_negative_amounts(owner)?;
        checks.insert(
            "negative_amounts".to_string(),
            CheckResult::from_ids(
                negative,
                CheckStatus::Error,
                "No negative amounts found",
                "transaction(s) have a negative amount",
            ),
        );

        // Blank dates still list and sum; they sort first in date views
        let empty_dates = self.repository.check_empty_dates(owner)?;
        checks.insert(
            "empty_dates".to_string(),
            CheckResult::from_ids(
                empty_dates,
                CheckStatus::Warning,
                "All transactions have a date",
                "transaction(s) have an empty date",
            ),
        );

        let count = |status: CheckStatus| {
            checks.values().filter(|c| c.status == status).count() as i64
        };
        let (passed, warnings, errors) = (
            count(CheckStatus::Pass),
            count(CheckStatus::Warning),
            count(CheckStatus::Error),
        );

        tracing::debug!(owner = owner.0, passed, warnings, errors, "doctor checks finished");

        Ok(DoctorResult {
            checks,
            summary: DoctorSummary {
                passed,
                warnings,
                errors,
                transactions: self.repository.count_transactions(owner)?,
            },
        })
    }
}

#[derive(Debug, Serialize)]
pub struct DoctorResult {
    pub checks: BTreeMap<String, CheckResult>,
    pub summary: DoctorSummary,
}

impl DoctorResult {
    pub fn is_healthy(&self) -> bool {
        self.summary.errors == 0
    }
}

/// Outcome of one check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Warning,
    Error,
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub status: CheckStatus,
    pub message: String,
    /// Offending rows; empty when the check passed
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transaction_ids: Vec<TransactionId>,
}

impl CheckResult {
    fn from_ids(
        ids: Vec<TransactionId>,
        failure: CheckStatus,
        ok_message: &str,
        problem: &str,
    ) -> Self {
        let (status, message) = if ids.is_empty() {
            (CheckStatus::Pass, ok_message.to_string())
        } else {
            (failure, format!("{} {}", ids.len(), problem))
        };
        Self {
            status,
            message,
            transaction_ids: ids,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DoctorSummary {
    pub passed: i64,
    pub warnings: i64,
    pub errors: i64,
    /// Rows of the owner, including ones that fail to load
    pub transactions: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::result::Error;
    use crate::domain::{Owner, Transaction, TransactionDraft};
    use crate::ports::StoredCredential;

    /// Repository stub returning canned check results
    struct Canned {
        negative: Vec<TransactionId>,
        empty_dates: Vec<TransactionId>,
    }

    impl Repository for Canned {
        fn ensure_schema(&self) -> Result<()> {
            Ok(())
        }
        fn insert_owner(&self, _: &str, _: &str) -> Result<OwnerId> {
            Err(Error::database("read only"))
        }
        fn find_credential(&self, _: &str) -> Result<Option<StoredCredential>> {
            Ok(None)
        }
        fn get_owner(&self, _: OwnerId) -> Result<Option<Owner>> {
            Ok(None)
        }
        fn insert_transaction(&self, _: OwnerId, _: &TransactionDraft) -> Result<TransactionId> {
            Err(Error::database("read only"))
        }
        fn list_transactions(&self, _: OwnerId) -> Result<Vec<Transaction>> {
            Ok(Vec::new())
        }
        fn get_transaction(&self, _: OwnerId, _: TransactionId) -> Result<Option<Transaction>> {
            Ok(None)
        }
        fn update_transaction(
            &self,
            _: OwnerId,
            _: TransactionId,
            _: &TransactionDraft,
        ) -> Result<bool> {
            Ok(false)
        }
        fn delete_transaction(&self, _: OwnerId, _: TransactionId) -> Result<bool> {
            Ok(false)
        }
        fn check_invalid_kinds(&self, _: OwnerId) -> Result<Vec<TransactionId>> {
            Ok(Vec::new())
        }
        fn check_negative_amounts(&self, _: OwnerId) -> Result<Vec<TransactionId>> {
            Ok(self.negative.clone())
        }
        fn check_empty_dates(&self, _: OwnerId) -> Result<Vec<TransactionId>> {
            Ok(self.empty_dates.clone())
        }
        fn count_transactions(&self, _: OwnerId) -> Result<i64> {
            Ok(9)
        }
    }

    #[test]
    fn test_all_checks_pass() {
        let doctor = DoctorService::new(Arc::new(Canned {
            negative: Vec::new(),
            empty_dates: Vec::new(),
        }));
        let result = doctor.run_checks(OwnerId(1)).unwrap();
        assert!(result.is_healthy());
        assert_eq!(result.summary.passed, 3);
        assert_eq!(result.summary.transactions, 9);
        assert!(result.checks.values().all(|c| c.transaction_ids.is_empty()));
    }

    #[test]
    fn test_problems_reported_by_id() {
        let doctor = DoctorService::new(Arc::new(Canned {
            negative: vec![TransactionId(3), TransactionId(8)],
            empty_dates: vec![TransactionId(5)],
        }));
        let result = doctor.run_checks(OwnerId(1)).unwrap();
        assert!(!result.is_healthy());
        assert_eq!(result.summary.errors, 1);
        assert_eq!(result.summary.warnings, 1);

        let negative = &result.checks["negative_amounts"];
        assert_eq!(negative.message, "2 transaction(s) have a negative amount");
        assert_eq!(
            negative.transaction_ids,
            vec![TransactionId(3), TransactionId(8)]
        );
        assert_eq!(result.checks["empty_dates"].status, CheckStatus::Warning);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["checks"]["empty_dates"]["status"], "warning");
        assert_eq!(json["checks"]["negative_amounts"]["transaction_ids"][1], 8);
        assert!(json["checks"]["transaction_kinds"].get("transaction_ids").is_none());
    }
}
