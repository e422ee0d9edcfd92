//! Ledger service - owner-scoped transaction CRUD

use std::sync::Arc;

use crate::domain::result::{Error, Result};
use crate::domain::{OwnerId, Transaction, TransactionDraft, TransactionId};
use crate::ports::Repository;

/// Service for adding, reading, editing and deleting transactions
///
/// Raw user input comes in as strings and is validated here before any
/// SQL runs, so a failed call leaves the store untouched.
pub struct LedgerService {
    repository: Arc<dyn Repository>,
}

impl LedgerService {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self { repository }
    }

    /// Add a transaction for `owner`
    pub fn add_transaction(
        &self,
        owner: OwnerId,
        kind: &str,
        amount: &str,
        description: &str,
        date: &str,
    ) -> Result<TransactionId> {
        let draft = TransactionDraft::parse(kind, amount, description, date)?;
        let id = self.repository.insert_transaction(owner, &draft)?;
        tracing::debug!(owner_id = owner.0, transaction_id = id.0, "added transaction");
        Ok(id)
    }

    /// All of `owner`'s transactions, oldest first
    ///
    /// Every call re-reads the store.
    pub fn list_transactions(&self, owner: OwnerId) -> Result<Vec<Transaction>> {
        self.repository.list_transactions(owner)
    }

    /// A single transaction of `owner`
    pub fn get_transaction(&self, owner: OwnerId, id: TransactionId) -> Result<Transaction> {
        self.repository
            .get_transaction(owner, id)?
            .ok_or_else(|| not_found(id))
    }

    /// Replace every field of one of `owner`'s transactions
    pub fn update_transaction(
        &self,
        owner: OwnerId,
        id: TransactionId,
        kind: &str,
        amount: &str,
        description: &str,
        date: &str,
    ) -> Result<()> {
        let draft =
            TransactionDraft::parse(kind, amount, description, date)?.require_description()?;
        if !self.repository.update_transaction(owner, id, &draft)? {
            return Err(not_found(id));
        }
        tracing::debug!(owner_id = owner.0, transaction_id = id.0, "updated transaction");
        Ok(())
    }

    /// Permanently remove one of `owner`'s transactions
    pub fn delete_transaction(&self, owner: OwnerId, id: TransactionId) -> Result<()> {
        if !self.repository.delete_transaction(owner, id)? {
            return Err(not_found(id));
        }
        tracing::debug!(owner_id = owner.0, transaction_id = id.0, "deleted transaction");
        Ok(())
    }
}

/// Missing ids and ids owned by someone else get the same error
fn not_found(id: TransactionId) -> Error {
    Error::not_found(format!("transaction {}", id))
}
