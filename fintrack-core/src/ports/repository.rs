//! Repository port - database abstraction

use crate::domain::result::Result;
use crate::domain::{Owner, OwnerId, Transaction, TransactionDraft, TransactionId};

/// Credential hash as stored for an owner
#[derive(Debug, Clone)]
pub struct StoredCredential {
    pub owner_id: OwnerId,
    /// Argon2 PHC string
    pub credential_hash: String,
}

/// Database repository abstraction
///
/// Every transaction operation takes the owner id and filters on it in the
/// same statement that reads or writes the row. Implementations must make
/// each method atomic with respect to the others.
pub trait Repository: Send + Sync {
    // === Schema ===

    /// Run any pending migrations
    fn ensure_schema(&self) -> Result<()>;

    // === Owners ===

    /// Insert a new owner, failing with `DuplicateUsername` if taken
    fn insert_owner(&self, username: &str, credential_hash: &str) -> Result<OwnerId>;

    /// Look up the stored credential for a username
    fn find_credential(&self, username: &str) -> Result<Option<StoredCredential>>;

    /// Get an owner by id
    fn get_owner(&self, id: OwnerId) -> Result<Option<Owner>>;

    // === Transactions ===

    /// Insert a transaction for an existing owner (`NotFound` otherwise)
    fn insert_transaction(&self, owner: OwnerId, draft: &TransactionDraft) -> Result<TransactionId>;

    /// All transactions of an owner in insertion order
    fn list_transactions(&self, owner: OwnerId) -> Result<Vec<Transaction>>;

    /// One transaction, only if it belongs to `owner`
    fn get_transaction(&self, owner: OwnerId, id: TransactionId) -> Result<Option<Transaction>>;

    /// Rewrite all fields; returns false when no row of `owner` has that id
    fn update_transaction(
        &self,
        owner: OwnerId,
        id: TransactionId,
        draft: &TransactionDraft,
    ) -> Result<bool>;

    /// Delete a row; returns false when no row of `owner` has that id
    fn delete_transaction(&self, owner: OwnerId, id: TransactionId) -> Result<bool>;

    // === Health checks ===
    //
    // Scoped to one owner like everything else. They look at the raw columns,
    // so rows written by other tools show up here instead of failing to load.

    /// Rows of `owner` with a kind outside Income/Expense
    fn check_invalid_kinds(&self, owner: OwnerId) -> Result<Vec<TransactionId>>;

    /// Rows of `owner` with a negative amount
    fn check_negative_amounts(&self, owner: OwnerId) -> Result<Vec<TransactionId>>;

    /// Rows of `owner` with a blank date
    fn check_empty_dates(&self, owner: OwnerId) -> Result<Vec<TransactionId>>;

    /// Number of rows `owner` has, readable or not
    fn count_transactions(&self, owner: OwnerId) -> Result<i64>;
}
