//! Owner domain model

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Surrogate id of a registered owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub i64);

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered owner as seen by readers
///
/// Carries no credential data; the hash only leaves the store for verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: OwnerId,
    pub username: String,
    pub created_at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_id_display_and_serde() {
        let id = OwnerId(17);
        assert_eq!(id.to_string(), "17");
        assert_eq!(serde_json::to_string(&id).unwrap(), "17");
        let back: OwnerId = serde_json::from_str("17").unwrap();
        assert_eq!(back, id);
    }
}
