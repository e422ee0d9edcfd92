//! Credential hashing parameters

use serde::{Deserialize, Serialize};

/// Default Argon2id parameters (the argon2 crate's recommended defaults)
pub const DEFAULT_MEMORY_COST: u32 = 19456; // 19 MiB
pub const DEFAULT_TIME_COST: u32 = 2;
pub const DEFAULT_PARALLELISM: u32 = 1;

/// Argon2id cost parameters used when hashing new credentials
///
/// Existing hashes carry their own parameters in the PHC string, so changing
/// these only affects owners registered afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Argon2Params {
    pub memory_cost: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_cost: DEFAULT_MEMORY_COST,
            time_cost: DEFAULT_TIME_COST,
            parallelism: DEFAULT_PARALLELISM,
        }
    }
}

impl Argon2Params {
    /// Cheapest parameters argon2 accepts. Only meant for tests.
    pub fn minimal() -> Self {
        Self {
            memory_cost: 8,
            time_cost: 1,
            parallelism: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = Argon2Params::default();
        assert_eq!(params.memory_cost, 19456);
        assert_eq!(params.time_cost, 2);
        assert_eq!(params.parallelism, 1);
    }

    #[test]
    fn test_params_camel_case() {
        let json = serde_json::to_value(Argon2Params::minimal()).unwrap();
        assert_eq!(json["memoryCost"], 8);
        assert_eq!(json["timeCost"], 1);
    }
}
