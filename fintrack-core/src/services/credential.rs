//! Credential service - owner registration and authentication
//!
//! Credentials are stored as Argon2id PHC strings. Each string carries its
//! own salt and cost parameters, so verification never depends on the
//! currently configured parameters.

use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::domain::result::{Error, Result};
use crate::domain::{Argon2Params, Owner, OwnerId};
use crate::ports::Repository;

/// Service for registering and authenticating owners
pub struct CredentialService {
    repository: Arc<dyn Repository>,
    params: Argon2Params,
}

impl CredentialService {
    pub fn new(repository: Arc<dyn Repository>, params: Argon2Params) -> Self {
        Self { repository, params }
    }

    /// Register a new owner
    ///
    /// The username is trimmed; the credential is used verbatim.
    pub fn register(&self, username: &str, credential: &str) -> Result<OwnerId> {
        let username = username.trim();
        if username.is_empty() {
            return Err(Error::invalid_input("username is required"));
        }
        if credential.is_empty() {
            return Err(Error::invalid_input("password is required"));
        }

        let hash = self.hash_credential(credential)?;
        let owner_id = self.repository.insert_owner(username, &hash)?;
        tracing::debug!(owner_id = owner_id.0, "registered owner");
        Ok(owner_id)
    }

    /// Authenticate an owner
    ///
    /// An unknown username and a wrong credential give the same error.
    pub fn authenticate(&self, username: &str, credential: &str) -> Result<OwnerId> {
        let stored = match self.repository.find_credential(username.trim())? {
            Some(stored) => stored,
            None => return Err(Error::InvalidCredentials),
        };

        let parsed = PasswordHash::new(&stored.credential_hash)
            .map_err(|e| Error::Credential(format!("stored hash is unreadable: {}", e)))?;

        match Argon2::default().verify_password(credential.as_bytes(), &parsed) {
            Ok(()) => {
                tracing::debug!(owner_id = stored.owner_id.0, "authenticated owner");
                Ok(stored.owner_id)
            }
            Err(PasswordHashError::Password) => Err(Error::InvalidCredentials),
            Err(e) => Err(Error::Credential(e.to_string())),
        }
    }

    /// Public profile of an owner
    pub fn get_owner(&self, id: OwnerId) -> Result<Owner> {
        self.repository
            .get_owner(id)?
            .ok_or_else(|| Error::not_found(format!("owner {}", id)))
    }

    fn hash_credential(&self, credential: &str) -> Result<String> {
        let params = Params::new(
            self.params.memory_cost,
            self.params.time_cost,
            self.params.parallelism,
            None,
        )
        .map_err(|e| Error::Credential(format!("invalid argon2 parameters: {}", e)))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let salt = SaltString::generate(&mut OsRng);
        let hash = argon2
            .hash_password(credential.as_bytes(), &salt)
            .map_err(|e| Error::Credential(e.to_string()))?;
        Ok(hash.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::duckdb::DuckDbRepository;

    fn service() -> (Arc<DuckDbRepository>, CredentialService) {
        let repo = Arc::new(DuckDbRepository::open_in_memory().unwrap());
        repo.ensure_schema().unwrap();
        let service = CredentialService::new(repo.clone(), Argon2Params::minimal());
        (repo, service)
    }

    #[test]
    fn test_register_then_authenticate() {
        let (_repo, service) = service();
        let id = service.register("  alice ", "s3cret").unwrap();
        assert_eq!(service.authenticate("alice", "s3cret").unwrap(), id);
        assert_eq!(service.get_owner(id).unwrap().username, "alice");
        assert!(matches!(
            service.get_owner(OwnerId(id.0 + 1)),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_register_rejects_empty_fields() {
        let (_repo, service) = service();
        assert!(matches!(
            service.register("   ", "pw"),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            service.register("alice", ""),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_duplicate_username() {
        let (_repo, service) = service();
        service.register("bob", "first").unwrap();
        assert!(matches!(
            service.register(" bob ", "second"),
            Err(Error::DuplicateUsername(_))
        ));
        assert!(service.authenticate("bob", "first").is_ok());
        assert!(matches!(
            service.authenticate("bob", "second"),
            Err(Error::InvalidCredentials)
        ));
    }

    #[test]
    fn test_unknown_user_and_wrong_password_look_the_same() {
        let (_repo, service) = service();
        service.register("carol", "right").unwrap();

        let unknown = service.authenticate("nobody", "right").unwrap_err();
        let wrong = service.authenticate("carol", "wrong").unwrap_err();
        assert_eq!(unknown.to_string(), wrong.to_string());
        assert_eq!(unknown.kind(), wrong.kind());
    }

    #[test]
    fn test_stored_hash_is_salted_phc() {
        let (repo, service) = service();
        service.register("dave", "same").unwrap();
        service.register("erin", "same").unwrap();

        let dave = repo.find_credential("dave").unwrap().unwrap();
        let erin = repo.find_credential("erin").unwrap().unwrap();
        assert!(dave.credential_hash.starts_with("$argon2id$"));
        assert!(!dave.credential_hash.contains("same"));
        assert_ne!(dave.credential_hash, erin.credential_hash);
    }

    #[test]
    fn test_hash_verifies_after_params_change() {
        let (repo, service) = service();
        let id = service.register("frank", "pw").unwrap();

        let stronger = CredentialService::new(
            repo,
            Argon2Params {
                memory_cost: 16,
                time_cost: 2,
                parallelism: 1,
            },
        );
        assert_eq!(stronger.authenticate("frank", "pw").unwrap(), id);
    }
}
