//! Credential storage
//!
//! Passwords are keyed by the literal concatenation of the base URL and the
//! username. The pipeline only reads credentials; `store` and `delete` are
//! used by the login/logout commands.

#[cfg(feature = "keyring-store")]
mod keychain;

use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;

use crate::types::Credential;

#[cfg(feature = "keyring-store")]
pub use self::keychain::KeyringSecretStore;

#[derive(Debug, Error)]
pub enum SecretStoreError {
    #[error("Secret store error: {0}")]
    Backend(String),
}

/// Backing store for deployment passwords.
pub trait SecretStore: Send + Sync {
    fn get(&self, base_url: &str, username: &str) -> Result<Option<Credential>, SecretStoreError>;

    fn store(
        &self,
        base_url: &str,
        username: &str,
        secret: &Credential,
    ) -> Result<(), SecretStoreError>;

    /// Returns whether an entry was removed.
    fn delete(&self, base_url: &str, username: &str) -> Result<bool, SecretStoreError>;
}

/// Storage key for a `(base_url, username)` pair.
pub fn secret_key(base_url: &str, username: &str) -> String {
    format!("{}{}", base_url, username)
}

/// Process-local store, used by tests and embedders without a keychain.
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(self, base_url: &str, username: &str, secret: &str) -> Self {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(secret_key(base_url, username), secret.to_string());
        self
    }
}

impl SecretStore for MemorySecretStore {
    fn get(&self, base_url: &str, username: &str) -> Result<Option<Credential>, SecretStoreError> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries
            .get(&secret_key(base_url, username))
            .map(Credential::new))
    }

    fn store(
        &self,
        base_url: &str,
        username: &str,
        secret: &Credential,
    ) -> Result<(), SecretStoreError> {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(secret_key(base_url, username), secret.expose().to_string());
        Ok(())
    }

    fn delete(&self, base_url: &str, username: &str) -> Result<bool, SecretStoreError> {
        Ok(self
            .entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&secret_key(base_url, username))
            .is_some())
    }
}
