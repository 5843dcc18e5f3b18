//! OS keychain backed secret store.

use super::{SecretStore, SecretStoreError, secret_key};
use crate::types::Credential;

const SERVICE_NAME: &str = "appship";

/// Stores passwords in the platform keychain under the `appship` service.
#[derive(Debug, Clone)]
pub struct KeyringSecretStore {
    service: String,
}

impl KeyringSecretStore {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, base_url: &str, username: &str) -> Result<keyring::Entry, SecretStoreError> {
        keyring::Entry::new(&self.service, &secret_key(base_url, username))
            .map_err(|e| SecretStoreError::Backend(e.to_string()))
    }
}

impl Default for KeyringSecretStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore for KeyringSecretStore {
    fn get(&self, base_url: &str, username: &str) -> Result<Option<Credential>, SecretStoreError> {
        match self.entry(base_url, username)?.get_password() {
            Ok(secret) => Ok(Some(Credential::new(secret))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(SecretStoreError::Backend(e.to_string())),
        }
    }

    fn store(
        &self,
        base_url: &str,
        username: &str,
        secret: &Credential,
    ) -> Result<(), SecretStoreError> {
        self.entry(base_url, username)?
            .set_password(secret.expose())
            .map_err(|e| SecretStoreError::Backend(e.to_string()))
    }

    fn delete(&self, base_url: &str, username: &str) -> Result<bool, SecretStoreError> {
        match self.entry(base_url, username)?.delete_credential() {
            Ok(()) => Ok(true),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(e) => Err(SecretStoreError::Backend(e.to_string())),
        }
    }
}
