//! OS keychain storage for WebDAV passwords.
//!
//! Uses the platform credential store:
//! - macOS: Keychain
//! - Windows: Credential Manager
//! - Linux: kernel keyutils

use keyring::Entry;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use super::SecretStore;
use crate::error::CredentialError;

const SERVICE_PREFIX: &str = "oxdav";

/// [`SecretStore`] backed by the `keyring` crate.
///
/// Entries are stored under service `oxdav:<host>` with the username as
/// the account name.
#[derive(Debug, Clone, Default)]
pub struct KeyringStore;

impl KeyringStore {
    pub fn new() -> Self {
        Self
    }

    fn entry(host: &str, username: &str) -> Result<Entry, CredentialError> {
        Entry::new(&format!("{SERVICE_PREFIX}:{host}"), username)
            .map_err(|e| store_error(host, &e))
    }
}

impl SecretStore for KeyringStore {
    fn get(&self, host: &str, username: &str) -> Result<Option<SecretString>, CredentialError> {
        match Self::entry(host, username)?.get_password() {
            Ok(password) => Ok(Some(SecretString::from(password))),
            Err(keyring::Error::NoEntry) => {
                debug!(host, username, "No keychain entry");
                Ok(None)
            }
            Err(e) => Err(store_error(host, &e)),
        }
    }

    fn set(&self, host: &str, username: &str, password: &SecretString) -> Result<(), CredentialError> {
        Self::entry(host, username)?
            .set_password(password.expose_secret())
            .map_err(|e| store_error(host, &e))
    }
}

fn store_error(host: &str, e: &keyring::Error) -> CredentialError {
    CredentialError::SecretStore {
        host: host.to_string(),
        reason: e.to_string(),
    }
}
