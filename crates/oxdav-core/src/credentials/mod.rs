//! Credential resolution for remote hosts.
//!
//! Resolution order for a host:
//!
//! 1. `DAVUSER` / `DAVPASS` from the environment
//! 2. a configured username for the host
//! 3. the secret store (password only), if one is attached
//! 4. the interactive prompt
//!
//! A password obtained from the prompt is written back to the secret store.
//! The resolver itself keeps nothing; caching per host is the job of
//! [`CredentialPool`](crate::CredentialPool).

#[cfg(feature = "keychain")]
mod keychain;
mod prompt;

use std::collections::HashMap;
use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use crate::error::CredentialError;

#[cfg(feature = "keychain")]
pub use keychain::KeyringStore;
pub use prompt::TerminalPrompt;

/// Environment variable holding the WebDAV username.
pub const ENV_USERNAME: &str = "DAVUSER";
/// Environment variable holding the WebDAV password.
pub const ENV_PASSWORD: &str = "DAVPASS";

/// Username and password for one host.
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

impl Clone for Credentials {
    fn clone(&self) -> Self {
        Self {
            username: self.username.clone(),
            password: SecretString::from(self.password.expose_secret().to_owned()),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Credentials taken from `DAVUSER` / `DAVPASS`.
#[derive(Debug, Default)]
pub struct EnvCredentials {
    pub username: Option<String>,
    pub password: Option<SecretString>,
}

impl EnvCredentials {
    /// Snapshot the process environment.
    pub fn from_env() -> Self {
        Self {
            username: std::env::var(ENV_USERNAME).ok(),
            password: std::env::var(ENV_PASSWORD).ok().map(SecretString::from),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }
}

/// Interactive source of credentials.
pub trait CredentialPrompt: Send + Sync {
    fn username(&self, host: &str) -> Result<String, CredentialError>;

    fn password(&self, host: &str, username: &str) -> Result<SecretString, CredentialError>;
}

/// Persistent password storage keyed by (host, username).
pub trait SecretStore: Send + Sync {
    /// `Ok(None)` when nothing is stored for the pair.
    fn get(&self, host: &str, username: &str) -> Result<Option<SecretString>, CredentialError>;

    fn set(&self, host: &str, username: &str, password: &SecretString) -> Result<(), CredentialError>;
}

/// Resolves credentials for a host from the configured sources.
pub struct CredentialResolver {
    env: EnvCredentials,
    usernames: HashMap<String, String>,
    store: Option<Box<dyn SecretStore>>,
    prompt: Box<dyn CredentialPrompt>,
}

impl CredentialResolver {
    /// Resolver that only prompts. Add sources with the `with_*` methods.
    pub fn new(prompt: impl CredentialPrompt + 'static) -> Self {
        Self {
            env: EnvCredentials::default(),
            usernames: HashMap::new(),
            store: None,
            prompt: Box::new(prompt),
        }
    }

    /// Resolver reading `DAVUSER`/`DAVPASS` and prompting on the terminal.
    pub fn from_env() -> Self {
        Self::new(TerminalPrompt).with_env(EnvCredentials::from_env())
    }

    pub fn with_env(mut self, env: EnvCredentials) -> Self {
        self.env = env;
        self
    }

    /// Use `username` for `host` instead of prompting for it.
    pub fn with_username(mut self, host: impl Into<String>, username: impl Into<String>) -> Self {
        self.usernames.insert(host.into(), username.into());
        self
    }

    pub fn with_secret_store(mut self, store: impl SecretStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    /// Obtain credentials for `host`. May block on user input.
    pub fn resolve(&self, host: &str) -> Result<Credentials, CredentialError> {
        let username = if let Some(username) = &self.env.username {
            debug!(host, "Username from {ENV_USERNAME}");
            username.clone()
        } else if let Some(username) = self.usernames.get(host) {
            debug!(host, "Username from configuration");
            username.clone()
        } else {
            self.prompt.username(host)?
        };

        let password = if let Some(password) = &self.env.password {
            debug!(host, "Password from {ENV_PASSWORD}");
            SecretString::from(password.expose_secret().to_owned())
        } else if let Some(store) = &self.store {
            match store.get(host, &username)? {
                Some(password) => {
                    debug!(host, username, "Password from secret store");
                    password
                }
                None => {
                    let password = self.prompt.password(host, &username)?;
                    store.set(host, &username, &password)?;
                    info!(host, username, "Password stored in secret store");
                    password
                }
            }
        } else {
            self.prompt.password(host, &username)?
        };

        info!(host, username, "Resolved credentials");
        Ok(Credentials { username, password })
    }
}
