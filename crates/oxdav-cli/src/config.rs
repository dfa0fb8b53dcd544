//! Configuration file support for the oxdav CLI.
//!
//! Configuration is stored at `~/.config/oxdav/config.toml` (XDG standard)
//! or `~/Library/Application Support/com.oxdav.oxdav/config.toml` on macOS.
//! `--config` / `OXDAV_CONFIG` point somewhere else.
//!
//! # Example configuration
//!
//! ```toml
//! [client]
//! timeout_secs = 60
//! accept_invalid_certs = false
//!
//! [hosts."dav.example.com"]
//! username = "alice"
//!
//! [keychain]
//! enabled = true
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;

use oxdav_core::{ClientConfig, CredentialPool, CredentialResolver, Dispatcher, HttpConnector};

/// Main configuration structure
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// HTTP settings for every WebDAV session
    #[serde(default)]
    pub client: ClientConfig,

    /// Per-host settings, keyed by hostname (no port)
    #[serde(default)]
    pub hosts: HashMap<String, HostConfig>,

    #[serde(default)]
    pub keychain: KeychainConfig,
}

/// Settings for a single WebDAV host
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostConfig {
    /// Username to use instead of prompting
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeychainConfig {
    /// Look up and save passwords in the OS keychain
    #[serde(default)]
    pub enabled: bool,
}

impl Config {
    /// Load configuration from `path`, or the default location when `None`.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => config_path()?,
        };

        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Credential resolver with the configured usernames and keychain.
    pub fn resolver(&self) -> CredentialResolver {
        let mut resolver = CredentialResolver::from_env();
        for (host, settings) in &self.hosts {
            if let Some(username) = &settings.username {
                resolver = resolver.with_username(host, username);
            }
        }

        if self.keychain.enabled {
            #[cfg(feature = "keychain")]
            {
                resolver = resolver.with_secret_store(oxdav_core::credentials::KeyringStore::new());
            }
            #[cfg(not(feature = "keychain"))]
            tracing::warn!("Keychain is enabled in the config but oxdav was built without the `keychain` feature");
        }

        resolver
    }

    /// Dispatcher over a fresh HTTP credential pool.
    pub fn dispatcher(&self) -> Dispatcher {
        let connector = HttpConnector::new(self.client.clone());
        let pool = CredentialPool::new(connector, self.resolver());
        Dispatcher::new(Arc::new(pool))
    }
}

/// Get the path to the configuration file.
///
/// Uses XDG config directory on Linux, Application Support on macOS.
pub fn config_path() -> Result<PathBuf> {
    let base_dirs = directories::BaseDirs::new()
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;

    #[cfg(target_os = "macos")]
    {
        let config_dir = base_dirs
            .home_dir()
            .join("Library/Application Support/com.oxdav.oxdav");
        Ok(config_dir.join("config.toml"))
    }

    #[cfg(not(target_os = "macos"))]
    {
        let config_dir = base_dirs.config_dir().join("oxdav");
        Ok(config_dir.join("config.toml"))
    }
}
