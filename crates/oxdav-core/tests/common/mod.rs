//! Shared test infrastructure: an in-memory WebDAV store and counting
//! credential sources.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use oxdav_core::credentials::{CredentialPrompt, SecretStore};
use oxdav_core::{
    CredentialError, CredentialPool, CredentialResolver, Credentials, Connector, Dispatcher,
    RemoteError, RemoteStorage,
};
use parking_lot::Mutex;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

/// One recorded call against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub method: &'static str,
    pub url: String,
    pub username: Option<String>,
}

#[derive(Default)]
struct ServerState {
    files: HashMap<String, Vec<u8>>,
    collections: HashSet<String>,
    properties: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
    calls: Vec<Call>,
}

/// In-memory WebDAV "server" shared by every session a [`MemoryConnector`]
/// hands out.
#[derive(Clone, Default)]
pub struct MemoryServer {
    state: Arc<Mutex<ServerState>>,
}

impl MemoryServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, url: &str, content: &[u8]) {
        self.state.lock().files.insert(url.to_string(), content.to_vec());
    }

    pub fn content(&self, url: &str) -> Option<Vec<u8>> {
        self.state.lock().files.get(url).cloned()
    }

    pub fn content_string(&self, url: &str) -> Option<String> {
        self.content(url).map(|c| String::from_utf8(c).unwrap())
    }

    pub fn has_collection(&self, url: &str) -> bool {
        self.state.lock().collections.contains(url)
    }

    pub fn properties(&self, url: &str) -> Vec<String> {
        self.state.lock().properties.get(url).cloned().unwrap_or_default()
    }

    /// Make every request to `url` fail with HTTP 500.
    pub fn fail_on(&self, url: &str) {
        self.state.lock().failing.insert(url.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.state.lock().calls.iter().filter(|c| c.method == method).count()
    }
}

/// A session on a [`MemoryServer`].
pub struct MemorySession {
    server: MemoryServer,
    username: Option<String>,
}

impl MemorySession {
    fn record(&self, method: &'static str, url: &Url) -> Result<(), RemoteError> {
        let mut state = self.server.state.lock();
        state.calls.push(Call {
            method,
            url: url.to_string(),
            username: self.username.clone(),
        });
        if state.failing.contains(url.as_str()) {
            return Err(RemoteError::Status {
                method: method.to_string(),
                url: url.to_string(),
                status: 500,
            });
        }
        Ok(())
    }
}

impl RemoteStorage for MemorySession {
    fn set_credentials(&mut self, credentials: Credentials) {
        self.username = Some(credentials.username);
    }

    fn get(&self, url: &Url) -> Result<Vec<u8>, RemoteError> {
        self.record("GET", url)?;
        self.server
            .content(url.as_str())
            .ok_or_else(|| RemoteError::NotFound(url.to_string()))
    }

    fn put(&self, url: &Url, data: &[u8]) -> Result<(), RemoteError> {
        self.record("PUT", url)?;
        self.server.insert(url.as_str(), data);
        Ok(())
    }

    fn delete(&self, url: &Url) -> Result<(), RemoteError> {
        self.record("DELETE", url)?;
        let mut state = self.server.state.lock();
        let removed_file = state.files.remove(url.as_str()).is_some();
        let removed_dir = state.collections.remove(url.as_str());
        if removed_file || removed_dir {
            Ok(())
        } else {
            Err(RemoteError::NotFound(url.to_string()))
        }
    }

    fn mkdir(&self, url: &Url) -> Result<(), RemoteError> {
        self.record("MKCOL", url)?;
        self.server.state.lock().collections.insert(url.to_string());
        Ok(())
    }

    fn exists(&self, url: &Url) -> Result<bool, RemoteError> {
        self.record("PROPFIND", url)?;
        let state = self.server.state.lock();
        Ok(state.files.contains_key(url.as_str()) || state.collections.contains(url.as_str()))
    }

    fn propfind(&self, url: &Url) -> Result<String, RemoteError> {
        self.record("PROPFIND", url)?;
        let props = self.server.properties(url.as_str()).concat();
        Ok(format!(
            "<D:multistatus xmlns:D=\"DAV:\"><D:response><D:href>{url}</D:href><D:prop>{props}</D:prop></D:response></D:multistatus>"
        ))
    }

    fn proppatch(&self, url: &Url, xml: &str) -> Result<(), RemoteError> {
        self.record("PROPPATCH", url)?;
        self.server
            .state
            .lock()
            .properties
            .entry(url.to_string())
            .or_default()
            .push(xml.to_string());
        Ok(())
    }
}

/// Connector handing out [`MemorySession`]s, counting connections.
#[derive(Clone, Default)]
pub struct MemoryConnector {
    pub server: MemoryServer,
    pub connects: Arc<AtomicUsize>,
}

impl MemoryConnector {
    pub fn new(server: MemoryServer) -> Self {
        Self {
            server,
            connects: Arc::default(),
        }
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl Connector for MemoryConnector {
    fn connect(&self, _url: &Url) -> Result<Box<dyn RemoteStorage>, RemoteError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemorySession {
            server: self.server.clone(),
            username: None,
        }))
    }
}

/// Prompt answering with fixed credentials and counting how often it ran.
#[derive(Clone)]
pub struct ScriptedPrompt {
    username: String,
    password: String,
    pub username_prompts: Arc<AtomicUsize>,
    pub password_prompts: Arc<AtomicUsize>,
}

impl ScriptedPrompt {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            username_prompts: Arc::default(),
            password_prompts: Arc::default(),
        }
    }

    pub fn prompts(&self) -> usize {
        self.username_prompts.load(Ordering::SeqCst) + self.password_prompts.load(Ordering::SeqCst)
    }
}

impl CredentialPrompt for ScriptedPrompt {
    fn username(&self, _host: &str) -> Result<String, CredentialError> {
        self.username_prompts.fetch_add(1, Ordering::SeqCst);
        Ok(self.username.clone())
    }

    fn password(&self, _host: &str, _username: &str) -> Result<SecretString, CredentialError> {
        self.password_prompts.fetch_add(1, Ordering::SeqCst);
        Ok(SecretString::from(self.password.clone()))
    }
}

/// Prompt that always fails as if no terminal were attached.
pub struct NoTerminalPrompt;

impl CredentialPrompt for NoTerminalPrompt {
    fn username(&self, host: &str) -> Result<String, CredentialError> {
        Err(CredentialError::PromptUnavailable {
            host: host.to_string(),
        })
    }

    fn password(&self, host: &str, _username: &str) -> Result<SecretString, CredentialError> {
        Err(CredentialError::PromptUnavailable {
            host: host.to_string(),
        })
    }
}

/// Secret store backed by a map; can be made to fail.
#[derive(Clone, Default)]
pub struct MemorySecretStore {
    entries: Arc<Mutex<HashMap<(String, String), String>>>,
    pub broken: bool,
}

impl MemorySecretStore {
    /// A store whose reads fail.
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    pub fn stored(&self, host: &str, username: &str) -> Option<String> {
        self.entries
            .lock()
            .get(&(host.to_string(), username.to_string()))
            .cloned()
    }
}

impl SecretStore for MemorySecretStore {
    fn get(&self, host: &str, username: &str) -> Result<Option<SecretString>, CredentialError> {
        if self.broken {
            return Err(CredentialError::SecretStore {
                host: host.to_string(),
                reason: "keychain locked".to_string(),
            });
        }
        Ok(self.stored(host, username).map(SecretString::from))
    }

    fn set(&self, host: &str, username: &str, password: &SecretString) -> Result<(), CredentialError> {
        self.entries.lock().insert(
            (host.to_string(), username.to_string()),
            password.expose_secret().to_owned(),
        );
        Ok(())
    }
}

/// Everything a dispatcher test needs to inspect.
pub struct Harness {
    pub dav: Dispatcher,
    pub server: MemoryServer,
    pub connector: MemoryConnector,
    pub prompt: ScriptedPrompt,
}

impl Harness {
    pub fn new() -> Self {
        let prompt = ScriptedPrompt::new("alice", "wonderland");
        Self::with_resolver(prompt.clone(), CredentialResolver::new(prompt))
    }

    pub fn with_resolver(prompt: ScriptedPrompt, resolver: CredentialResolver) -> Self {
        let server = MemoryServer::new();
        let connector = MemoryConnector::new(server.clone());
        let pool = CredentialPool::new(connector.clone(), resolver);
        Self {
            dav: Dispatcher::new(Arc::new(pool)),
            server,
            connector,
            prompt,
        }
    }
}
