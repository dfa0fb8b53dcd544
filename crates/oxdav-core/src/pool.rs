//! Per-host session cache.
//!
//! The first operation against a host connects a storage client, resolves
//! credentials (which may prompt) and keeps the resulting [`Session`]. Every
//! later operation against that hostname reuses it, whichever path or
//! operation it is for. Sessions are never evicted.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};
use url::Url;

use crate::credentials::{CredentialResolver, Credentials};
use crate::error::DavResult;
use crate::remote::{Connector, HttpConnector, Session};
use crate::target::host_of;

/// Hostname → session map.
///
/// Established sessions sit behind a short-held map lock. Creating a session
/// for a new host happens under that host's own gate, so a credential prompt
/// for one host never blocks lookups for another.
pub struct CredentialPool {
    connector: Box<dyn Connector>,
    resolver: CredentialResolver,
    sessions: Mutex<HashMap<String, Session>>,
    gates: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl CredentialPool {
    pub fn new(connector: impl Connector + 'static, resolver: CredentialResolver) -> Self {
        Self {
            connector: Box::new(connector),
            resolver,
            sessions: Mutex::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
        }
    }

    /// Pool using [`HttpConnector`] defaults and environment/terminal credentials.
    pub fn from_env() -> Self {
        Self::new(HttpConnector::default(), CredentialResolver::from_env())
    }

    /// Session for the URL's host, created on first use.
    ///
    /// Concurrent first requests for the same host wait on that host's gate
    /// and see the session the first one created, so resolution runs once.
    pub fn session_for(&self, url: &Url) -> DavResult<Session> {
        let host = host_of(url)?;
        if let Some(session) = self.pooled(&host) {
            return Ok(session);
        }

        let gate = Arc::clone(self.gates.lock().entry(host.clone()).or_default());
        let _creating = gate.lock();

        // another caller may have finished while we waited on the gate
        if let Some(session) = self.pooled(&host) {
            return Ok(session);
        }

        let mut storage = self.connector.connect(url)?;
        let credentials = self.resolver.resolve(&host)?;
        storage.set_credentials(credentials);

        let session: Session = Arc::from(storage);
        self.sessions.lock().insert(host.clone(), Arc::clone(&session));
        info!(host, "Created session");
        Ok(session)
    }

    fn pooled(&self, host: &str) -> Option<Session> {
        let session = self.sessions.lock().get(host).map(Arc::clone)?;
        debug!(host, "Reusing pooled session");
        Some(session)
    }

    /// A session with explicit credentials, outside the pool.
    ///
    /// The resolver is not consulted and the pooled session for the host,
    /// if any, is left untouched.
    pub fn connect_with(&self, url: &Url, credentials: Credentials) -> DavResult<Session> {
        let mut storage = self.connector.connect(url)?;
        debug!(
            host = url.host_str().unwrap_or_default(),
            username = %credentials.username,
            "Connecting with explicit credentials"
        );
        storage.set_credentials(credentials);
        Ok(Arc::from(storage))
    }

    pub fn contains_host(&self, host: &str) -> bool {
        self.sessions.lock().contains_key(host)
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}
