//! The local/remote dispatch facade.
//!
//! Each operation classifies its target. `http://` and `https://` targets go
//! to the host's pooled WebDAV session; everything else goes straight to
//! `std::fs`, with native errors passed through as [`DavError::Io`].

use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};
use url::Url;

use crate::credentials::Credentials;
use crate::error::{DavError, DavResult, DeleteErrors, DeleteFailure};
use crate::handle::{FileHandle, RemoteFile};
use crate::pool::CredentialPool;
use crate::remote::Session;
use crate::target::{Location, OpenMode, parse_remote};

/// A caller-supplied object that knows how to open itself.
///
/// Targets implementing this are opened through it; no classification or
/// remote dispatch happens for them.
pub trait CustomOpen {
    fn open(&self, mode: OpenMode) -> DavResult<FileHandle>;
}

/// What [`Dispatcher::open`] opens.
pub enum Target<'a> {
    /// A local path or an `http(s)://` URL.
    Location(&'a str),
    Custom(&'a dyn CustomOpen),
}

impl<'a> From<&'a str> for Target<'a> {
    fn from(target: &'a str) -> Self {
        Target::Location(target)
    }
}

impl<'a> From<&'a String> for Target<'a> {
    fn from(target: &'a String) -> Self {
        Target::Location(target.as_str())
    }
}

impl<'a, T: CustomOpen> From<&'a T> for Target<'a> {
    fn from(target: &'a T) -> Self {
        Target::Custom(target)
    }
}

/// Options for [`Dispatcher::open`].
#[derive(Debug, Clone, Default)]
pub struct OpenOptions {
    /// Explicit credentials for a remote target. When set, the credential
    /// resolver is never consulted.
    pub credentials: Option<Credentials>,
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::new(username, password));
        self
    }
}

/// Uniform entry point for file and directory operations on either backend.
#[derive(Clone)]
pub struct Dispatcher {
    pool: Arc<CredentialPool>,
}

impl Dispatcher {
    pub fn new(pool: Arc<CredentialPool>) -> Self {
        Self { pool }
    }

    /// Dispatcher over [`CredentialPool::from_env`].
    pub fn from_env() -> Self {
        Self::new(Arc::new(CredentialPool::from_env()))
    }

    pub fn pool(&self) -> &Arc<CredentialPool> {
        &self.pool
    }

    /// Open a target for reading, writing or appending.
    ///
    /// Remote targets yield a [`FileHandle::Remote`]; it is the caller's job
    /// to [`close`](FileHandle::close) it.
    pub fn open<'a>(
        &self,
        target: impl Into<Target<'a>>,
        mode: OpenMode,
        options: &OpenOptions,
    ) -> DavResult<FileHandle> {
        let path = match target.into() {
            Target::Custom(opener) => {
                debug!(%mode, "Delegating open to custom target");
                return opener.open(mode);
            }
            Target::Location(path) => path,
        };

        match Location::classify(path) {
            Location::Remote(url) => {
                let (url, _) = parse_remote(url)?;
                let session = match &options.credentials {
                    Some(credentials) => self.pool.connect_with(&url, credentials.clone())?,
                    None => self.pool.session_for(&url)?,
                };
                debug!(url = %url, %mode, "Opening remote file");
                Ok(FileHandle::Remote(RemoteFile::open(session, url, mode)?))
            }
            Location::Local(path) => Ok(FileHandle::Local(open_local(path, mode)?)),
        }
    }

    /// Open a target and hand the handle to `f`.
    ///
    /// The handle is not closed afterwards; `f` decides.
    pub fn open_with<'a, R>(
        &self,
        target: impl Into<Target<'a>>,
        mode: OpenMode,
        options: &OpenOptions,
        f: impl FnOnce(&mut FileHandle) -> DavResult<R>,
    ) -> DavResult<R> {
        let mut handle = self.open(target, mode, options)?;
        f(&mut handle)
    }

    pub fn exists(&self, target: &str) -> DavResult<bool> {
        match Location::classify(target) {
            Location::Remote(target) => {
                let (session, url) = self.remote(target)?;
                Ok(session.exists(&url)?)
            }
            Location::Local(path) => Ok(Path::new(path).try_exists()?),
        }
    }

    /// Delete one file.
    pub fn delete(&self, target: &str) -> DavResult<()> {
        match Location::classify(target) {
            Location::Remote(target) => {
                let (session, url) = self.remote(target)?;
                Ok(session.delete(&url)?)
            }
            Location::Local(path) => Ok(fs::remove_file(path)?),
        }
    }

    /// Delete every target in order.
    ///
    /// A failure does not stop the batch; all failures are returned
    /// together in [`DavError::Delete`].
    pub fn delete_all<I, S>(&self, targets: I) -> DavResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut attempted = 0;
        let mut failures = Vec::new();

        for target in targets {
            let target = target.as_ref();
            attempted += 1;
            if let Err(error) = self.delete(target) {
                warn!(path = target, error = %error, "Delete failed, continuing with remaining targets");
                failures.push(DeleteFailure {
                    target: target.to_string(),
                    error,
                });
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DavError::Delete(DeleteErrors {
                attempted,
                failures,
            }))
        }
    }

    pub fn mkdir(&self, target: &str) -> DavResult<()> {
        match Location::classify(target) {
            Location::Remote(target) => {
                let (session, url) = self.remote(target)?;
                Ok(session.mkdir(&url)?)
            }
            Location::Local(path) => Ok(fs::create_dir(path)?),
        }
    }

    pub fn rmdir(&self, target: &str) -> DavResult<()> {
        match Location::classify(target) {
            Location::Remote(target) => {
                let (session, url) = self.remote(target)?;
                Ok(session.delete(&url)?)
            }
            Location::Local(path) => Ok(fs::remove_dir(path)?),
        }
    }

    /// PROPFIND a remote target. Local targets are rejected.
    pub fn propfind(&self, target: &str) -> DavResult<String> {
        let (session, url) = self.remote_only(target, "propfind")?;
        Ok(session.propfind(&url)?)
    }

    /// PROPPATCH a remote target with a `<prop>` snippet. Local targets are rejected.
    pub fn proppatch(&self, target: &str, xml: &str) -> DavResult<()> {
        let (session, url) = self.remote_only(target, "proppatch")?;
        Ok(session.proppatch(&url, xml)?)
    }

    fn remote(&self, target: &str) -> DavResult<(Session, Url)> {
        let (url, _) = parse_remote(target)?;
        let session = self.pool.session_for(&url)?;
        Ok((session, url))
    }

    fn remote_only(&self, target: &str, operation: &'static str) -> DavResult<(Session, Url)> {
        match Location::classify(target) {
            Location::Remote(target) => self.remote(target),
            Location::Local(path) => Err(DavError::Unsupported {
                operation,
                target: path.to_string(),
            }),
        }
    }
}

fn open_local(path: &str, mode: OpenMode) -> io::Result<File> {
    let mut options = fs::OpenOptions::new();
    match mode {
        OpenMode::Read => options.read(true),
        OpenMode::Write => options.write(true).create(true).truncate(true),
        OpenMode::Append => options.append(true).create(true),
    };
    options.open(path)
}
