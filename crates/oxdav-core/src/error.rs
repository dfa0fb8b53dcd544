//! Error types for local/remote file access.
//!
//! Local operations surface the native [`io::Error`] untouched through
//! [`DavError::Io`]. Remote failures keep their transport-level detail in
//! [`RemoteError`] and credential problems in [`CredentialError`], so callers
//! can tell an auth rejection apart from a cancelled prompt.

use std::fmt;
use std::io;
use std::string::FromUtf8Error;

use thiserror::Error;

/// Errors raised by the remote-storage collaborator.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The resource does not exist on the server (HTTP 404).
    #[error("Remote resource not found: {0}")]
    NotFound(String),

    /// The server rejected our credentials (HTTP 401/403).
    #[error("Authentication rejected for {url} (HTTP {status})")]
    Unauthorized { url: String, status: u16 },

    /// Any other non-success status.
    #[error("{method} {url} failed with HTTP {status}")]
    Status {
        method: String,
        url: String,
        status: u16,
    },

    /// Network or protocol failure below HTTP status level.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The request could not be constructed.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Errors while obtaining credentials for a host.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// No terminal to prompt on.
    #[error("No interactive terminal available to ask for credentials for {host}")]
    PromptUnavailable { host: String },

    /// The user gave an empty answer or aborted the prompt.
    #[error("Credential prompt for {host} was cancelled")]
    Cancelled { host: String },

    /// Reading from the terminal failed.
    #[error("Prompt I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The secret store could not be read or updated.
    #[error("Secret store error for {host}: {reason}")]
    SecretStore { host: String, reason: String },
}

/// Top-level error for dispatcher and handle operations.
#[derive(Debug, Error)]
pub enum DavError {
    /// Write attempted on a handle opened with `r`.
    #[error("{url} is not opened for writing")]
    ReadOnly { url: String },

    /// Operation on a handle after `close`.
    #[error("Handle for {url} is already closed")]
    Closed { url: String },

    /// Target looked like a URL but could not be parsed.
    #[error("Cannot parse '{target}' as a URL: {source}")]
    HostParse {
        target: String,
        #[source]
        source: url::ParseError,
    },

    /// URL parsed but carries no hostname.
    #[error("URL '{0}' has no host")]
    MissingHost(String),

    /// Mode string not starting with `r`, `w` or `a`.
    #[error("Invalid open mode '{0}' (expected r, w or a)")]
    InvalidMode(String),

    /// Operation only defined for remote targets.
    #[error("{operation} is not supported for local path '{target}'")]
    Unsupported {
        operation: &'static str,
        target: String,
    },

    #[error("Remote operation failed: {0}")]
    Remote(#[from] RemoteError),

    #[error("Credential resolution failed: {0}")]
    Credentials(#[from] CredentialError),

    /// Remote content requested as text was not UTF-8.
    #[error("Content of {url} is not valid UTF-8")]
    Utf8 {
        url: String,
        #[source]
        source: FromUtf8Error,
    },

    /// Native filesystem error, passed through unchanged.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// One or more targets of a batch delete failed.
    #[error(transparent)]
    Delete(DeleteErrors),
}

impl DavError {
    /// Whether this error means "the resource does not exist", for either backend.
    pub fn is_not_found(&self) -> bool {
        match self {
            DavError::Io(e) => e.kind() == io::ErrorKind::NotFound,
            DavError::Remote(RemoteError::NotFound(_)) => true,
            _ => false,
        }
    }

    /// Whether the remote rejected credentials or none could be obtained.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            DavError::Remote(RemoteError::Unauthorized { .. }) | DavError::Credentials(_)
        )
    }
}

/// One failed target in a batch delete.
#[derive(Debug)]
pub struct DeleteFailure {
    pub target: String,
    pub error: DavError,
}

/// All failures of a batch delete, in target order.
#[derive(Debug)]
pub struct DeleteErrors {
    /// Number of targets the batch tried to delete.
    pub attempted: usize,
    pub failures: Vec<DeleteFailure>,
}

impl DeleteErrors {
    /// Targets that failed, in the order they were given.
    pub fn failed_targets(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(|f| f.target.as_str())
    }
}

impl fmt::Display for DeleteErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Failed to delete {} of {} targets",
            self.failures.len(),
            self.attempted
        )?;
        for failure in &self.failures {
            write!(f, "\n  {}: {}", failure.target, failure.error)?;
        }
        Ok(())
    }
}

impl std::error::Error for DeleteErrors {}

/// Result type for dispatcher and handle operations.
pub type DavResult<T> = Result<T, DavError>;
