//! Transparent local/WebDAV file access.
//!
//! [`Dispatcher`] offers one set of file and directory operations. Targets
//! starting with `http://` or `https://` are served by a WebDAV session for
//! their host; everything else is a local path handled by `std::fs`.
//!
//! Credentials are resolved once per host (environment, configured
//! username, optional keychain, then an interactive prompt) and the
//! resulting session is reused by every later operation on that host.
//!
//! # Example
//!
//! ```no_run
//! use std::io::Write;
//! use oxdav_core::{Dispatcher, OpenMode, OpenOptions};
//!
//! let dav = Dispatcher::from_env();
//!
//! let mut file = dav.open("https://dav.example.com/notes.txt", OpenMode::Write, &OpenOptions::new())?;
//! write!(file, "hello")?;
//! file.close()?;
//!
//! dav.mkdir("https://dav.example.com/archive")?;
//! dav.delete_all(["scratch.txt", "https://dav.example.com/old.txt"])?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod credentials;
pub mod dispatch;
pub mod error;
pub mod handle;
pub mod pool;
pub mod remote;
pub mod target;

pub use credentials::{CredentialResolver, Credentials, EnvCredentials};
pub use dispatch::{CustomOpen, Dispatcher, OpenOptions, Target};
pub use error::{CredentialError, DavError, DavResult, DeleteErrors, RemoteError};
pub use handle::{FileHandle, RemoteFile};
pub use pool::CredentialPool;
pub use remote::{ClientConfig, Connector, DavClient, HttpConnector, RemoteStorage, Session};
pub use target::{Location, OpenMode};
