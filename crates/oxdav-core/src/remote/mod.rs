//! Remote-storage seam.
//!
//! [`RemoteStorage`] is the narrow set of WebDAV calls the dispatcher and
//! [`RemoteFile`](crate::RemoteFile) need. [`Connector`] creates one storage
//! per host; the pool wraps it in a [`Session`] and shares it.

mod client;
mod xml;

use std::sync::Arc;

use url::Url;

use crate::credentials::Credentials;
use crate::error::RemoteError;

pub use client::{ClientConfig, DavClient, HttpConnector};
pub use xml::{propfind_body, proppatch_body};

/// An authenticated connection context for one host, shared by every
/// operation against that host.
pub type Session = Arc<dyn RemoteStorage>;

/// Blocking WebDAV operations.
///
/// All calls suspend the caller until the server answers. Errors are
/// returned untranslated and never retried.
pub trait RemoteStorage: Send + Sync {
    /// Set the credentials used for every later request.
    ///
    /// Called once, before the storage is shared.
    fn set_credentials(&mut self, credentials: Credentials);

    /// GET the resource body.
    fn get(&self, url: &Url) -> Result<Vec<u8>, RemoteError>;

    /// PUT `data` as the complete new body.
    fn put(&self, url: &Url, data: &[u8]) -> Result<(), RemoteError>;

    /// DELETE a resource or collection.
    fn delete(&self, url: &Url) -> Result<(), RemoteError>;

    /// MKCOL a collection.
    fn mkdir(&self, url: &Url) -> Result<(), RemoteError>;

    fn exists(&self, url: &Url) -> Result<bool, RemoteError>;

    /// PROPFIND, returning the raw multistatus XML.
    fn propfind(&self, url: &Url) -> Result<String, RemoteError>;

    /// PROPPATCH with a `<prop>` body snippet.
    fn proppatch(&self, url: &Url, xml: &str) -> Result<(), RemoteError>;
}

/// Creates unauthenticated storage for a URL.
pub trait Connector: Send + Sync {
    fn connect(&self, url: &Url) -> Result<Box<dyn RemoteStorage>, RemoteError>;
}
