//! Blocking WebDAV client over `reqwest`.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::{debug, trace};
use url::Url;

use super::xml::{propfind_body, proppatch_body};
use super::{Connector, RemoteStorage};
use crate::credentials::Credentials;
use crate::error::RemoteError;

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";

/// HTTP settings for [`DavClient`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Per-request timeout in seconds; `0` disables it.
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Accept self-signed or otherwise invalid TLS certificates.
    pub accept_invalid_certs: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: concat!("oxdav/", env!("CARGO_PKG_VERSION")).to_string(),
            accept_invalid_certs: false,
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// WebDAV client for a single host, authenticated with HTTP Basic.
#[derive(Debug)]
pub struct DavClient {
    http: Client,
    credentials: Option<Credentials>,
}

impl DavClient {
    pub fn new(config: &ClientConfig) -> Result<Self, RemoteError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;
        Ok(Self {
            http,
            credentials: None,
        })
    }

    fn request(&self, method: Method, url: &Url) -> RequestBuilder {
        let builder = self.http.request(method, url.clone());
        match &self.credentials {
            Some(c) => builder.basic_auth(&c.username, Some(c.password.expose_secret())),
            None => builder,
        }
    }

    fn send(&self, builder: RequestBuilder, method: &str, url: &Url) -> Result<Response, RemoteError> {
        debug!(method, url = %url, "WebDAV request");
        let response = builder.send()?;
        trace!(method, url = %url, status = %response.status(), "WebDAV response");
        check_status(response, method, url)
    }

    fn propfind_depth(&self, url: &Url, depth: &str) -> Result<Response, RemoteError> {
        let builder = self
            .request(dav_method("PROPFIND")?, url)
            .header("Depth", depth)
            .header(CONTENT_TYPE, XML_CONTENT_TYPE)
            .body(propfind_body());
        self.send(builder, "PROPFIND", url)
    }
}

impl RemoteStorage for DavClient {
    fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = Some(credentials);
    }

    fn get(&self, url: &Url) -> Result<Vec<u8>, RemoteError> {
        let response = self.send(self.request(Method::GET, url), "GET", url)?;
        Ok(response.bytes()?.to_vec())
    }

    fn put(&self, url: &Url, data: &[u8]) -> Result<(), RemoteError> {
        let builder = self.request(Method::PUT, url).body(data.to_vec());
        self.send(builder, "PUT", url)?;
        Ok(())
    }

    fn delete(&self, url: &Url) -> Result<(), RemoteError> {
        self.send(self.request(Method::DELETE, url), "DELETE", url)?;
        Ok(())
    }

    fn mkdir(&self, url: &Url) -> Result<(), RemoteError> {
        self.send(self.request(dav_method("MKCOL")?, url), "MKCOL", url)?;
        Ok(())
    }

    fn exists(&self, url: &Url) -> Result<bool, RemoteError> {
        match self.propfind_depth(url, "0") {
            Ok(_) => Ok(true),
            Err(RemoteError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn propfind(&self, url: &Url) -> Result<String, RemoteError> {
        Ok(self.propfind_depth(url, "1")?.text()?)
    }

    fn proppatch(&self, url: &Url, xml: &str) -> Result<(), RemoteError> {
        let builder = self
            .request(dav_method("PROPPATCH")?, url)
            .header(CONTENT_TYPE, XML_CONTENT_TYPE)
            .body(proppatch_body(xml));
        self.send(builder, "PROPPATCH", url)?;
        Ok(())
    }
}

fn dav_method(name: &str) -> Result<Method, RemoteError> {
    Method::from_bytes(name.as_bytes())
        .map_err(|e| RemoteError::InvalidRequest(format!("{name}: {e}")))
}

fn check_status(response: Response, method: &str, url: &Url) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(match status {
        StatusCode::NOT_FOUND => RemoteError::NotFound(url.to_string()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteError::Unauthorized {
            url: url.to_string(),
            status: status.as_u16(),
        },
        _ => RemoteError::Status {
            method: method.to_string(),
            url: url.to_string(),
            status: status.as_u16(),
        },
    })
}

/// [`Connector`] producing a fresh [`DavClient`] per host.
#[derive(Debug, Clone, Default)]
pub struct HttpConnector {
    config: ClientConfig,
}

impl HttpConnector {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl Connector for HttpConnector {
    fn connect(&self, url: &Url) -> Result<Box<dyn RemoteStorage>, RemoteError> {
        debug!(host = url.host_str().unwrap_or_default(), "Creating WebDAV client");
        Ok(Box::new(DavClient::new(&self.config)?))
    }
}
