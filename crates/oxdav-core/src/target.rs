//! Target classification and open modes.
//!
//! A target is remote exactly when it starts with `http://` or `https://`.
//! Classification looks at the string only; parsing into a [`Url`] happens
//! afterwards, when a hostname is actually needed.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::{DavError, DavResult};

const REMOTE_PREFIXES: [&str; 2] = ["http://", "https://"];

/// Where a target lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location<'a> {
    Local(&'a str),
    Remote(&'a str),
}

impl<'a> Location<'a> {
    /// Classify a target string. Performs no I/O.
    pub fn classify(target: &'a str) -> Self {
        if is_remote(target) {
            Location::Remote(target)
        } else {
            Location::Local(target)
        }
    }

    pub fn as_str(&self) -> &'a str {
        match *self {
            Location::Local(s) | Location::Remote(s) => s,
        }
    }
}

/// `true` for `http://` and `https://` targets.
pub fn is_remote(target: &str) -> bool {
    REMOTE_PREFIXES.iter().any(|p| target.starts_with(p))
}

/// Parse a remote target and extract its hostname.
pub fn parse_remote(target: &str) -> DavResult<(Url, String)> {
    let url = Url::parse(target).map_err(|source| DavError::HostParse {
        target: target.to_string(),
        source,
    })?;
    let host = host_of(&url)?;
    Ok((url, host))
}

/// Hostname of a URL, without port.
pub fn host_of(url: &Url) -> DavResult<String> {
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .ok_or_else(|| DavError::MissingHost(url.to_string()))
}

/// How a file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpenMode {
    /// `r`: reads only; writes are rejected.
    Read,
    /// `w`: content is replaced by what gets written.
    Write,
    /// `a`: content is extended; remote handles pre-load the current body.
    Append,
}

impl OpenMode {
    /// Parse a mode string such as `"r"`, `"wb"`, `"a+"` or `"rb:UTF-8"`.
    ///
    /// Only the first character counts. Empty strings and a first character
    /// other than `r`, `w` or `a` are rejected.
    pub fn parse(mode: &str) -> DavResult<Self> {
        match mode.chars().next() {
            Some('r') => Ok(OpenMode::Read),
            Some('w') => Ok(OpenMode::Write),
            Some('a') => Ok(OpenMode::Append),
            _ => Err(DavError::InvalidMode(mode.to_string())),
        }
    }

    pub fn is_writable(self) -> bool {
        !matches!(self, OpenMode::Read)
    }

    pub fn as_char(self) -> char {
        match self {
            OpenMode::Read => 'r',
            OpenMode::Write => 'w',
            OpenMode::Append => 'a',
        }
    }
}

impl FromStr for OpenMode {
    type Err = DavError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OpenMode::parse(s)
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
