//! File handles returned by [`Dispatcher::open`](crate::Dispatcher::open).
//!
//! [`RemoteFile`] keeps the whole file body in memory. Every write appends
//! to that buffer and immediately PUTs the complete buffer, so the remote
//! resource always matches what has been written so far and no partial
//! upload support is needed from the server. The price is that `n` writes
//! transfer `O(n²)` bytes in total.

use std::fmt;
use std::fs::File;
use std::io::{self, Read, Write};

use tracing::debug;
use url::Url;

use crate::error::{DavError, DavResult, RemoteError};
use crate::remote::Session;
use crate::target::OpenMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HandleState {
    Ready,
    Closed,
}

/// Buffered handle on a remote WebDAV resource.
pub struct RemoteFile {
    session: Session,
    url: Url,
    mode: OpenMode,
    buffer: Vec<u8>,
    state: HandleState,
}

impl fmt::Debug for RemoteFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteFile")
            .field("url", &self.url.as_str())
            .field("mode", &self.mode)
            .field("buffered", &self.buffer.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl RemoteFile {
    /// Open `url` on an established session.
    ///
    /// In append mode the current body is fetched first and becomes the
    /// start of the buffer. A missing resource starts an empty buffer.
    pub fn open(session: Session, url: Url, mode: OpenMode) -> DavResult<Self> {
        let buffer = if mode == OpenMode::Append {
            match session.get(&url) {
                Ok(existing) => existing,
                Err(RemoteError::NotFound(_)) => {
                    debug!(url = %url, "Append target missing, starting empty");
                    Vec::new()
                }
                Err(e) => return Err(e.into()),
            }
        } else {
            Vec::new()
        };

        debug!(url = %url, %mode, preloaded = buffer.len(), "Opened remote file");
        Ok(Self {
            session,
            url,
            mode,
            buffer,
            state: HandleState::Ready,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// Bytes written (or pre-loaded) so far.
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub fn is_closed(&self) -> bool {
        self.state == HandleState::Closed
    }

    fn ensure_open(&self) -> DavResult<()> {
        match self.state {
            HandleState::Ready => Ok(()),
            HandleState::Closed => Err(DavError::Closed {
                url: self.url.to_string(),
            }),
        }
    }

    /// Append `data` and upload the full buffer.
    ///
    /// Fails with [`DavError::ReadOnly`] in read mode, before any mutation
    /// or network traffic.
    pub fn write(&mut self, data: &[u8]) -> DavResult<()> {
        self.ensure_open()?;
        if !self.mode.is_writable() {
            return Err(DavError::ReadOnly {
                url: self.url.to_string(),
            });
        }

        self.buffer.extend_from_slice(data);
        self.push()
    }

    /// Fetch the current remote body. The local buffer is not consulted.
    pub fn read(&self) -> DavResult<Vec<u8>> {
        self.ensure_open()?;
        Ok(self.session.get(&self.url)?)
    }

    pub fn read_to_string(&self) -> DavResult<String> {
        String::from_utf8(self.read()?).map_err(|source| DavError::Utf8 {
            url: self.url.to_string(),
            source,
        })
    }

    /// Upload the full buffer one last time and close the handle.
    ///
    /// Read-mode handles upload nothing. Closing twice is a no-op.
    pub fn close(&mut self) -> DavResult<()> {
        if self.state == HandleState::Closed {
            return Ok(());
        }
        if self.mode.is_writable() {
            self.push()?;
        }
        self.state = HandleState::Closed;
        debug!(url = %self.url, "Closed remote file");
        Ok(())
    }

    pub fn propfind(&self) -> DavResult<String> {
        Ok(self.session.propfind(&self.url)?)
    }

    pub fn proppatch(&self, xml: &str) -> DavResult<()> {
        Ok(self.session.proppatch(&self.url, xml)?)
    }

    fn push(&self) -> DavResult<()> {
        self.session.put(&self.url, &self.buffer)?;
        Ok(())
    }
}

/// Read/write stream a [`CustomOpen`](crate::CustomOpen) target may hand back.
pub trait Stream: Read + Write + Send {}

impl<T: Read + Write + Send> Stream for T {}

/// A handle on either backend.
pub enum FileHandle {
    Local(File),
    Remote(RemoteFile),
    Custom(Box<dyn Stream>),
}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileHandle::Local(file) => f.debug_tuple("Local").field(file).finish(),
            FileHandle::Remote(remote) => f.debug_tuple("Remote").field(remote).finish(),
            FileHandle::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl FileHandle {
    pub fn is_remote(&self) -> bool {
        matches!(self, FileHandle::Remote(_))
    }

    pub fn as_remote(&self) -> Option<&RemoteFile> {
        match self {
            FileHandle::Remote(remote) => Some(remote),
            _ => None,
        }
    }

    pub fn as_remote_mut(&mut self) -> Option<&mut RemoteFile> {
        match self {
            FileHandle::Remote(remote) => Some(remote),
            _ => None,
        }
    }

    /// Whole content. Remote handles fetch it fresh; local and custom
    /// handles read from the current position to the end.
    pub fn read_all(&mut self) -> DavResult<Vec<u8>> {
        match self {
            FileHandle::Remote(remote) => remote.read(),
            FileHandle::Local(file) => {
                let mut content = Vec::new();
                file.read_to_end(&mut content)?;
                Ok(content)
            }
            FileHandle::Custom(stream) => {
                let mut content = Vec::new();
                stream.read_to_end(&mut content)?;
                Ok(content)
            }
        }
    }

    /// Write `data` through the backend's own semantics.
    pub fn write_bytes(&mut self, data: &[u8]) -> DavResult<()> {
        match self {
            FileHandle::Remote(remote) => remote.write(data),
            FileHandle::Local(file) => Ok(file.write_all(data)?),
            FileHandle::Custom(stream) => Ok(stream.write_all(data)?),
        }
    }

    /// Finish the handle. Remote handles upload their buffer; local files
    /// are flushed and dropped.
    pub fn close(self) -> DavResult<()> {
        match self {
            FileHandle::Remote(mut remote) => remote.close(),
            FileHandle::Local(mut file) => Ok(file.flush()?),
            FileHandle::Custom(mut stream) => Ok(stream.flush()?),
        }
    }

    pub fn propfind(&self) -> DavResult<String> {
        match self {
            FileHandle::Remote(remote) => remote.propfind(),
            _ => Err(DavError::Unsupported {
                operation: "propfind",
                target: "local handle".to_string(),
            }),
        }
    }

    pub fn proppatch(&self, xml: &str) -> DavResult<()> {
        match self {
            FileHandle::Remote(remote) => remote.proppatch(xml),
            _ => Err(DavError::Unsupported {
                operation: "proppatch",
                target: "local handle".to_string(),
            }),
        }
    }
}

impl Write for FileHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            FileHandle::Local(file) => file.write(buf),
            FileHandle::Custom(stream) => stream.write(buf),
            FileHandle::Remote(remote) => {
                remote.write(buf).map_err(into_io_error)?;
                Ok(buf.len())
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            FileHandle::Local(file) => file.flush(),
            FileHandle::Custom(stream) => stream.flush(),
            // Every remote write has already been uploaded.
            FileHandle::Remote(_) => Ok(()),
        }
    }
}

fn into_io_error(e: DavError) -> io::Error {
    match e {
        DavError::Io(e) => e,
        e @ DavError::ReadOnly { .. } => io::Error::new(io::ErrorKind::PermissionDenied, e),
        other => io::Error::other(other),
    }
}
