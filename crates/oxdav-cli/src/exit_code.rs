//! Exit codes for the CLI.
//!
//! These follow common Unix conventions so scripts can tell failures apart.

/// Successful execution
pub const SUCCESS: u8 = 0;

/// General/unspecified error, also `exists` on a missing target
pub const GENERAL_ERROR: u8 = 1;

/// Command-line usage error (bad arguments)
pub const USAGE_ERROR: u8 = 2;

/// Server rejected the credentials, or none could be obtained
pub const AUTH_FAILED: u8 = 3;

/// Permission denied (local filesystem or read-only handle)
pub const PERMISSION_DENIED: u8 = 5;

/// File or directory not found, locally or on the server
pub const NOT_FOUND: u8 = 7;

/// Credential prompt cancelled or operation interrupted
pub const CANCELLED: u8 = 8;
