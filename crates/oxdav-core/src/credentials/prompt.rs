use std::io::{self, IsTerminal, Write};

use secrecy::SecretString;

use super::CredentialPrompt;
use crate::error::CredentialError;

/// Prompts on the controlling terminal.
///
/// The username is read from stdin; the password is read without echo.
/// For non-interactive use, set `DAVUSER` and `DAVPASS`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt;

impl CredentialPrompt for TerminalPrompt {
    fn username(&self, host: &str) -> Result<String, CredentialError> {
        if !io::stdin().is_terminal() {
            return Err(CredentialError::PromptUnavailable {
                host: host.to_string(),
            });
        }

        eprint!("Username for {host}: ");
        io::stderr().flush()?;

        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        let username = line.trim();

        if username.is_empty() {
            return Err(CredentialError::Cancelled {
                host: host.to_string(),
            });
        }
        Ok(username.to_string())
    }

    fn password(&self, host: &str, username: &str) -> Result<SecretString, CredentialError> {
        let password = rpassword::prompt_password(format!("Password for '{username}@{host}': "))?;

        if password.is_empty() {
            return Err(CredentialError::Cancelled {
                host: host.to_string(),
            });
        }
        Ok(SecretString::from(password))
    }
}
