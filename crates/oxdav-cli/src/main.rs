#![deny(unsafe_code)]

mod commands;
mod config;
mod exit_code;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use oxdav_core::{CredentialError, DavError, OpenOptions, RemoteError};

use crate::commands::{cat, exists, mkdir, propfind, proppatch, rm, rmdir, write};
use crate::config::Config;

/// Read, write and manage files on local disk or WebDAV servers
#[derive(Parser)]
#[command(name = "oxdav")]
#[command(author, version)]
#[command(propagate_version = true)]
#[command(after_help = "EXAMPLES:
    # Print a remote file
    oxdav cat https://dav.example.com/notes.txt

    # Upload from stdin, non-interactively
    DAVUSER=alice DAVPASS=secret oxdav write https://dav.example.com/log.txt --append < entry.txt

    # Remove local and remote files in one go
    oxdav rm scratch.txt https://dav.example.com/old.txt

    # Set a dead property
    oxdav proppatch https://dav.example.com/doc.txt '<Z:author xmlns:Z=\"urn:z\">alice</Z:author>'
")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file (default: ~/.config/oxdav/config.toml)
    #[arg(long, env = "OXDAV_CONFIG", value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Username for `cat`/`write`, skipping credential resolution
    #[arg(long, env = "OXDAV_USERNAME", requires = "password", global = true)]
    username: Option<String>,

    /// Password for `cat`/`write` (insecure, prefer OXDAV_PASSWORD or DAVPASS)
    #[arg(long, env = "OXDAV_PASSWORD", hide_env_values = true, requires = "username", global = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn open_options(&self) -> OpenOptions {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => {
                OpenOptions::new().credentials(username.as_str(), password.as_str())
            }
            _ => OpenOptions::new(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print a file to stdout
    Cat(cat::Args),

    /// Write stdin to a file
    Write(write::Args),

    /// Remove one or more files
    Rm(rm::Args),

    /// Create a directory
    Mkdir(mkdir::Args),

    /// Remove an empty directory
    Rmdir(rmdir::Args),

    /// Check whether a target exists (exit status 1 if not)
    Exists(exists::Args),

    /// Print the WebDAV properties of a remote resource
    Propfind(propfind::Args),

    /// Set WebDAV properties on a remote resource
    Proppatch(proppatch::Args),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up tracing based on verbosity (skip if quiet)
    if !cli.quiet {
        setup_tracing(cli.verbose);
    }

    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            let code = categorize_error(&e);
            if !cli.quiet {
                eprintln!("Error: {e:#}");
            }
            ExitCode::from(code)
        }
    }
}

fn run(cli: &Cli) -> Result<u8> {
    let config = Config::load(cli.config.as_deref())?;
    let dav = config.dispatcher();
    let options = cli.open_options();

    match &cli.command {
        Commands::Cat(args) => cat::execute(&dav, args, &options)?,
        Commands::Write(args) => write::execute(&dav, args, &options)?,
        Commands::Rm(args) => rm::execute(&dav, args)?,
        Commands::Mkdir(args) => mkdir::execute(&dav, args)?,
        Commands::Rmdir(args) => rmdir::execute(&dav, args)?,
        Commands::Propfind(args) => propfind::execute(&dav, args)?,
        Commands::Proppatch(args) => proppatch::execute(&dav, args)?,
        Commands::Exists(args) => {
            if !exists::execute(&dav, args)? {
                return Ok(exit_code::GENERAL_ERROR);
            }
        }
    }
    Ok(exit_code::SUCCESS)
}

/// Set up tracing/logging based on verbosity level
fn setup_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_writer(io::stderr)
        .init();
}

/// Categorize an error into an exit code using typed error downcasting
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if let Some(dav_err) = cause.downcast_ref::<DavError>() {
            return categorize_dav_error(dav_err);
        }

        // Generic I/O errors (stdin, stdout)
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            match io_err.kind() {
                io::ErrorKind::PermissionDenied => return exit_code::PERMISSION_DENIED,
                io::ErrorKind::NotFound => return exit_code::NOT_FOUND,
                io::ErrorKind::Interrupted => return exit_code::CANCELLED,
                _ => {}
            }
        }
    }
    exit_code::GENERAL_ERROR
}

fn categorize_dav_error(e: &DavError) -> u8 {
    if e.is_not_found() {
        return exit_code::NOT_FOUND;
    }
    match e {
        DavError::Credentials(CredentialError::Cancelled { .. }) => exit_code::CANCELLED,
        DavError::Credentials(_) | DavError::Remote(RemoteError::Unauthorized { .. }) => {
            exit_code::AUTH_FAILED
        }
        DavError::ReadOnly { .. } => exit_code::PERMISSION_DENIED,
        DavError::Io(io_err) => match io_err.kind() {
            io::ErrorKind::PermissionDenied => exit_code::PERMISSION_DENIED,
            io::ErrorKind::Interrupted => exit_code::CANCELLED,
            _ => exit_code::GENERAL_ERROR,
        },
        DavError::InvalidMode(_)
        | DavError::HostParse { .. }
        | DavError::MissingHost(_)
        | DavError::Unsupported { .. } => exit_code::USAGE_ERROR,
        // A batch shares one code only when every failure agrees
        DavError::Delete(errors) => {
            let mut codes = errors.failures.iter().map(|f| categorize_dav_error(&f.error));
            match codes.next() {
                Some(first) if codes.all(|c| c == first) => first,
                _ => exit_code::GENERAL_ERROR,
            }
        }
        _ => exit_code::GENERAL_ERROR,
    }
}
