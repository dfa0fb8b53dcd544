use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use std::io::{self, Read};
use tracing::instrument;

use oxdav_core::{Dispatcher, OpenMode, OpenOptions};

#[derive(ClapArgs)]
pub struct Args {
    /// Local path or http(s):// URL
    pub target: String,

    /// Append to the existing content instead of replacing it
    #[arg(short, long)]
    pub append: bool,
}

#[instrument(level = "info", name = "cmd::write", skip_all, fields(path = %args.target, append = args.append))]
pub fn execute(dav: &Dispatcher, args: &Args, options: &OpenOptions) -> Result<()> {
    let mut content = Vec::new();
    io::stdin()
        .read_to_end(&mut content)
        .context("Failed to read stdin")?;

    let mode = if args.append { OpenMode::Append } else { OpenMode::Write };
    let mut file = dav
        .open(&args.target, mode, options)
        .with_context(|| format!("Failed to open {}", args.target))?;
    file.write_bytes(&content)
        .with_context(|| format!("Failed to write {}", args.target))?;
    file.close()
        .with_context(|| format!("Failed to close {}", args.target))?;

    tracing::info!(bytes = content.len(), "Wrote content");
    Ok(())
}
