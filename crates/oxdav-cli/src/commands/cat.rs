use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use std::io::{self, Write};

use oxdav_core::{Dispatcher, OpenMode, OpenOptions};

#[derive(ClapArgs)]
pub struct Args {
    /// Local path or http(s):// URL
    pub target: String,
}

pub fn execute(dav: &Dispatcher, args: &Args, options: &OpenOptions) -> Result<()> {
    let mut file = dav
        .open(&args.target, OpenMode::Read, options)
        .with_context(|| format!("Failed to open {}", args.target))?;
    let content = file
        .read_all()
        .with_context(|| format!("Failed to read {}", args.target))?;
    file.close()?;

    io::stdout().write_all(&content)?;
    Ok(())
}
