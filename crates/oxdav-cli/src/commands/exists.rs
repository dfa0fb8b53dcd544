use anyhow::Result;
use clap::Args as ClapArgs;

use oxdav_core::Dispatcher;

#[derive(ClapArgs)]
pub struct Args {
    /// Local path or http(s):// URL
    pub target: String,
}

/// Prints `true` or `false` and reports the answer for the exit status.
pub fn execute(dav: &Dispatcher, args: &Args) -> Result<bool> {
    let found = dav.exists(&args.target)?;
    println!("{found}");
    Ok(found)
}
