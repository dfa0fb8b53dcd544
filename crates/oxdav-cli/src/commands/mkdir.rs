use anyhow::Result;
use clap::Args as ClapArgs;

use oxdav_core::Dispatcher;

#[derive(ClapArgs)]
pub struct Args {
    /// Directory to create (local path or http(s):// URL)
    pub target: String,
}

pub fn execute(dav: &Dispatcher, args: &Args) -> Result<()> {
    dav.mkdir(&args.target)?;
    Ok(())
}
