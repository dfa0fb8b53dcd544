use anyhow::Result;
use clap::Args as ClapArgs;

use oxdav_core::Dispatcher;

#[derive(ClapArgs)]
pub struct Args {
    /// Empty directory (or remote collection) to remove
    pub target: String,
}

pub fn execute(dav: &Dispatcher, args: &Args) -> Result<()> {
    dav.rmdir(&args.target)?;
    Ok(())
}
