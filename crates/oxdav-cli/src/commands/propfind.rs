use anyhow::Result;
use clap::Args as ClapArgs;

use oxdav_core::Dispatcher;

#[derive(ClapArgs)]
pub struct Args {
    /// Remote resource (http(s):// URL)
    pub target: String,
}

pub fn execute(dav: &Dispatcher, args: &Args) -> Result<()> {
    let xml = dav.propfind(&args.target)?;
    println!("{xml}");
    Ok(())
}
