use anyhow::Result;
use clap::Args as ClapArgs;

use oxdav_core::Dispatcher;

#[derive(ClapArgs)]
pub struct Args {
    /// Remote resource (http(s):// URL)
    pub target: String,

    /// Property elements to set, e.g. `<Z:author xmlns:Z="urn:z">me</Z:author>`
    pub xml: String,
}

pub fn execute(dav: &Dispatcher, args: &Args) -> Result<()> {
    dav.proppatch(&args.target, &args.xml)?;
    Ok(())
}
