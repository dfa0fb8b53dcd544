use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use oxdav_core::{DavError, Dispatcher};

#[derive(ClapArgs)]
pub struct Args {
    /// Files to remove (local paths or http(s):// URLs)
    #[arg(required = true)]
    pub targets: Vec<String>,

    /// Ignore targets that do not exist
    #[arg(short, long)]
    pub force: bool,
}

#[instrument(level = "info", name = "cmd::rm", skip_all, fields(count = args.targets.len(), force = args.force))]
pub fn execute(dav: &Dispatcher, args: &Args) -> Result<()> {
    match dav.delete_all(&args.targets) {
        Ok(()) => Ok(()),
        Err(DavError::Delete(errors))
            if args.force && errors.failures.iter().all(|f| f.error.is_not_found()) =>
        {
            tracing::debug!(skipped = errors.failures.len(), "Ignoring missing targets");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
