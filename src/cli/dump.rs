//! `dump` command: write every asset to the web root once.

use crate::{config::ProviderConfig, log, provider::Provider};
use anyhow::Result;

pub fn dump_assets(config: &ProviderConfig, provider: &Provider) -> Result<()> {
    let written = provider.dump()?;
    let dir = config.root_relative(provider.writer.dir());
    match written {
        0 => log!("dump"; "{} is up to date", dir.display()),
        1 => log!("dump"; "wrote 1 asset to {}", dir.display()),
        n => log!("dump"; "wrote {} assets to {}", n, dir.display()),
    }
    Ok(())
}
