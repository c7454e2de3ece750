//! `geodl update` – fetch the published catalog document.

use anyhow::{Context, Result};
use geodl_core::catalog::Catalog;
use geodl_core::transfer::{CurlTransfer, Transfer};
use std::fs;
use std::path::Path;

pub fn run_update(url: &str, config_path: &Path) -> Result<()> {
    let transfer = CurlTransfer::default();

    // Fetch to the side and parse before replacing, so a failed or garbled
    // download can't clobber a working catalog.
    let staging = config_path.with_extension("new");
    transfer
        .fetch(url, &staging)
        .with_context(|| format!("fetch catalog from {}", url))?;
    let catalog = Catalog::load(&staging).context("downloaded catalog does not parse")?;
    fs::rename(&staging, config_path)
        .with_context(|| format!("replace {}", config_path.display()))?;

    println!(
        "updated {} ({} elements)",
        config_path.display(),
        catalog.elements.len()
    );
    Ok(())
}
