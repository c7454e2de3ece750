//! Download orchestration: one (element, format) unit of work at a time.
//!
//! Workflow per format: decide whether to download at all, verify an
//! existing artifact against the published sidecar, and re-download at most
//! once on mismatch. Fetch failures are fatal for the unit of work;
//! verification mismatches are warnings (having a copy of the data still
//! beats having none).

use crate::catalog::{Catalog, Element};
use crate::checksum::{self, Hashable};
use crate::resolver;
use crate::transfer::{file_exists, Transfer};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Behavior switches for a download run, threaded explicitly instead of
/// living in process-global state.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Verify artifacts against published checksums where available.
    pub verify: bool,
    /// Directory receiving data artifacts and hash sidecars.
    pub output_dir: PathBuf,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            verify: true,
            output_dir: PathBuf::from("."),
        }
    }
}

/// Terminal state of one (element, format) unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No local file existed; one fresh download. `verified` is `None` when
    /// verification was off or the format has no sidecar.
    Downloaded { verified: Option<bool> },
    /// Existing artifact matched the published checksum; nothing fetched.
    KeptExisting,
    /// Existing artifact mismatched; re-downloaded once. `verified` is the
    /// final comparison after the re-download, reported but never retried.
    Redownloaded { verified: bool },
}

/// Per-format outcome of a [`run_download`] invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatReport {
    pub format: String,
    pub outcome: Outcome,
}

/// Download the given formats for one element, sequentially in the order
/// requested.
///
/// `element_id` must name a catalog entry
/// ([`resolver::ResolveError::ElementNotFound`] otherwise). The first failed
/// format aborts the run; callers wanting to continue past failures can
/// invoke this once per format.
pub fn run_download(
    catalog: &Catalog,
    transfer: &dyn Transfer,
    element_id: &str,
    formats: &[String],
    options: &DownloadOptions,
) -> Result<Vec<FormatReport>> {
    let element = resolver::find_element(catalog, element_id)?;
    let mut reports = Vec::with_capacity(formats.len());
    for format_id in formats {
        let outcome = download_one(catalog, transfer, element, format_id, options)
            .with_context(|| format!("download {}.{}", element_id, format_id))?;
        reports.push(FormatReport {
            format: format_id.clone(),
            outcome,
        });
    }
    Ok(reports)
}

fn download_one(
    catalog: &Catalog,
    transfer: &dyn Transfer,
    element: &Element,
    format_id: &str,
    options: &DownloadOptions,
) -> Result<Outcome> {
    let dest = options
        .output_dir
        .join(format!("{}.{}", element.id, format_id));

    let hashable = if options.verify {
        checksum::is_hashable(catalog, format_id)
    } else {
        None
    };
    let Some(hashable) = hashable else {
        fetch_artifact(catalog, transfer, element, format_id, &dest)?;
        return Ok(Outcome::Downloaded { verified: None });
    };

    if file_exists(&dest) {
        if verify_against_published(catalog, transfer, element, &hashable, &dest, options)? {
            tracing::info!(file = %dest.display(), "checksum match, no download");
            return Ok(Outcome::KeptExisting);
        }
        tracing::warn!(file = %dest.display(), "checksum mismatch, re-downloading");
        fetch_artifact(catalog, transfer, element, format_id, &dest)?;
        let verified =
            verify_against_published(catalog, transfer, element, &hashable, &dest, options)?;
        if verified {
            tracing::info!(file = %dest.display(), "checksum OK after re-download");
        } else {
            tracing::warn!(file = %dest.display(), "checksum still mismatched after re-download");
        }
        return Ok(Outcome::Redownloaded { verified });
    }

    fetch_artifact(catalog, transfer, element, format_id, &dest)?;
    let verified =
        verify_against_published(catalog, transfer, element, &hashable, &dest, options)?;
    if !verified {
        tracing::warn!(file = %dest.display(), "checksum mismatch, please re-download");
    }
    Ok(Outcome::Downloaded {
        verified: Some(verified),
    })
}

/// Resolve and fetch the data artifact for `(element, format_id)` to `dest`.
fn fetch_artifact(
    catalog: &Catalog,
    transfer: &dyn Transfer,
    element: &Element,
    format_id: &str,
    dest: &Path,
) -> Result<()> {
    let url = resolver::compose_url(catalog, element, format_id)?;
    transfer
        .fetch(&url, dest)
        .with_context(|| format!("fetch {}", url))?;
    Ok(())
}

/// Fetch the hash sidecar, digest the local artifact, and compare.
fn verify_against_published(
    catalog: &Catalog,
    transfer: &dyn Transfer,
    element: &Element,
    hashable: &Hashable,
    data_path: &Path,
    options: &DownloadOptions,
) -> Result<bool> {
    let hash_url = resolver::compose_url(catalog, element, &hashable.format_id)?;
    let hash_path = options
        .output_dir
        .join(format!("{}.{}", element.id, hashable.format_id));
    transfer
        .fetch(&hash_url, &hash_path)
        .with_context(|| format!("fetch {}", hash_url))?;

    let digest = checksum::local_digest(data_path)?.unwrap_or_default();
    tracing::debug!(file = %data_path.display(), %digest, "local digest");
    Ok(checksum::matches_published(&hash_path, &digest)?)
}
