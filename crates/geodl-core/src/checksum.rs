//! Checksum verification against published hash sidecars.
//!
//! The extract services publish an MD5 sidecar next to each data artifact
//! (`<region>.osm.pbf.md5` etc). Digests are computed on demand, streaming
//! over a bounded buffer, and compared case-insensitively against the first
//! token of the sidecar file.

use crate::catalog::Catalog;
use md5::{Digest, Md5};
use std::fs::{self, File};
use std::io::{ErrorKind, Read};
use std::path::Path;
use thiserror::Error;

const BUF_SIZE: usize = 64 * 1024;

/// Hash kinds with a corresponding sidecar format convention. Currently the
/// services only publish MD5.
pub const HASH_KINDS: &[&str] = &["md5"];

#[derive(Debug, Error)]
pub enum ChecksumError {
    /// Reading the data artifact failed for a reason other than absence.
    #[error("digest read failed for {path}: {source}")]
    DigestIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The hash sidecar exists but could not be read.
    #[error("hash file unreadable at {path}: {source}")]
    HashFileUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A format's associated hash sidecar registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hashable {
    /// Composed registry key of the sidecar format, e.g. `osm.pbf.md5`.
    pub format_id: String,
    /// The hash kind, e.g. `md5`.
    pub kind: String,
}

/// Whether `format_id` has a registered hash sidecar format.
///
/// A format is hashable when both it and `<format_id>.<kind>` are present in
/// the registry for some supported kind. Pure lookup, no I/O.
pub fn is_hashable(catalog: &Catalog, format_id: &str) -> Option<Hashable> {
    if !catalog.formats.contains_key(format_id) {
        return None;
    }
    for kind in HASH_KINDS {
        let hash_format = format!("{format_id}.{kind}");
        if catalog.formats.contains_key(&hash_format) {
            return Some(Hashable {
                format_id: hash_format,
                kind: kind.to_string(),
            });
        }
    }
    None
}

/// Compute the MD5 digest of a file as lowercase hex.
///
/// Returns `Ok(None)` when the file does not exist, so callers can tell "no
/// local artifact" apart from a read failure. Streams in chunks to keep
/// memory bounded on multi-gigabyte extracts.
pub fn local_digest(path: &Path) -> Result<Option<String>, ChecksumError> {
    let io_err = |source| ChecksumError::DigestIo {
        path: path.display().to_string(),
        source,
    };

    let mut f = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_err(e)),
    };
    let mut hasher = Md5::new();
    let mut buf = [0u8; BUF_SIZE];
    loop {
        let n = f.read(&mut buf).map_err(io_err)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(Some(hex::encode(hasher.finalize())))
}

/// Compare `digest` against the published digest in a hash sidecar file.
///
/// The published digest is the first whitespace-delimited token of the file
/// (md5sum layout: `<hex>  <filename>`); comparison is case-insensitive.
/// A missing sidecar is `Ok(false)`, not an error.
pub fn matches_published(hash_file: &Path, digest: &str) -> Result<bool, ChecksumError> {
    let content = match fs::read_to_string(hash_file) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => {
            return Err(ChecksumError::HashFileUnreadable {
                path: hash_file.display().to_string(),
                source: e,
            })
        }
    };
    let published = content.split_whitespace().next().unwrap_or("");
    tracing::debug!(published, "hash from sidecar");
    Ok(!published.is_empty() && published.eq_ignore_ascii_case(digest))
}
