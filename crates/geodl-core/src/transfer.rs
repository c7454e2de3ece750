//! File transfer primitive.
//!
//! The orchestrator only depends on the [`Transfer`] trait, so tests can
//! substitute a mock with no network. The production implementation uses the
//! curl crate (libcurl) with a single-stream GET written straight to the
//! destination file.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Duration;

/// Error from a single fetch (curl failure, HTTP error, or local write
/// failure). Typed so the orchestrator can report the layer that failed.
#[derive(Debug)]
pub enum TransferError {
    /// Curl reported an error (timeout, connection, TLS, etc.).
    Curl(curl::Error),
    /// HTTP response had a non-2xx status.
    Http { code: u32, url: String },
    /// Writing the destination file failed (disk full, permission denied).
    Io(io::Error),
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::Curl(e) => write!(f, "{}", e),
            TransferError::Http { code, url } => write!(f, "HTTP {} for {}", code, url),
            TransferError::Io(e) => write!(f, "write: {}", e),
        }
    }
}

impl std::error::Error for TransferError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransferError::Curl(e) => Some(e),
            TransferError::Io(e) => Some(e),
            TransferError::Http { .. } => None,
        }
    }
}

impl From<curl::Error> for TransferError {
    fn from(e: curl::Error) -> Self {
        TransferError::Curl(e)
    }
}

impl From<io::Error> for TransferError {
    fn from(e: io::Error) -> Self {
        TransferError::Io(e)
    }
}

/// Fetches a URL into a destination file.
pub trait Transfer {
    fn fetch(&self, url: &str, dest: &Path) -> Result<(), TransferError>;
}

/// Production transfer on libcurl: single GET, redirects followed, body
/// streamed to `dest`.
#[derive(Debug, Clone, Copy)]
pub struct CurlTransfer {
    pub connect_timeout: Duration,
    /// Abort when throughput stays under 1 KiB/s for this long.
    pub low_speed_time: Duration,
}

impl Default for CurlTransfer {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            low_speed_time: Duration::from_secs(60),
        }
    }
}

impl Transfer for CurlTransfer {
    fn fetch(&self, url: &str, dest: &Path) -> Result<(), TransferError> {
        tracing::debug!(url, dest = %dest.display(), "fetch");

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.low_speed_limit(1024)?;
        easy.low_speed_time(self.low_speed_time)?;

        let mut out = BufWriter::new(File::create(dest)?);
        let mut write_err: Option<io::Error> = None;
        let performed = {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| match out.write_all(data) {
                Ok(()) => Ok(data.len()),
                Err(e) => {
                    // Returning a short count makes curl abort the transfer.
                    write_err = Some(e);
                    Ok(0)
                }
            })?;
            transfer.perform()
        };
        if let Some(e) = write_err {
            return Err(TransferError::Io(e));
        }
        performed?;
        out.flush()?;

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            // Don't leave an error page behind as a plausible artifact.
            let _ = fs::remove_file(dest);
            return Err(TransferError::Http {
                code,
                url: url.to_string(),
            });
        }
        Ok(())
    }
}

/// Whether `path` names an existing file or directory.
pub fn file_exists(path: &Path) -> bool {
    path.exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_error_display() {
        let e = TransferError::Http {
            code: 404,
            url: "https://example.com/africa.osm.pbf".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "HTTP 404 for https://example.com/africa.osm.pbf"
        );

        let e = TransferError::Io(io::Error::new(io::ErrorKind::Other, "disk full"));
        assert_eq!(e.to_string(), "write: disk full");
    }

    #[test]
    fn file_exists_on_tempfile() {
        let f = tempfile::NamedTempFile::new().unwrap();
        assert!(file_exists(f.path()));
        let dir = tempfile::tempdir().unwrap();
        assert!(!file_exists(&dir.path().join("missing.osm.pbf")));
    }
}
