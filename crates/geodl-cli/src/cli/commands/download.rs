//! `geodl download` – download an element's formats, verifying checksums.

use anyhow::Result;
use geodl_core::catalog::Catalog;
use geodl_core::download::{self, DownloadOptions, Outcome};
use geodl_core::resolver;
use geodl_core::transfer::CurlTransfer;
use std::path::Path;

pub fn run_download(
    config_path: &Path,
    element: &str,
    formats: &[String],
    verify: bool,
    no_download: bool,
    output_dir: &Path,
) -> Result<()> {
    let catalog = Catalog::load(config_path)?;

    if no_download {
        for url in resolve_urls(&catalog, element, formats)? {
            println!("{}", url);
        }
        return Ok(());
    }

    let transfer = CurlTransfer::default();
    let options = DownloadOptions {
        verify,
        output_dir: output_dir.to_path_buf(),
    };

    let reports = download::run_download(&catalog, &transfer, element, formats, &options)?;
    for report in reports {
        let note = match report.outcome {
            Outcome::Downloaded { verified: None } => "downloaded".to_string(),
            Outcome::Downloaded {
                verified: Some(true),
            } => "downloaded, checksum OK".to_string(),
            Outcome::Downloaded {
                verified: Some(false),
            } => "downloaded, checksum MISMATCH".to_string(),
            Outcome::KeptExisting => "up to date, kept existing file".to_string(),
            Outcome::Redownloaded { verified: true } => {
                "re-downloaded, checksum OK".to_string()
            }
            Outcome::Redownloaded { verified: false } => {
                "re-downloaded, checksum MISMATCH".to_string()
            }
        };
        println!("{}.{}: {}", element, report.format, note);
    }
    Ok(())
}

/// The URLs the requested formats would download, without fetching anything.
fn resolve_urls(catalog: &Catalog, element: &str, formats: &[String]) -> Result<Vec<String>> {
    let elem = resolver::find_element(catalog, element)?;
    let mut urls = Vec::with_capacity(formats.len());
    for format_id in formats {
        urls.push(resolver::compose_url(catalog, elem, format_id)?);
    }
    Ok(urls)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
baseURL: "https://my.base.url"
formats:
  osm.pbf:
    ext: osm.pbf
    loc: ".osm.pbf"
  poly:
    ext: poly
    loc: ".poly"
elements:
  africa:
    id: africa
    name: Africa
"#;

    #[test]
    fn resolve_urls_composes_without_fetching() {
        let cat = Catalog::from_yaml(SAMPLE).unwrap();
        let urls = resolve_urls(
            &cat,
            "africa",
            &["osm.pbf".to_string(), "poly".to_string()],
        )
        .unwrap();
        assert_eq!(
            urls,
            vec![
                "https://my.base.url/africa.osm.pbf".to_string(),
                "https://my.base.url/africa.poly".to_string(),
            ]
        );
    }

    #[test]
    fn resolve_urls_rejects_unknown_element_and_format() {
        let cat = Catalog::from_yaml(SAMPLE).unwrap();
        assert!(resolve_urls(&cat, "atlantis", &["osm.pbf".to_string()]).is_err());
        assert!(resolve_urls(&cat, "africa", &["wrongFmt".to_string()]).is_err());
    }
}
