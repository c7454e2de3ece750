//! Catalog model: the region hierarchy and format registry.
//!
//! A catalog document is YAML (e.g. `geofabrik.yml`), produced by the
//! per-service generators and read back here. The model is immutable for the
//! duration of a resolve/download run.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// One node in the region hierarchy (continent, country, state, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Canonical identifier; also the default path segment and registry key.
    pub id: String,
    /// Path-segment override for this element (empty = use `id`).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file: String,
    /// Display name. No resolution semantics.
    #[serde(default)]
    pub name: String,
    /// True for pure container nodes with no directly downloadable formats.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub meta: bool,
    /// Format identifiers available for this element (informational).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub formats: Vec<String>,
    /// Identifier of the ancestor element (empty = root).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub parent: String,
}

impl Element {
    /// The path segment this element contributes to a chain.
    pub fn segment(&self) -> &str {
        if self.file.is_empty() {
            &self.id
        } else {
            &self.file
        }
    }

    pub fn has_parent(&self) -> bool {
        !self.parent.is_empty()
    }
}

/// One row of the format registry: how a format identifier turns into a URL
/// suffix and optional base overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatSpec {
    /// Format identifier, matching the `formats` map key.
    #[serde(rename = "ext")]
    pub id: String,
    /// Suffix appended directly after the resolved chain (no implied separator).
    pub loc: String,
    /// Inserted verbatim between the effective base URL and the chain.
    #[serde(default, rename = "basepath", skip_serializing_if = "String::is_empty")]
    pub base_path: String,
    /// When non-empty, replaces the catalog-level base URL for this format.
    #[serde(default, rename = "baseurl", skip_serializing_if = "String::is_empty")]
    pub base_url: String,
}

/// The whole catalog: base URL, format registry, element hierarchy.
///
/// BTreeMaps keep iteration in key order, which the list view relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(rename = "baseURL")]
    pub base_url: String,
    pub formats: BTreeMap<String, FormatSpec>,
    pub elements: BTreeMap<String, Element>,
}

impl Catalog {
    /// Parse a catalog from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("invalid catalog document")
    }

    /// Load a catalog document from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read catalog {}", path.display()))?;
        Self::from_yaml(&text)
            .with_context(|| format!("parse catalog {}", path.display()))
    }

    /// Look up an element by identifier.
    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }
}

/// Compact per-element format column for the list view.
///
/// One letter per known downloadable format, always emitted in
/// `s P B H p S k` order regardless of the element's declaration order.
pub fn mini_formats(formats: &[String]) -> String {
    let mut res = [""; 7];
    for item in formats {
        match item.as_str() {
            "state" => res[0] = "s",
            "osm.pbf" => res[1] = "P",
            "osm.bz2" => res[2] = "B",
            "osh.pbf" => res[3] = "H",
            "poly" => res[4] = "p",
            "shp.zip" => res[5] = "S",
            "kml" => res[6] = "k",
            _ => {}
        }
    }
    res.concat()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
baseURL: "https://download.geofabrik.de"
formats:
  osm.pbf:
    ext: osm.pbf
    loc: "-latest.osm.pbf"
  osm.pbf.md5:
    ext: osm.pbf.md5
    loc: "-latest.osm.pbf.md5"
  state:
    ext: state
    basepath: "../state/"
    loc: "-updates/state.txt"
elements:
  africa:
    id: africa
    name: Africa
    formats:
      - osm.pbf
      - osm.pbf.md5
  us:
    id: us
    name: United States of America
    meta: true
    parent: north-america
  georgia-us:
    id: georgia-us
    file: georgia
    name: Georgia (US State)
    formats:
      - osm.pbf
    parent: us
  north-america:
    id: north-america
    name: North America
"#;

    #[test]
    fn parses_sample_document() {
        let cat = Catalog::from_yaml(SAMPLE).unwrap();
        assert_eq!(cat.base_url, "https://download.geofabrik.de");
        assert_eq!(cat.formats.len(), 3);
        assert_eq!(cat.elements.len(), 4);

        let state = &cat.formats["state"];
        assert_eq!(state.id, "state");
        assert_eq!(state.base_path, "../state/");
        assert_eq!(state.loc, "-updates/state.txt");
        assert!(state.base_url.is_empty());

        let georgia = cat.element("georgia-us").unwrap();
        assert_eq!(georgia.file, "georgia");
        assert_eq!(georgia.parent, "us");
        assert!(!georgia.meta);
        assert!(cat.element("us").unwrap().meta);
    }

    #[test]
    fn segment_prefers_file_override() {
        let cat = Catalog::from_yaml(SAMPLE).unwrap();
        assert_eq!(cat.element("georgia-us").unwrap().segment(), "georgia");
        assert_eq!(cat.element("africa").unwrap().segment(), "africa");
    }

    #[test]
    fn has_parent() {
        let cat = Catalog::from_yaml(SAMPLE).unwrap();
        assert!(cat.element("us").unwrap().has_parent());
        assert!(!cat.element("africa").unwrap().has_parent());
    }

    #[test]
    fn yaml_roundtrip_preserves_model() {
        let cat = Catalog::from_yaml(SAMPLE).unwrap();
        let out = serde_yaml::to_string(&cat).unwrap();
        let back = Catalog::from_yaml(&out).unwrap();
        assert_eq!(back, cat);
    }

    #[test]
    fn mini_formats_fixed_slots() {
        let formats: Vec<String> = ["osm.pbf", "state", "kml", "poly"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(mini_formats(&formats), "sPpk");
        assert_eq!(mini_formats(&[]), "");
        assert_eq!(mini_formats(&["unknown".to_string()]), "");
    }
}
