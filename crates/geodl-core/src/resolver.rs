//! Chain resolution and URL composition.
//!
//! Turns a catalog element into the `/`-joined path from hierarchy root to
//! leaf, then into a concrete download URL for a registered format. The
//! composer is a pure string assembler, not a URL canonicalizer: the extract
//! services' published layouts rely on unnormalized relative segments (a
//! deliberate `../` in a `basepath` is common), so nothing here touches
//! doubled slashes or `..`.

use crate::catalog::{Catalog, Element};
use std::collections::HashSet;
use thiserror::Error;

/// Resolution-time errors. All are deterministic given the catalog and are
/// never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The requested element id is not a key in the catalog.
    #[error("element \"{0}\" not found in catalog")]
    ElementNotFound(String),
    /// The element value passed in does not match the catalog's copy under
    /// the same id (stale or externally fabricated value).
    #[error("element \"{0}\" is not registered in the catalog")]
    ElementNotRegistered(String),
    /// An ancestor reference names an id with no catalog entry.
    #[error("parent \"{parent}\" of element \"{element}\" not found in catalog")]
    ParentNotFound { element: String, parent: String },
    /// The requested format id has no registry entry.
    #[error("unknown format \"{0}\"")]
    UnknownFormat(String),
    /// The parent chain revisited an id; the catalog data is cyclic.
    #[error("cyclic parent chain at element \"{0}\"")]
    CyclicHierarchy(String),
}

/// Look up an element by id, failing with [`ResolveError::ElementNotFound`].
pub fn find_element<'c>(catalog: &'c Catalog, id: &str) -> Result<&'c Element, ResolveError> {
    catalog
        .element(id)
        .ok_or_else(|| ResolveError::ElementNotFound(id.to_string()))
}

/// Resolve the hierarchical path chain for `element`, root to leaf, joined
/// by `/`.
///
/// The element must be registered: the catalog's entry under `element.id`
/// must be identical to the value passed in. Each node contributes its own
/// `file` override when set, its `id` otherwise, so an ancestor's override
/// is honored inside every descendant's chain.
///
/// The walk is iterative with a visited set; a repeated id fails with
/// [`ResolveError::CyclicHierarchy`] instead of looping forever.
pub fn resolve_chain(catalog: &Catalog, element: &Element) -> Result<String, ResolveError> {
    match catalog.element(&element.id) {
        Some(registered) if registered == element => {}
        _ => return Err(ResolveError::ElementNotRegistered(element.id.clone())),
    }

    let mut segments = vec![element.segment()];
    let mut visited: HashSet<&str> = HashSet::new();
    visited.insert(&element.id);

    let mut current = element;
    while current.has_parent() {
        let parent =
            catalog
                .element(&current.parent)
                .ok_or_else(|| ResolveError::ParentNotFound {
                    element: current.id.clone(),
                    parent: current.parent.clone(),
                })?;
        if !visited.insert(&parent.id) {
            return Err(ResolveError::CyclicHierarchy(parent.id.clone()));
        }
        segments.push(parent.segment());
        current = parent;
    }

    segments.reverse();
    Ok(segments.join("/"))
}

/// Compose the final download URL for `(element, format_id)`.
///
/// Layout: `effectiveBase + "/" + basepath + chain + loc`, where
/// `effectiveBase` is the format's `baseurl` when set, else the catalog's,
/// and `loc` is appended with no inserted separator.
pub fn compose_url(
    catalog: &Catalog,
    element: &Element,
    format_id: &str,
) -> Result<String, ResolveError> {
    let spec = catalog
        .formats
        .get(format_id)
        .ok_or_else(|| ResolveError::UnknownFormat(format_id.to_string()))?;
    let chain = resolve_chain(catalog, element)?;
    let base = if spec.base_url.is_empty() {
        &catalog.base_url
    } else {
        &spec.base_url
    };
    Ok(format!("{}/{}{}{}", base, spec.base_path, chain, spec.loc))
}

/// Format-free variant: catalog base URL plus caller-supplied prefix strings
/// plus the chain, with no `loc` suffix. Used for display and for building
/// paths without a file extension.
pub fn resolve_prefixed_path(
    catalog: &Catalog,
    element: &Element,
    base_paths: &[&str],
) -> Result<String, ResolveError> {
    let chain = resolve_chain(catalog, element)?;
    Ok(format!(
        "{}/{}{}",
        catalog.base_url,
        base_paths.concat(),
        chain
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FormatSpec;
    use std::collections::BTreeMap;

    fn format_spec(id: &str, loc: &str, base_path: &str, base_url: &str) -> FormatSpec {
        FormatSpec {
            id: id.to_string(),
            loc: loc.to_string(),
            base_path: base_path.to_string(),
            base_url: base_url.to_string(),
        }
    }

    fn element(id: &str, file: &str, name: &str, parent: &str) -> Element {
        Element {
            id: id.to_string(),
            file: file.to_string(),
            name: name.to_string(),
            meta: false,
            formats: Vec::new(),
            parent: parent.to_string(),
        }
    }

    fn sample_catalog() -> Catalog {
        let mut formats = BTreeMap::new();
        formats.insert(
            "osm.pbf".to_string(),
            format_spec("osm.pbf", ".osm.pbf", "", ""),
        );
        formats.insert(
            "state".to_string(),
            format_spec("state", "-updates/state.txt", "../state/", ""),
        );
        formats.insert(
            "poly".to_string(),
            format_spec("poly", ".poly", "", "http://my.new.url/folder"),
        );
        formats.insert(
            "osm.bz2".to_string(),
            format_spec("osm.bz2", ".osm.bz2", "../osmbz2/", "http://my.new.url/folder"),
        );

        let mut elements = BTreeMap::new();
        elements.insert("africa".to_string(), element("africa", "", "Africa", ""));
        elements.insert(
            "north-america".to_string(),
            element("north-america", "", "North America", ""),
        );
        elements.insert(
            "us".to_string(),
            element("us", "", "United States of America", "north-america"),
        );
        elements.insert(
            "georgia-us".to_string(),
            element("georgia-us", "georgia", "Georgia (US State)", "us"),
        );

        Catalog {
            base_url: "https://my.base.url".to_string(),
            formats,
            elements,
        }
    }

    #[test]
    fn root_element_resolves_to_own_segment() {
        let cat = sample_catalog();
        let africa = cat.element("africa").unwrap();
        assert_eq!(resolve_chain(&cat, africa).unwrap(), "africa");
    }

    #[test]
    fn chain_joins_root_to_leaf_with_file_override() {
        let cat = sample_catalog();
        let georgia = cat.element("georgia-us").unwrap();
        assert_eq!(
            resolve_chain(&cat, georgia).unwrap(),
            "north-america/us/georgia"
        );
    }

    #[test]
    fn resolve_chain_is_deterministic() {
        let cat = sample_catalog();
        let georgia = cat.element("georgia-us").unwrap();
        let first = resolve_chain(&cat, georgia).unwrap();
        let second = resolve_chain(&cat, georgia).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unregistered_element_is_rejected() {
        let cat = sample_catalog();
        let fake = element("georgia-fake", "georgia", "Georgia (fake)", "us");
        assert_eq!(
            resolve_chain(&cat, &fake),
            Err(ResolveError::ElementNotRegistered("georgia-fake".to_string()))
        );
    }

    #[test]
    fn modified_same_id_element_is_rejected() {
        let cat = sample_catalog();
        let mut tampered = cat.element("georgia-us").unwrap().clone();
        tampered.file = "elsewhere".to_string();
        assert_eq!(
            resolve_chain(&cat, &tampered),
            Err(ResolveError::ElementNotRegistered("georgia-us".to_string()))
        );
    }

    #[test]
    fn missing_parent_is_reported_with_both_ids() {
        let mut cat = sample_catalog();
        let orphan = element("georgia-us2", "georgia", "Georgia (US State)", "notus");
        cat.elements.insert("georgia-us2".to_string(), orphan.clone());
        assert_eq!(
            resolve_chain(&cat, &orphan),
            Err(ResolveError::ParentNotFound {
                element: "georgia-us2".to_string(),
                parent: "notus".to_string(),
            })
        );
    }

    #[test]
    fn cyclic_parent_chain_is_detected() {
        let mut cat = sample_catalog();
        let a = element("a", "", "A", "b");
        let b = element("b", "", "B", "a");
        cat.elements.insert("a".to_string(), a.clone());
        cat.elements.insert("b".to_string(), b);
        assert_eq!(
            resolve_chain(&cat, &a),
            Err(ResolveError::CyclicHierarchy("a".to_string()))
        );
    }

    #[test]
    fn self_parent_is_detected() {
        let mut cat = sample_catalog();
        let selfish = element("selfish", "", "Selfish", "selfish");
        cat.elements.insert("selfish".to_string(), selfish.clone());
        assert_eq!(
            resolve_chain(&cat, &selfish),
            Err(ResolveError::CyclicHierarchy("selfish".to_string()))
        );
    }

    #[test]
    fn compose_url_top_level() {
        let cat = sample_catalog();
        let africa = cat.element("africa").unwrap();
        assert_eq!(
            compose_url(&cat, africa, "osm.pbf").unwrap(),
            "https://my.base.url/africa.osm.pbf"
        );
    }

    #[test]
    fn compose_url_basepath_survives_unnormalized() {
        let cat = sample_catalog();
        let georgia = cat.element("georgia-us").unwrap();
        assert_eq!(
            compose_url(&cat, georgia, "state").unwrap(),
            "https://my.base.url/../state/north-america/us/georgia-updates/state.txt"
        );
    }

    #[test]
    fn compose_url_format_base_url_wins() {
        let cat = sample_catalog();
        let georgia = cat.element("georgia-us").unwrap();
        assert_eq!(
            compose_url(&cat, georgia, "poly").unwrap(),
            "http://my.new.url/folder/north-america/us/georgia.poly"
        );
    }

    #[test]
    fn compose_url_base_url_and_basepath_combine() {
        let cat = sample_catalog();
        let georgia = cat.element("georgia-us").unwrap();
        assert_eq!(
            compose_url(&cat, georgia, "osm.bz2").unwrap(),
            "http://my.new.url/folder/../osmbz2/north-america/us/georgia.osm.bz2"
        );
    }

    #[test]
    fn compose_url_unknown_format() {
        let cat = sample_catalog();
        let georgia = cat.element("georgia-us").unwrap();
        assert_eq!(
            compose_url(&cat, georgia, "wrongFmt"),
            Err(ResolveError::UnknownFormat("wrongFmt".to_string()))
        );
    }

    #[test]
    fn compose_url_propagates_resolver_failures() {
        let cat = sample_catalog();
        let fake = element("georgia-fake", "georgia", "Georgia (fake)", "us");
        assert_eq!(
            compose_url(&cat, &fake, "state"),
            Err(ResolveError::ElementNotRegistered("georgia-fake".to_string()))
        );
    }

    #[test]
    fn prefixed_path_without_overrides() {
        let cat = sample_catalog();
        let africa = cat.element("africa").unwrap();
        assert_eq!(
            resolve_prefixed_path(&cat, africa, &[]).unwrap(),
            "https://my.base.url/africa"
        );
        let georgia = cat.element("georgia-us").unwrap();
        assert_eq!(
            resolve_prefixed_path(&cat, georgia, &[]).unwrap(),
            "https://my.base.url/north-america/us/georgia"
        );
    }

    #[test]
    fn prefixed_path_with_override() {
        let cat = sample_catalog();
        let africa = cat.element("africa").unwrap();
        assert_eq!(
            resolve_prefixed_path(&cat, africa, &["base/"]).unwrap(),
            "https://my.base.url/base/africa"
        );
    }

    #[test]
    fn find_element_reports_missing_id() {
        let cat = sample_catalog();
        assert!(find_element(&cat, "africa").is_ok());
        assert_eq!(
            find_element(&cat, "atlantis"),
            Err(ResolveError::ElementNotFound("atlantis".to_string()))
        );
        assert_eq!(
            find_element(&cat, ""),
            Err(ResolveError::ElementNotFound(String::new()))
        );
    }
}
