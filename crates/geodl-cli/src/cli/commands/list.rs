//! `geodl list` – show the elements available in the catalog.

use anyhow::Result;
use geodl_core::catalog::{mini_formats, Catalog};
use std::path::Path;

pub fn run_list(config_path: &Path, markdown: bool) -> Result<()> {
    let catalog = Catalog::load(config_path)?;

    if markdown {
        println!("| ShortName | Is in | Long Name | Formats |");
        println!("|---|---|---|---|");
    } else {
        println!(
            "{:<28} {:<28} {:<44} {}",
            "SHORTNAME", "IS IN", "LONG NAME", "FORMATS"
        );
    }

    // BTreeMap iteration gives the sorted order the table relies on.
    for (id, element) in &catalog.elements {
        let parent_name = catalog
            .element(&element.parent)
            .map(|p| p.name.as_str())
            .unwrap_or("");
        let formats = mini_formats(&element.formats);
        if markdown {
            println!("| {} | {} | {} | {} |", id, parent_name, element.name, formats);
        } else {
            println!("{:<28} {:<28} {:<44} {}", id, parent_name, element.name, formats);
        }
    }

    println!("Total elements: {}", catalog.elements.len());
    Ok(())
}
