use anyhow::{Context, Result};
use eventscope_core::{EventCatalog, Timestamp};
use eventscope_detector::build_catalog;
use serde::Serialize;

use crate::config::load_config;
use crate::output::{print_json, OutputFormat};

#[derive(Debug, Serialize)]
struct CatalogRow<'a> {
    key: &'a str,
    templates: Vec<TemplateRow>,
}

#[derive(Debug, Serialize)]
struct TemplateRow {
    start: Timestamp,
    confidence: u8,
}

pub fn run(format: OutputFormat) -> Result<()> {
    let config = load_config()?;
    let catalog = build_catalog(&config.catalog).context("Failed to build catalog from config")?;

    match format {
        OutputFormat::Json => print_json(&rows(&catalog)),
        OutputFormat::Text => {
            for row in rows(&catalog) {
                let templates: Vec<String> = row
                    .templates
                    .iter()
                    .map(|t| format!("{} ({}%)", t.start, t.confidence))
                    .collect();
                println!("{:<20} {}", row.key, templates.join(", "));
            }
            Ok(())
        }
    }
}

fn rows(catalog: &EventCatalog) -> Vec<CatalogRow<'_>> {
    catalog
        .entries()
        .map(|entry| CatalogRow {
            key: entry.key(),
            templates: entry
                .templates()
                .map(|(start, confidence)| TemplateRow { start, confidence })
                .collect(),
        })
        .collect()
}
