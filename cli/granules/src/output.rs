//! Rendering of granule tables and catalog descriptions.

use anyhow::Result;
use gf_convention::{ConventionRegistry, GranuleTable};
use gf_discoverer::LayoutConfig;
use std::io::Write;

use crate::args::OutputFormatArg;

/// Write a granule table in the requested format.
pub fn write_table(table: &GranuleTable, format: OutputFormatArg, out: &mut impl Write) -> Result<()> {
    match format {
        OutputFormatArg::Jsonl => {
            for granule in table.iter() {
                serde_json::to_writer(&mut *out, &granule.with_columns(table.columns()))?;
                writeln!(out)?;
            }
        }
        OutputFormatArg::Json => {
            serde_json::to_writer_pretty(&mut *out, table)?;
            writeln!(out)?;
        }
        OutputFormatArg::Urls => {
            for path in table.paths() {
                writeln!(out, "{path}")?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

/// One line per configured product: short name, id, data type.
pub fn write_products(config: &LayoutConfig, out: &mut impl Write) -> Result<()> {
    for (id, product) in &config.products {
        writeln!(
            out,
            "{:<32} {:<40} {}",
            product.short_name.as_deref().unwrap_or("-"),
            id,
            product.data_type
        )?;
    }
    Ok(())
}

/// Everything known locally about one product: identity, catalog location,
/// default filters and the fields it can be filtered on.
pub fn write_details(
    config: &LayoutConfig,
    registry: &ConventionRegistry,
    name: &str,
    out: &mut impl Write,
) -> Result<()> {
    let product = config.product(name)?;
    let resolved = config.resolve(&product, registry)?;
    let Some(entry) = config.products.get(&product.id) else {
        anyhow::bail!("The product {} is missing from the layout configuration", product.id);
    };
    let (convention_name, layout_name) = config
        .granule_discovery
        .get(&entry.data_type)
        .map_or(("-", "-"), |(c, l)| (c.as_str(), l.as_str()));

    writeln!(out, "id:          {}", product.id)?;
    writeln!(out, "short name:  {}", product.short_name.as_deref().unwrap_or("-"))?;
    writeln!(out, "title:       {}", resolved.title.as_deref().unwrap_or("-"))?;
    writeln!(out, "data type:   {}", entry.data_type)?;
    writeln!(out, "catalog:     {}", config.catalog_url(&resolved.catalog_path))?;
    writeln!(out, "convention:  {convention_name} ({})", resolved.convention.pattern())?;
    writeln!(out, "layout:      {layout_name}")?;

    if !resolved.default_filters.is_empty() {
        writeln!(out, "default filters:")?;
        for (key, reference) in resolved.default_filters.iter() {
            writeln!(out, "  {key} = {reference}")?;
        }
    }

    writeln!(out, "folder levels:")?;
    for (depth, level) in resolved.layout.levels().iter().enumerate() {
        let names: Vec<&str> = level.field_names().collect();
        writeln!(out, "  {depth}: {} [{}]", level.pattern(), names.join(", "))?;
    }

    writeln!(out, "fields:")?;
    for field in resolved.convention.fields() {
        writeln!(out, "  - {} ({})", field.name(), field.kind())?;
        writeln!(out, "      {}", field.description())?;
    }
    Ok(())
}

/// Pattern and field descriptions of the registered conventions.
pub fn write_conventions(
    registry: &ConventionRegistry,
    only: Option<&str>,
    out: &mut impl Write,
) -> Result<()> {
    for (name, convention) in registry.conventions() {
        if only.is_some_and(|o| o != name) {
            continue;
        }
        writeln!(out, "{name}")?;
        writeln!(out, "  pattern: {}", convention.pattern())?;
        for field in convention.fields() {
            writeln!(out, "  - {} ({})", field.name(), field.kind())?;
            writeln!(out, "      {}", field.description())?;
        }
        writeln!(out)?;
    }
    Ok(())
}
