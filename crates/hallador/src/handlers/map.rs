//! Map command handler

use std::fmt::Write as _;

use hallar::FieldCatalog;

use crate::commands::MapArgs;
use crate::config::CliConfig;
use crate::error::CliResult;

/// Execute the map command
pub fn execute_map(_config: &CliConfig, args: &MapArgs) -> CliResult<()> {
    let catalog = super::load_catalog(&args.source)?;
    print!("{}", render_mapping(&catalog, &args.field, &args.label)?);
    Ok(())
}

/// Show what the executor would search for and set for `label`
pub fn render_mapping(catalog: &FieldCatalog, field: &str, label: &str) -> CliResult<String> {
    let spec = catalog.require(field)?;
    let mapped = spec.map_label(label)?;

    let mut out = String::new();
    let _ = writeln!(out, "field:       {field}");
    let _ = writeln!(out, "label:       {label}");
    let _ = writeln!(out, "search text: {}", mapped.search_text);
    let _ = writeln!(out, "value:       {}", mapped.value);
    let _ = writeln!(out, "mapped:      {}", if mapped.mapped { "yes" } else { "no" });

    if let (true, Some(map)) = (mapped.mapped, &spec.value_map) {
        let synonyms = map.labels_for(&mapped.value);
        if synonyms.len() > 1 {
            let _ = writeln!(out, "synonyms:    {}", synonyms.join(", "));
        }
    }
    Ok(out)
}
