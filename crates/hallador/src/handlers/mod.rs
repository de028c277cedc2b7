//! Command handlers - kept out of main.rs for testability
//!
//! Each handler renders its output to a `String` so tests can check it
//! without capturing stdout; the `execute_*` wrappers print it.

pub mod candidates;
pub mod check;
pub mod config;
pub mod fill;
pub mod map;

use std::path::Path;

use hallar::{FieldCatalog, LocatorConfig};

use crate::commands::{BuiltinCatalog, CatalogSource};
use crate::error::{CliError, CliResult};

pub use candidates::{execute_candidates, render_candidates};
pub use check::{execute_check, render_check};
pub use config::{execute_config, render_config};
#[cfg(feature = "browser")]
pub use fill::execute_fill;
pub use fill::{load_values, parse_values, render_report};
pub use map::{execute_map, render_mapping};

/// Load the catalog a command names
pub fn load_catalog(source: &CatalogSource) -> CliResult<FieldCatalog> {
    let catalog = match (source.builtin, &source.catalog) {
        (Some(BuiltinCatalog::Listing), _) => FieldCatalog::listing_form()?,
        (Some(BuiltinCatalog::Login), _) => FieldCatalog::login_form()?,
        (None, Some(path)) => FieldCatalog::from_file(path)?,
        (None, None) => {
            return Err(CliError::invalid_argument(
                "give a catalog file or --builtin listing|login",
            ))
        }
    };
    tracing::debug!(catalog = %catalog.name, fields = catalog.fields.len(), "catalog loaded");
    Ok(catalog)
}

/// Defaults overlaid with an optional YAML file
pub fn load_locator_config(path: Option<&Path>) -> CliResult<LocatorConfig> {
    match path {
        Some(path) => Ok(LocatorConfig::from_file(path)?),
        None => Ok(LocatorConfig::default()),
    }
}
