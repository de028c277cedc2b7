//! Declarative field catalogs.
//!
//! A catalog names the fields of one form, in the order they are filled:
//!
//! ```yaml
//! version: "1.0"
//! name: new_post
//! fields:
//!   - name: "Giá bán"
//!     kind: { type: text_input }
//!     candidates: ['input[name="price_in_vnd"]']
//!     on_failure: fatal
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::field::FieldSpec;
use crate::result::{HallarError, HallarResult};

/// Catalog format version understood by this crate
pub const CATALOG_VERSION: &str = "1.0";

const LISTING_FORM: &str = include_str!("../catalogs/listing_form.yaml");
const LOGIN_FORM: &str = include_str!("../catalogs/login_form.yaml");

/// The fields of one form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCatalog {
    /// Format version (must be "1.0")
    pub version: String,
    /// Catalog name
    pub name: String,
    /// Free-form description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Fields in fill order
    pub fields: Vec<FieldSpec>,
}

impl FieldCatalog {
    /// Parse a catalog from YAML and validate it
    pub fn from_yaml(yaml: &str) -> HallarResult<Self> {
        let catalog: Self = serde_yaml_ng::from_str(yaml).map_err(|e| HallarError::CatalogParse {
            message: e.to_string(),
        })?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Read and parse a catalog file
    pub fn from_file(path: impl AsRef<Path>) -> HallarResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&text)
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> HallarResult<String> {
        serde_yaml_ng::to_string(self).map_err(|e| HallarError::CatalogParse {
            message: e.to_string(),
        })
    }

    /// The real-estate new-listing form
    pub fn listing_form() -> HallarResult<Self> {
        Self::from_yaml(LISTING_FORM)
    }

    /// The login modal
    pub fn login_form() -> HallarResult<Self> {
        Self::from_yaml(LOGIN_FORM)
    }

    /// Check version, field list and every field
    pub fn validate(&self) -> HallarResult<()> {
        if self.version != CATALOG_VERSION {
            return Err(HallarError::config(
                "",
                format!(
                    "unsupported catalog version '{}' (expected {CATALOG_VERSION})",
                    self.version
                ),
            ));
        }
        if self.fields.is_empty() {
            return Err(HallarError::config("", format!("catalog '{}' has no fields", self.name)));
        }

        let mut seen = HashSet::with_capacity(self.fields.len());
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(HallarError::config(&field.name, "field declared twice"));
            }
            field.validate()?;
        }
        Ok(())
    }

    /// Look up a field by name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Look up a field by name, failing with a configuration error
    pub fn require(&self, name: &str) -> HallarResult<&FieldSpec> {
        self.field(name).ok_or_else(|| {
            HallarError::config(name, format!("no such field in catalog '{}'", self.name))
        })
    }

    /// Field names in fill order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}
