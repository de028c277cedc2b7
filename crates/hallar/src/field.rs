//! Logical form field descriptors.
//!
//! A [`FieldSpec`] is a stateless description of one form field: its human
//! label, the interaction pattern its control needs, the ordered locator
//! candidates, an optional value map and what to do when it cannot be set.
//! Descriptors are cheap to build fresh for every interaction or to load
//! from a catalog.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::locator::{ElementState, LocatorCandidate, Selector};
use crate::result::{HallarError, HallarResult};
use crate::value_map::{MappedValue, ValueMap};

/// What happens when a field cannot be set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Surface the error and abort the scenario
    #[default]
    Fatal,
    /// Log a warning, report the field as skipped and continue
    Degraded,
}

fn default_option_selectors() -> Vec<Selector> {
    vec![Selector::css("[role=\"option\"]"), Selector::css("[data-value]")]
}

fn default_search_option_selectors() -> Vec<Selector> {
    vec![
        Selector::css("[cmdk-item]"),
        Selector::css("[cmdk-list] [role=\"option\"]"),
        Selector::css("[role=\"option\"]"),
        Selector::css("[data-value]"),
    ]
}

fn default_preview_selectors() -> Vec<Selector> {
    vec![
        Selector::css("img[src*=\"blob:\"]"),
        Selector::css("[data-testid=\"preview\"]"),
        Selector::css(".dropzone img"),
    ]
}

/// Interaction pattern of a field's control, with kind-specific settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Plain text box or textarea
    TextInput,
    /// Styled combobox button opening a list of options
    Combobox {
        /// Base selectors for rendered options, filtered by the label
        #[serde(default = "default_option_selectors")]
        option_selectors: Vec<Selector>,
    },
    /// cmdk-style trigger with an embedded filter input
    SearchDropdown {
        /// Filter input rendered once the dropdown is open
        search_input: Selector,
        /// Selectors for filtered results, tried in order
        #[serde(default = "default_search_option_selectors")]
        option_selectors: Vec<Selector>,
        /// Override for the wait after typing the search text
        #[serde(default, skip_serializing_if = "Option::is_none")]
        search_settle_ms: Option<u64>,
    },
    /// Visually hidden native select backing a styled control
    HiddenSelect {
        /// Substrings expected among the backing control's options
        option_matchers: Vec<String>,
    },
    /// File input behind a dropzone
    FileDropzone {
        /// Selectors for rendered previews, tried in order
        #[serde(default = "default_preview_selectors")]
        preview_selectors: Vec<Selector>,
        /// Override for how long previews may take to render
        #[serde(default, skip_serializing_if = "Option::is_none")]
        upload_timeout_ms: Option<u64>,
    },
}

impl FieldKind {
    /// Combobox with the default option selectors
    #[must_use]
    pub fn combobox() -> Self {
        Self::Combobox {
            option_selectors: default_option_selectors(),
        }
    }

    /// Search dropdown with the default result selectors
    #[must_use]
    pub fn search_dropdown(search_input: Selector) -> Self {
        Self::SearchDropdown {
            search_input,
            option_selectors: default_search_option_selectors(),
            search_settle_ms: None,
        }
    }

    /// Hidden select disambiguated by option substrings
    #[must_use]
    pub fn hidden_select<I, S>(matchers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::HiddenSelect {
            option_matchers: matchers.into_iter().map(Into::into).collect(),
        }
    }

    /// File dropzone with the default preview selectors
    #[must_use]
    pub fn file_dropzone() -> Self {
        Self::FileDropzone {
            preview_selectors: default_preview_selectors(),
            upload_timeout_ms: None,
        }
    }

    /// Short name used in logs and CLI output
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::TextInput => "text_input",
            Self::Combobox { .. } => "combobox",
            Self::SearchDropdown { .. } => "search_dropdown",
            Self::HiddenSelect { .. } => "hidden_select",
            Self::FileDropzone { .. } => "file_dropzone",
        }
    }

    /// State a candidate must reach before it counts as actionable.
    ///
    /// Hidden selects and dropzone file inputs are never rendered, so being
    /// attached is enough.
    #[must_use]
    pub const fn readiness(&self) -> ElementState {
        match self {
            Self::HiddenSelect { .. } | Self::FileDropzone { .. } => ElementState::Attached,
            _ => ElementState::Visible,
        }
    }

    /// Whether values for this kind are chosen from a discrete option set
    #[must_use]
    pub const fn is_discrete(&self) -> bool {
        matches!(
            self,
            Self::Combobox { .. } | Self::SearchDropdown { .. } | Self::HiddenSelect { .. }
        )
    }
}

/// A logical form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Human label (e.g. "Giá bán")
    pub name: String,
    /// Interaction pattern
    pub kind: FieldKind,
    /// Locator candidates in declared order
    #[serde(default)]
    pub candidates: Vec<LocatorCandidate>,
    /// Display label -> underlying value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_map: Option<ValueMap>,
    /// Value the control shows by default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_value: Option<String>,
    /// Fatal or degraded failure handling
    #[serde(default)]
    pub on_failure: FailurePolicy,
    /// Whether an unmapped label is a configuration error
    #[serde(default)]
    pub required_mapping: bool,
}

impl FieldSpec {
    /// Create a field of the given kind with no candidates
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            candidates: Vec::new(),
            value_map: None,
            current_value: None,
            on_failure: FailurePolicy::Fatal,
            required_mapping: false,
        }
    }

    /// Plain text input
    #[must_use]
    pub fn text_input(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::TextInput)
    }

    /// Styled combobox
    #[must_use]
    pub fn combobox(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::combobox())
    }

    /// cmdk-style search dropdown
    #[must_use]
    pub fn search_dropdown(name: impl Into<String>, search_input: Selector) -> Self {
        Self::new(name, FieldKind::search_dropdown(search_input))
    }

    /// Hidden native select
    #[must_use]
    pub fn hidden_select<I, S>(name: impl Into<String>, matchers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, FieldKind::hidden_select(matchers))
    }

    /// File dropzone
    #[must_use]
    pub fn file_dropzone(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::file_dropzone())
    }

    /// Append a candidate
    #[must_use]
    pub fn candidate(mut self, candidate: LocatorCandidate) -> Self {
        self.candidates.push(candidate);
        self
    }

    /// Append a CSS candidate with the default timeout
    #[must_use]
    pub fn selector(self, css: impl Into<String>) -> Self {
        self.candidate(LocatorCandidate::css(css))
    }

    /// Attach a value map
    #[must_use]
    pub fn with_value_map(mut self, map: ValueMap) -> Self {
        self.value_map = Some(map);
        self
    }

    /// Declare the value the control shows by default
    #[must_use]
    pub fn with_current_value(mut self, value: impl Into<String>) -> Self {
        self.current_value = Some(value.into());
        self
    }

    /// Set the failure policy
    #[must_use]
    pub const fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.on_failure = policy;
        self
    }

    /// Log and continue when this field cannot be set
    #[must_use]
    pub const fn degraded(self) -> Self {
        self.with_policy(FailurePolicy::Degraded)
    }

    /// Treat labels missing from the value map as configuration errors
    #[must_use]
    pub const fn require_mapping(mut self) -> Self {
        self.required_mapping = true;
        self
    }

    /// Translate a caller-supplied label through the value map
    pub fn map_label(&self, label: &str) -> HallarResult<MappedValue> {
        match (&self.value_map, self.required_mapping) {
            (Some(map), true) => map.resolve_required(&self.name, label),
            (Some(map), false) => Ok(map.resolve(label)),
            (None, true) => Err(HallarError::config(
                &self.name,
                "mapping required but no value map declared",
            )),
            (None, false) => Ok(ValueMap::new().resolve(label)),
        }
    }

    /// Check the descriptor for declaration mistakes.
    ///
    /// An empty candidate list is reported by the resolver, not here.
    pub fn validate(&self) -> HallarResult<()> {
        if self.name.trim().is_empty() {
            return Err(HallarError::config("", "field name is empty"));
        }
        match &self.kind {
            FieldKind::HiddenSelect { option_matchers } if option_matchers.is_empty() => {
                Err(HallarError::config(
                    &self.name,
                    "hidden select needs at least one option matcher",
                ))
            }
            FieldKind::Combobox { option_selectors }
            | FieldKind::SearchDropdown {
                option_selectors, ..
            } if option_selectors.is_empty() => Err(HallarError::config(
                &self.name,
                "no option selectors declared",
            )),
            FieldKind::FileDropzone {
                preview_selectors, ..
            } if preview_selectors.is_empty() => Err(HallarError::config(
                &self.name,
                "no preview selectors declared",
            )),
            _ => Ok(()),
        }
    }
}

/// A dropzone field plus the files to attach
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSpec {
    /// FileDropzone-kind field
    pub field: FieldSpec,
    /// Files to attach, in order
    pub files: Vec<PathBuf>,
    /// Previews expected after the upload
    pub min_previews: usize,
}

impl UploadSpec {
    /// Expect one preview per file
    #[must_use]
    pub fn new<I, P>(field: FieldSpec, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let files: Vec<PathBuf> = files.into_iter().map(Into::into).collect();
        let min_previews = files.len();
        Self {
            field,
            files,
            min_previews,
        }
    }

    /// Override the expected preview count
    #[must_use]
    pub const fn with_min_previews(mut self, count: usize) -> Self {
        self.min_previews = count;
        self
    }

    /// Check the upload is well-formed
    pub fn validate(&self) -> HallarResult<()> {
        self.field.validate()?;
        if !matches!(self.field.kind, FieldKind::FileDropzone { .. }) {
            return Err(HallarError::config(
                &self.field.name,
                format!("upload needs a file_dropzone field, got {}", self.field.kind.name()),
            ));
        }
        if self.files.is_empty() {
            return Err(HallarError::config(&self.field.name, "no files to upload"));
        }
        Ok(())
    }
}
