//! Timing and artifact configuration for field interactions.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::locator::DEFAULT_TIMEOUT_MS;
use crate::result::{HallarError, HallarResult};

/// Knobs shared by the generator, resolver and executor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Wait bound for generated candidates
    pub default_timeout_ms: u64,
    /// Wait bound for generated combobox triggers
    pub combobox_timeout_ms: u64,
    /// Pause after opening a combobox before looking for options
    pub option_render_ms: u64,
    /// Wait bound for each option selector
    pub option_timeout_ms: u64,
    /// Pause after setting a hidden select so dependent UI can react
    pub dependent_settle_ms: u64,
    /// Pause after typing into a search dropdown's filter
    pub search_settle_ms: u64,
    /// How long upload previews may take to render
    pub upload_timeout_ms: u64,
    /// Interval between preview counts
    pub preview_poll_ms: u64,
    /// Selector enumerating visually hidden native selects
    pub hidden_select_selector: String,
    /// Directory for failure screenshots
    pub artifacts_dir: PathBuf,
    /// Capture a screenshot when a fatal field fails
    pub screenshot_on_failure: bool,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
            combobox_timeout_ms: 2000,
            option_render_ms: 500,
            option_timeout_ms: 3000,
            dependent_settle_ms: 500,
            search_settle_ms: 1500,
            upload_timeout_ms: 15_000,
            preview_poll_ms: 250,
            hidden_select_selector: "select[aria-hidden=\"true\"]".to_string(),
            artifacts_dir: PathBuf::from("test-results"),
            screenshot_on_failure: true,
        }
    }
}

impl LocatorConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a YAML file; missing keys keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> HallarResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&text)
    }

    /// Parse from YAML; missing keys keep their defaults
    pub fn from_yaml(yaml: &str) -> HallarResult<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| HallarError::CatalogParse {
            message: e.to_string(),
        })
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> HallarResult<String> {
        serde_yaml_ng::to_string(self).map_err(|e| HallarError::CatalogParse {
            message: e.to_string(),
        })
    }

    /// Set the generated candidate timeout
    #[must_use]
    pub const fn with_default_timeout(mut self, ms: u64) -> Self {
        self.default_timeout_ms = ms;
        self
    }

    /// Set the option render pause
    #[must_use]
    pub const fn with_option_render(mut self, ms: u64) -> Self {
        self.option_render_ms = ms;
        self
    }

    /// Set the upload preview bound
    #[must_use]
    pub const fn with_upload_timeout(mut self, ms: u64) -> Self {
        self.upload_timeout_ms = ms;
        self
    }

    /// Set the preview poll interval
    #[must_use]
    pub const fn with_preview_poll(mut self, ms: u64) -> Self {
        self.preview_poll_ms = ms;
        self
    }

    /// Set the artifact directory
    #[must_use]
    pub fn with_artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = dir.into();
        self
    }

    /// Enable or disable failure screenshots
    #[must_use]
    pub const fn with_screenshots(mut self, enabled: bool) -> Self {
        self.screenshot_on_failure = enabled;
        self
    }

    /// Option render pause as a Duration
    #[must_use]
    pub const fn option_render(&self) -> Duration {
        Duration::from_millis(self.option_render_ms)
    }

    /// Option wait bound as a Duration
    #[must_use]
    pub const fn option_timeout(&self) -> Duration {
        Duration::from_millis(self.option_timeout_ms)
    }

    /// Hidden select settle pause as a Duration
    #[must_use]
    pub const fn dependent_settle(&self) -> Duration {
        Duration::from_millis(self.dependent_settle_ms)
    }

    /// Preview poll interval as a Duration
    #[must_use]
    pub const fn preview_poll(&self) -> Duration {
        Duration::from_millis(self.preview_poll_ms)
    }
}
