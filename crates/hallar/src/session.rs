//! Page sessions.
//!
//! A [`PageSession`] owns one page driver for the length of one scenario.
//! It runs the generator, resolver and executor for each field, applies the
//! field's failure policy and keeps failure screenshots. There is no shared
//! page state: a scenario opens its own session and closes it when done.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::candidates::CandidateGenerator;
use crate::catalog::FieldCatalog;
use crate::config::LocatorConfig;
use crate::driver::PageDriver;
use crate::executor::{ActionEffect, ActionExecutor, UploadReport};
use crate::field::{FailurePolicy, FieldKind, FieldSpec, UploadSpec};
use crate::resolver::{ResolutionResult, Resolver};
use crate::result::{HallarError, HallarResult};

/// How a field ended up
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FieldOutcome {
    /// The control was changed
    Applied {
        /// Index of the winning candidate
        candidate: usize,
        /// Selector of the winning candidate
        selector: String,
    },
    /// Files were attached
    Uploaded {
        /// Index of the winning candidate
        candidate: usize,
        /// Preview count
        report: UploadReport,
    },
    /// The control already held the value; nothing was touched
    AlreadySet,
    /// A degraded field failed and was left alone
    Skipped {
        /// Failure that was tolerated
        reason: String,
    },
}

impl FieldOutcome {
    /// Whether the field holds the requested value
    #[must_use]
    pub const fn is_set(&self) -> bool {
        !matches!(self, Self::Skipped { .. })
    }
}

/// Value supplied for one catalog field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Display label or text
    Text(String),
    /// Files for a dropzone
    Files(Vec<PathBuf>),
}

/// Values keyed by field name
pub type FieldValues = BTreeMap<String, FieldValue>;

/// Outcome of one field in a catalog run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldReport {
    /// Field name
    pub field: String,
    /// What happened
    #[serde(flatten)]
    pub outcome: FieldOutcome,
}

/// Fatal failure that stopped a catalog run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbortedField {
    /// Field name
    pub field: String,
    /// Error message
    pub message: String,
}

/// Result of filling a catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    /// Catalog name
    pub catalog: String,
    /// Outcomes in fill order
    pub fields: Vec<FieldReport>,
    /// Fatal failure, if the run stopped early
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aborted: Option<AbortedField>,
    /// Screenshots captured during the run
    pub screenshots: Vec<PathBuf>,
}

impl SessionReport {
    /// No fatal failure occurred
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.aborted.is_none()
    }

    /// Number of degraded fields that were skipped
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.fields
            .iter()
            .filter(|f| matches!(f.outcome, FieldOutcome::Skipped { .. }))
            .count()
    }
}

/// Exclusive handle on one page for one scenario
#[derive(Debug)]
pub struct PageSession<D: PageDriver> {
    driver: D,
    config: LocatorConfig,
    generator: CandidateGenerator,
    screenshots: Vec<PathBuf>,
}

impl<D: PageDriver> PageSession<D> {
    /// Take ownership of `driver` for a scenario
    #[must_use]
    pub fn open(driver: D, config: LocatorConfig) -> Self {
        info!(artifacts = %config.artifacts_dir.display(), "page session opened");
        Self {
            driver,
            generator: CandidateGenerator::new(config.clone()),
            config,
            screenshots: Vec::new(),
        }
    }

    /// The underlying driver
    #[must_use]
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// The session's configuration
    #[must_use]
    pub const fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// Screenshots captured so far
    #[must_use]
    pub fn screenshots(&self) -> &[PathBuf] {
        &self.screenshots
    }

    /// Resolve `field` without acting on it
    pub async fn resolve(&self, field: &FieldSpec, current_hint: Option<&str>) -> ResolutionResult {
        let candidates = self.generator.generate(field, current_hint);
        Resolver::new(&self.driver)
            .resolve(&field.name, &candidates, field.kind.readiness())
            .await
    }

    /// Set `field` to `label`, honouring its failure policy.
    ///
    /// Fatal failures capture a screenshot and return the error. Degraded
    /// failures are logged and reported as [`FieldOutcome::Skipped`].
    /// Configuration errors are returned under either policy.
    pub async fn fill(&mut self, field: &FieldSpec, label: &str) -> HallarResult<FieldOutcome> {
        let result = self.try_fill(field, label).await;
        self.settle(field, result).await
    }

    /// Attach files to a dropzone field, honouring its failure policy
    pub async fn upload(&mut self, spec: &UploadSpec) -> HallarResult<FieldOutcome> {
        let result = self.try_upload(spec).await;
        self.settle(&spec.field, result).await
    }

    /// Fill every catalog field that has a value, in catalog order.
    ///
    /// Values naming fields the catalog lacks, or of the wrong shape for
    /// their field, are rejected before the page is touched. A fatal
    /// failure stops the run and is recorded in the report.
    pub async fn fill_catalog(
        &mut self,
        catalog: &FieldCatalog,
        values: &FieldValues,
    ) -> HallarResult<SessionReport> {
        for (name, value) in values {
            let field = catalog.require(name)?;
            let is_dropzone = matches!(field.kind, FieldKind::FileDropzone { .. });
            match (value, is_dropzone) {
                (FieldValue::Files(_), false) => {
                    return Err(HallarError::config(name, "files given for a field that is not a dropzone"));
                }
                (FieldValue::Text(_), true) => {
                    return Err(HallarError::config(name, "dropzone fields need a list of files"));
                }
                _ => {}
            }
        }

        let mut report = SessionReport {
            catalog: catalog.name.clone(),
            fields: Vec::new(),
            aborted: None,
            screenshots: Vec::new(),
        };
        for field in &catalog.fields {
            let Some(value) = values.get(&field.name) else {
                continue;
            };
            let outcome = match value {
                FieldValue::Text(label) => self.fill(field, label).await,
                FieldValue::Files(files) => {
                    self.upload(&UploadSpec::new(field.clone(), files.iter().cloned()))
                        .await
                }
            };
            match outcome {
                Ok(outcome) => report.fields.push(FieldReport {
                    field: field.name.clone(),
                    outcome,
                }),
                Err(err) => {
                    report.aborted = Some(AbortedField {
                        field: field.name.clone(),
                        message: err.to_string(),
                    });
                    break;
                }
            }
        }
        report.screenshots = self.screenshots.clone();
        Ok(report)
    }

    /// Release the page, handing the driver back for teardown
    pub fn close(self) -> D {
        info!(screenshots = self.screenshots.len(), "page session closed");
        self.driver
    }

    async fn try_fill(&self, field: &FieldSpec, label: &str) -> HallarResult<FieldOutcome> {
        field.validate()?;
        let mapped = field.map_label(label)?;
        let (candidate, locator) = self.resolve(field, None).await.into_match()?;
        let effect = ActionExecutor::new(&self.driver, &self.config)
            .apply(field, &locator, &mapped)
            .await?;
        Ok(match effect {
            ActionEffect::Applied => FieldOutcome::Applied {
                candidate,
                selector: locator.to_string(),
            },
            ActionEffect::AlreadySet => FieldOutcome::AlreadySet,
        })
    }

    async fn try_upload(&self, spec: &UploadSpec) -> HallarResult<FieldOutcome> {
        spec.validate()?;
        let (candidate, locator) = self.resolve(&spec.field, None).await.into_match()?;
        let report = ActionExecutor::new(&self.driver, &self.config)
            .upload(spec, &locator)
            .await?;
        Ok(FieldOutcome::Uploaded { candidate, report })
    }

    async fn settle(
        &mut self,
        field: &FieldSpec,
        result: HallarResult<FieldOutcome>,
    ) -> HallarResult<FieldOutcome> {
        let err = match result {
            Ok(outcome) => return Ok(outcome),
            Err(err) => err,
        };
        if matches!(err, HallarError::ConfigurationError { .. }) {
            error!(field = %field.name, error = %err, "field is misconfigured");
            return Err(err);
        }
        match field.on_failure {
            FailurePolicy::Degraded => {
                warn!(field = %field.name, error = %err, "degraded field skipped");
                Ok(FieldOutcome::Skipped {
                    reason: err.to_string(),
                })
            }
            FailurePolicy::Fatal => {
                error!(field = %field.name, error = %err, "fatal field failure");
                self.capture_failure(&field.name).await;
                Err(err)
            }
        }
    }

    async fn capture_failure(&mut self, field: &str) {
        if !self.config.screenshot_on_failure {
            return;
        }
        let bytes = match self.driver.screenshot().await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(field, error = %err, "failure screenshot not captured");
                return;
            }
        };
        let path = self.config.artifacts_dir.join(screenshot_name(field));
        let written = std::fs::create_dir_all(&self.config.artifacts_dir)
            .and_then(|()| std::fs::write(&path, bytes));
        match written {
            Ok(()) => {
                info!(field, path = %path.display(), "failure screenshot saved");
                self.screenshots.push(path);
            }
            Err(err) => warn!(field, error = %err, "failure screenshot not written"),
        }
    }
}

fn screenshot_name(field: &str) -> String {
    let slug: String = field
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect();
    format!(
        "screenshot-{}-{}.png",
        slug.trim_matches('-'),
        Utc::now().format("%Y%m%dT%H%M%S%3f")
    )
}
