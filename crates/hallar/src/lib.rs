//! Hallar: Resilient Field Locator for browser form automation
//!
//! Hallar (Spanish: "to find") locates and drives form controls whose DOM
//! is brittle: styled comboboxes, cmdk search dropdowns, visually hidden
//! native selects and upload dropzones. Every field carries an ordered
//! chain of locator candidates; the first one that becomes actionable wins.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                          HALLAR Pipeline                          │
//! ├───────────────────────────────────────────────────────────────────┤
//! │  FieldSpec ──► Candidate ──► Resolver ──► Action   ──► Outcome    │
//! │  + label       Generator     (strictly    Executor     Applied    │
//! │     │                        in order)    (per kind)   AlreadySet │
//! │     │                                        ▲         Skipped    │
//! │     └──► ValueMap: label → value ────────────┘                    │
//! │                                                                   │
//! │  PageSession owns one PageDriver (MockPage | ChromiumDriver)      │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use hallar::{FieldSpec, LocatorConfig, MockElement, MockPage, PageSession};
//!
//! # async fn run() -> hallar::HallarResult<()> {
//! let page = MockPage::new()
//!     .with_element("input[name=\"price_in_vnd\"]", MockElement::visible());
//! let price = FieldSpec::text_input("Giá bán")
//!     .selector("input[name=\"price_in_vnd\"]")
//!     .selector("input[placeholder=\"Nhập giá bán\"]");
//!
//! let mut session = PageSession::open(page, LocatorConfig::default());
//! session.fill(&price, "2000000000").await?;
//! let page = session.close();
//! assert_eq!(page.value_of("input[name=\"price_in_vnd\"]").as_deref(), Some("2000000000"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod candidates;
mod catalog;
#[cfg(feature = "browser")]
#[allow(clippy::missing_errors_doc)]
mod chromium;
mod config;
mod driver;
mod executor;
mod field;
mod hidden;
mod locator;
mod resolver;
mod result;
mod session;
mod value_map;

pub use candidates::CandidateGenerator;
pub use catalog::{FieldCatalog, CATALOG_VERSION};
#[cfg(feature = "browser")]
pub use chromium::{ChromiumConfig, ChromiumDriver};
pub use config::LocatorConfig;
pub use driver::{MockElement, MockPage, PageDriver, SelectOption};
pub use executor::{ActionEffect, ActionExecutor, UploadReport};
pub use field::{FailurePolicy, FieldKind, FieldSpec, UploadSpec};
pub use hidden::{HiddenControl, HiddenSelectFinder};
pub use locator::{
    ElementState, Locator, LocatorCandidate, Selector, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_TIMEOUT_MS,
};
pub use resolver::{Attempt, AttemptOutcome, ResolutionResult, Resolver};
pub use result::{HallarError, HallarResult};
pub use session::{
    AbortedField, FieldOutcome, FieldReport, FieldValue, FieldValues, PageSession, SessionReport,
};
pub use value_map::{MappedValue, ValueMap};
