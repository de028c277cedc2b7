//! PageDriver - Abstract Page Automation Trait
//!
//! The locator core never talks to a browser directly. It is handed a
//! [`PageDriver`] exposing the handful of primitives it needs: waiting on an
//! element state, counting matches, reading values and attributes, and the
//! mutating actions (click, clear, fill, select, attach files).
//!
//! # Implementations
//!
//! - `ChromiumDriver` - CDP via chromiumoxide (feature `browser`)
//! - [`MockPage`] - scripted in-memory page for unit tests
//!
//! Every method takes `&self`: a page is driven by one scenario at a time,
//! and implementations serialise access internally.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::locator::{ElementState, Locator, Selector};
use crate::result::{HallarError, HallarResult};

/// One option of a native select element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Submitted value
    pub value: String,
    /// Rendered text
    pub label: String,
}

impl SelectOption {
    /// Create an option
    #[must_use]
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Abstract driver trait for page automation
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Wait up to `timeout` for the addressed element to reach `state`.
    ///
    /// Returns `Ok(false)` on timeout; `Err` only for driver failures.
    async fn wait_for(
        &self,
        locator: &Locator,
        state: ElementState,
        timeout: Duration,
    ) -> HallarResult<bool>;

    /// Number of elements matching the locator's selector
    async fn count(&self, locator: &Locator) -> HallarResult<usize>;

    /// Click the element
    async fn click(&self, locator: &Locator) -> HallarResult<()>;

    /// Clear an input's content
    async fn clear(&self, locator: &Locator) -> HallarResult<()>;

    /// Write text into an input
    async fn fill(&self, locator: &Locator, text: &str) -> HallarResult<()>;

    /// Set a native select's value
    async fn select_option(&self, locator: &Locator, value: &str) -> HallarResult<()>;

    /// Attach files to a file input
    async fn set_input_files(&self, locator: &Locator, files: &[PathBuf]) -> HallarResult<()>;

    /// Read an attribute
    async fn get_attribute(&self, locator: &Locator, name: &str) -> HallarResult<Option<String>>;

    /// Current value of an input or select
    async fn input_value(&self, locator: &Locator) -> HallarResult<String>;

    /// Rendered text of the element
    async fn text_content(&self, locator: &Locator) -> HallarResult<Option<String>>;

    /// Options of a native select
    async fn select_options(&self, locator: &Locator) -> HallarResult<Vec<SelectOption>>;

    /// Suspend for a fixed time
    async fn wait_for_timeout(&self, duration: Duration);

    /// Capture the page as PNG bytes
    async fn screenshot(&self) -> HallarResult<Vec<u8>>;

    /// Wait up to `timeout` for the element to be visible
    async fn is_visible(&self, locator: &Locator, timeout: Duration) -> HallarResult<bool> {
        self.wait_for(locator, ElementState::Visible, timeout).await
    }

    /// Wait up to `timeout` for the selector to render
    async fn wait_for_selector(&self, locator: &Locator, timeout: Duration) -> HallarResult<bool> {
        self.wait_for(locator, ElementState::Visible, timeout).await
    }
}

// ============================================================================
// MockPage: scripted in-memory page
// ============================================================================

/// Element of a [`MockPage`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockElement {
    /// Rendered (visible) or merely attached
    pub visible: bool,
    /// Text content
    pub text: String,
    /// Input or select value
    pub value: String,
    /// Attributes
    pub attributes: HashMap<String, String>,
    /// Native select options
    pub options: Vec<SelectOption>,
    /// Attached files
    pub files: Vec<PathBuf>,
    /// Every access fails with a driver error (stale node)
    pub broken: bool,
}

impl MockElement {
    /// A visible element
    #[must_use]
    pub fn visible() -> Self {
        Self {
            visible: true,
            ..Self::default()
        }
    }

    /// An attached but hidden element
    #[must_use]
    pub fn hidden() -> Self {
        Self::default()
    }

    /// An element whose every access throws
    #[must_use]
    pub fn broken() -> Self {
        Self {
            visible: true,
            broken: true,
            ..Self::default()
        }
    }

    /// Set the text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the value
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set native select options as (value, label) pairs
    #[must_use]
    pub fn with_options<I, V, L>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = (V, L)>,
        V: Into<String>,
        L: Into<String>,
    {
        self.options = options
            .into_iter()
            .map(|(v, l)| SelectOption::new(v, l))
            .collect();
        self
    }
}

/// What a scripted action adds to the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Trigger {
    Click,
    Fill,
    Files,
}

#[derive(Debug, Default)]
struct MockState {
    elements: Vec<(String, MockElement)>,
    reveals: HashMap<(Trigger, String), Vec<(String, MockElement)>>,
    failing: Vec<String>,
    call_history: Vec<String>,
}

impl MockState {
    /// Indices of elements the selector matches, in document order
    fn matches(&self, selector: &Selector) -> Vec<usize> {
        let keyed = |key: &str, text: Option<&str>| -> Vec<usize> {
            self.elements
                .iter()
                .enumerate()
                .filter(|(_, (k, el))| k == key && text.map_or(true, |t| el.text.contains(t)))
                .map(|(i, _)| i)
                .collect()
        };
        match selector {
            Selector::Css(css) => keyed(css, None),
            Selector::TestId(id) => keyed(&format!("[data-testid=\"{id}\"]"), None),
            Selector::CssWithText { css, text } => keyed(css, Some(text)),
            Selector::Role { role, name } => {
                keyed(&format!("[role=\"{role}\"]"), name.as_deref())
            }
            Selector::Text(t) => self
                .elements
                .iter()
                .enumerate()
                .filter(|(_, (_, el))| el.text.contains(t.as_str()))
                .map(|(i, _)| i)
                .collect(),
        }
    }

    fn resolve(&self, locator: &Locator) -> HallarResult<usize> {
        self.matches(locator.selector())
            .get(locator.index())
            .copied()
            .ok_or_else(|| HallarError::driver(format!("no element matches {locator}")))
    }

    fn element(&mut self, locator: &Locator) -> HallarResult<&mut MockElement> {
        let idx = self.resolve(locator)?;
        let el = &mut self.elements[idx].1;
        if el.broken {
            return Err(HallarError::driver(format!(
                "element {locator} is detached from the DOM"
            )));
        }
        Ok(el)
    }

    fn fire(&mut self, trigger: Trigger, locator: &Locator) {
        let key = (trigger, locator.selector().to_string());
        if let Some(revealed) = self.reveals.remove(&key) {
            self.elements.extend(revealed);
        }
    }
}

/// Scripted in-memory page for unit testing.
///
/// Elements are keyed by the CSS string they answer to. Text-filtered and
/// role selectors match on the element's text; `nth` picks among repeated
/// keys in insertion order. Actions can reveal further elements, which is
/// how dropdown options, search results and upload previews appear.
#[derive(Debug, Default)]
pub struct MockPage {
    state: Mutex<MockState>,
}

impl MockPage {
    /// Create an empty page
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add an element answering to `key`
    #[must_use]
    pub fn with_element(self, key: impl Into<String>, element: MockElement) -> Self {
        self.add_element(key, element);
        self
    }

    /// Add an element answering to `key`
    pub fn add_element(&self, key: impl Into<String>, element: MockElement) {
        self.state().elements.push((key.into(), element));
    }

    /// Reveal elements once the element matching `selector` is clicked
    #[must_use]
    pub fn on_click<I, K>(self, selector: impl Into<String>, revealed: I) -> Self
    where
        I: IntoIterator<Item = (K, MockElement)>,
        K: Into<String>,
    {
        self.script(Trigger::Click, selector, revealed)
    }

    /// Reveal elements once text is written into `selector`
    #[must_use]
    pub fn on_fill<I, K>(self, selector: impl Into<String>, revealed: I) -> Self
    where
        I: IntoIterator<Item = (K, MockElement)>,
        K: Into<String>,
    {
        self.script(Trigger::Fill, selector, revealed)
    }

    /// Reveal elements once files are attached to `selector`
    #[must_use]
    pub fn on_files<I, K>(self, selector: impl Into<String>, revealed: I) -> Self
    where
        I: IntoIterator<Item = (K, MockElement)>,
        K: Into<String>,
    {
        self.script(Trigger::Files, selector, revealed)
    }

    fn script<I, K>(self, trigger: Trigger, selector: impl Into<String>, revealed: I) -> Self
    where
        I: IntoIterator<Item = (K, MockElement)>,
        K: Into<String>,
    {
        let revealed = revealed.into_iter().map(|(k, e)| (k.into(), e)).collect();
        self.state()
            .reveals
            .insert((trigger, selector.into()), revealed);
        self
    }

    /// Make every wait on `selector` fail with a driver error
    #[must_use]
    pub fn failing(self, selector: impl Into<String>) -> Self {
        self.state().failing.push(selector.into());
        self
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state().call_history.clone()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.state()
            .call_history
            .iter()
            .any(|c| c.starts_with(method))
    }

    /// Calls that changed page state
    #[must_use]
    pub fn mutations(&self) -> Vec<String> {
        const MUTATING: [&str; 5] = ["click:", "clear:", "fill:", "select_option:", "set_input_files:"];
        self.state()
            .call_history
            .iter()
            .filter(|c| MUTATING.iter().any(|m| c.starts_with(m)))
            .cloned()
            .collect()
    }

    /// Value of the first element answering to `key`
    #[must_use]
    pub fn value_of(&self, key: &str) -> Option<String> {
        self.element_by_key(key, 0).map(|e| e.value)
    }

    /// Snapshot of the `nth` element answering to `key`
    #[must_use]
    pub fn element_by_key(&self, key: &str, nth: usize) -> Option<MockElement> {
        self.state()
            .elements
            .iter()
            .filter(|(k, _)| k == key)
            .nth(nth)
            .map(|(_, e)| e.clone())
    }

    fn record(&self, call: String) {
        self.state().call_history.push(call);
    }
}

#[async_trait]
impl PageDriver for MockPage {
    async fn wait_for(
        &self,
        locator: &Locator,
        state: ElementState,
        timeout: Duration,
    ) -> HallarResult<bool> {
        let mut guard = self.state();
        guard
            .call_history
            .push(format!("wait_for:{locator}:{}ms", timeout.as_millis()));
        let key = locator.selector().to_string();
        if guard.failing.iter().any(|f| *f == key) {
            return Err(HallarError::driver(format!("evaluation failed for {locator}")));
        }
        let Ok(idx) = guard.resolve(locator) else {
            return Ok(false);
        };
        let el = &guard.elements[idx].1;
        if el.broken {
            return Err(HallarError::driver(format!(
                "element {locator} is detached from the DOM"
            )));
        }
        Ok(match state {
            ElementState::Attached => true,
            ElementState::Visible => el.visible,
        })
    }

    async fn count(&self, locator: &Locator) -> HallarResult<usize> {
        let mut guard = self.state();
        guard.call_history.push(format!("count:{locator}"));
        Ok(guard.matches(locator.selector()).len())
    }

    async fn click(&self, locator: &Locator) -> HallarResult<()> {
        self.record(format!("click:{locator}"));
        let mut guard = self.state();
        guard.element(locator)?;
        guard.fire(Trigger::Click, locator);
        Ok(())
    }

    async fn clear(&self, locator: &Locator) -> HallarResult<()> {
        self.record(format!("clear:{locator}"));
        self.state().element(locator)?.value.clear();
        Ok(())
    }

    async fn fill(&self, locator: &Locator, text: &str) -> HallarResult<()> {
        self.record(format!("fill:{locator}:{text}"));
        let mut guard = self.state();
        guard.element(locator)?.value = text.to_string();
        guard.fire(Trigger::Fill, locator);
        Ok(())
    }

    async fn select_option(&self, locator: &Locator, value: &str) -> HallarResult<()> {
        self.record(format!("select_option:{locator}:{value}"));
        let mut guard = self.state();
        let el = guard.element(locator)?;
        let Some(option) = el
            .options
            .iter()
            .find(|o| o.value == value || o.label == value)
        else {
            return Err(HallarError::driver(format!(
                "no option '{value}' in {locator}"
            )));
        };
        el.value = option.value.clone();
        Ok(())
    }

    async fn set_input_files(&self, locator: &Locator, files: &[PathBuf]) -> HallarResult<()> {
        self.record(format!("set_input_files:{locator}:{}", files.len()));
        let mut guard = self.state();
        guard.element(locator)?.files = files.to_vec();
        guard.fire(Trigger::Files, locator);
        Ok(())
    }

    async fn get_attribute(&self, locator: &Locator, name: &str) -> HallarResult<Option<String>> {
        Ok(self.state().element(locator)?.attributes.get(name).cloned())
    }

    async fn input_value(&self, locator: &Locator) -> HallarResult<String> {
        Ok(self.state().element(locator)?.value.clone())
    }

    async fn text_content(&self, locator: &Locator) -> HallarResult<Option<String>> {
        Ok(Some(self.state().element(locator)?.text.clone()))
    }

    async fn select_options(&self, locator: &Locator) -> HallarResult<Vec<SelectOption>> {
        Ok(self.state().element(locator)?.options.clone())
    }

    async fn wait_for_timeout(&self, duration: Duration) {
        self.record(format!("wait_for_timeout:{}ms", duration.as_millis()));
    }

    async fn screenshot(&self) -> HallarResult<Vec<u8>> {
        self.record("screenshot".to_string());
        Ok(vec![0x89, 0x50, 0x4E, 0x47])
    }
}
