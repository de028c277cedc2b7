//! Selector expressions and locator candidates.
//!
//! A [`Selector`] describes how to find a control: a CSS query, a test id,
//! a text matcher or a role matcher. A [`LocatorCandidate`] is one strategy
//! in a field's fallback chain: a selector, the time the resolver may wait
//! for it, and optionally the value the control is expected to display
//! (used to pick one combobox among several identical ones).
//!
//! Selectors parse from and print to a Playwright-like string form, so the
//! same text appears in catalogs, diagnostics and log events.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::result::HallarError;

/// Default time a candidate may take to become actionable (1 second)
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;

/// Default polling interval while waiting on a candidate (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

const HAS_TEXT: &str = ":has-text(";

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Selector {
    /// CSS selector (e.g., `input[name="area"]`)
    Css(String),
    /// Test ID selector (data-testid attribute)
    TestId(String),
    /// CSS selector filtered by contained text
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Text content to match
        text: String,
    },
    /// Any element whose text content contains the string
    Text(String),
    /// ARIA role selector, optionally filtered by text
    Role {
        /// ARIA role (e.g. "combobox")
        role: String,
        /// Text the element must contain
        name: Option<String>,
    },
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a test ID selector
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId(id.into())
    }

    /// Create a text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create a role selector
    #[must_use]
    pub fn role(role: impl Into<String>, name: Option<String>) -> Self {
        Self::Role {
            role: role.into(),
            name,
        }
    }

    /// Narrow this selector to elements containing `text`.
    ///
    /// CSS and role selectors gain a text filter; test ids and text
    /// selectors are returned unchanged since they already identify one
    /// element.
    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        match self {
            Self::Css(css) => Self::CssWithText {
                css,
                text: text.into(),
            },
            Self::Role { role, .. } => Self::Role {
                role,
                name: Some(text.into()),
            },
            other => other,
        }
    }

    /// Reliability rank, lower is more specific.
    ///
    /// Test ids rank first, then attribute-addressed or text-filtered CSS,
    /// then structural CSS, role matchers and free text.
    #[must_use]
    pub fn specificity(&self) -> u8 {
        match self {
            Self::TestId(_) => 0,
            Self::Css(css) if css.contains("data-testid") => 0,
            Self::Css(css)
                if css.starts_with('#')
                    || css.contains("[name=")
                    || css.contains("[aria-label=") =>
            {
                1
            }
            Self::CssWithText { .. } => 1,
            Self::Css(_) => 2,
            Self::Role { .. } => 3,
            Self::Text(_) => 4,
        }
    }

    /// JavaScript expression evaluating to the array of all matches
    #[must_use]
    pub fn to_all_query(&self) -> String {
        match self {
            Self::Css(s) => format!("Array.from(document.querySelectorAll({s:?}))"),
            Self::TestId(id) => {
                let css = format!("[data-testid={id:?}]");
                format!("Array.from(document.querySelectorAll({css:?}))")
            }
            Self::CssWithText { css, text } => format!(
                "Array.from(document.querySelectorAll({css:?})).filter(el => (el.textContent || '').includes({text:?}))"
            ),
            Self::Text(t) => format!(
                "Array.from(document.querySelectorAll('body *')).filter(el => (el.textContent || '').includes({t:?}) && !Array.from(el.children).some(c => (c.textContent || '').includes({t:?})))"
            ),
            Self::Role { role, name } => {
                let css = format!("[role={role:?}]");
                match name {
                    Some(n) => format!(
                        "Array.from(document.querySelectorAll({css:?})).filter(el => (el.textContent || '').includes({n:?}))"
                    ),
                    None => format!("Array.from(document.querySelectorAll({css:?}))"),
                }
            }
        }
    }

    /// JavaScript expression evaluating to the match at `nth` (or null)
    #[must_use]
    pub fn to_query(&self, nth: usize) -> String {
        format!("(({})[{nth}] || null)", self.to_all_query())
    }

    /// JavaScript expression counting matches
    #[must_use]
    pub fn to_count_query(&self) -> String {
        format!("({}).length", self.to_all_query())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => f.write_str(s),
            Self::TestId(id) => write!(f, "[data-testid=\"{id}\"]"),
            Self::CssWithText { css, text } => write!(f, "{css}:has-text(\"{text}\")"),
            Self::Text(t) => write!(f, "text={t}"),
            Self::Role { role, name: None } => write!(f, "role={role}"),
            Self::Role {
                role,
                name: Some(n),
            } => write!(f, "role={role}[name=\"{n}\"]"),
        }
    }
}

impl FromStr for Selector {
    type Err = HallarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(HallarError::config("", "empty selector expression"));
        }
        if let Some(id) = s
            .strip_prefix("data-testid=")
            .or_else(|| s.strip_prefix("testid="))
        {
            return Ok(Self::TestId(unquote(id).to_string()));
        }
        if let Some(text) = s.strip_prefix("text=") {
            return Ok(Self::Text(unquote(text).to_string()));
        }
        if let Some(rest) = s.strip_prefix("role=") {
            return Ok(parse_role(rest));
        }
        if let Some(pos) = s.find(HAS_TEXT) {
            if let Some(inner) = s[pos + HAS_TEXT.len()..].strip_suffix(')') {
                return Ok(Self::CssWithText {
                    css: s[..pos].to_string(),
                    text: unquote(inner).to_string(),
                });
            }
        }
        Ok(Self::Css(s.to_string()))
    }
}

impl TryFrom<String> for Selector {
    type Error = HallarError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Selector> for String {
    fn from(selector: Selector) -> Self {
        selector.to_string()
    }
}

fn parse_role(rest: &str) -> Selector {
    match rest.split_once("[name=") {
        Some((role, name)) => {
            let name = name.strip_suffix(']').unwrap_or(name);
            Selector::Role {
                role: role.to_string(),
                name: Some(unquote(name).to_string()),
            }
        }
        None => Selector::Role {
            role: rest.to_string(),
            name: None,
        },
    }
}

fn unquote(s: &str) -> &str {
    let s = s.trim();
    for q in ['"', '\''] {
        if let Some(inner) = s.strip_prefix(q).and_then(|r| r.strip_suffix(q)) {
            return inner;
        }
    }
    s
}

/// Element state a wait targets (Playwright parity)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementState {
    /// Present in the DOM, visible or not (hidden selects, file inputs)
    Attached,
    /// Present and rendered with a non-empty box
    #[default]
    Visible,
}

/// A selector bound to one match among possibly many.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    selector: Selector,
    nth: usize,
}

impl Locator {
    /// Create a locator addressing the first match of a CSS selector
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self::from_selector(Selector::Css(selector.into()))
    }

    /// Create a locator addressing the first match of `selector`
    #[must_use]
    pub const fn from_selector(selector: Selector) -> Self {
        Self { selector, nth: 0 }
    }

    /// Address the match at `index`
    #[must_use]
    pub const fn nth(mut self, index: usize) -> Self {
        self.nth = index;
        self
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Index of the addressed match
    #[must_use]
    pub const fn index(&self) -> usize {
        self.nth
    }

    /// JavaScript expression evaluating to the addressed element
    #[must_use]
    pub fn to_query(&self) -> String {
        self.selector.to_query(self.nth)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nth == 0 {
            write!(f, "{}", self.selector)
        } else {
            write!(f, "{} >> nth={}", self.selector, self.nth)
        }
    }
}

impl From<Selector> for Locator {
    fn from(selector: Selector) -> Self {
        Self::from_selector(selector)
    }
}

/// One strategy for finding a field's control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CandidateRepr")]
pub struct LocatorCandidate {
    /// How to find the element
    pub selector: Selector,
    /// How long the resolver may wait for it
    pub timeout_ms: u64,
    /// Value the control is expected to display already
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_value: Option<String>,
}

/// Catalogs may list a candidate as a bare selector string or as a map.
#[derive(Deserialize)]
#[serde(untagged)]
enum CandidateRepr {
    Bare(Selector),
    Full {
        selector: Selector,
        #[serde(default = "default_timeout_ms")]
        timeout_ms: u64,
        #[serde(default)]
        context_value: Option<String>,
    },
}

const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl From<CandidateRepr> for LocatorCandidate {
    fn from(repr: CandidateRepr) -> Self {
        match repr {
            CandidateRepr::Bare(selector) => Self::new(selector),
            CandidateRepr::Full {
                selector,
                timeout_ms,
                context_value,
            } => Self {
                selector,
                timeout_ms,
                context_value,
            },
        }
    }
}

impl LocatorCandidate {
    /// Create a candidate with the default timeout
    #[must_use]
    pub const fn new(selector: Selector) -> Self {
        Self {
            selector,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            context_value: None,
        }
    }

    /// Create a candidate from a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::new(Selector::css(selector))
    }

    /// Set the wait bound
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Require the control to currently display `value`
    #[must_use]
    pub fn with_context(mut self, value: impl Into<String>) -> Self {
        self.context_value = Some(value.into());
        self
    }

    /// Wait bound as a Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Effective selector with the context filter applied
    #[must_use]
    pub fn effective_selector(&self) -> Selector {
        match &self.context_value {
            Some(value) => self.selector.clone().with_text(value.clone()),
            None => self.selector.clone(),
        }
    }

    /// Locator addressing the first element this candidate matches
    #[must_use]
    pub fn locator(&self) -> Locator {
        Locator::from_selector(self.effective_selector())
    }
}

impl fmt::Display for LocatorCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.effective_selector())
    }
}
