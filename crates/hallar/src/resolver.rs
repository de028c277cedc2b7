//! Resolver: walks a candidate chain against the live page.
//!
//! Candidates are attempted strictly in order, one at a time. The first one
//! whose element reaches the required state within its own bound wins and
//! nothing after it is touched. Timeouts and driver errors on a candidate
//! are logged and skipped. The resolver never mutates the page.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::driver::PageDriver;
use crate::locator::{ElementState, Locator, LocatorCandidate};
use crate::result::{HallarError, HallarResult};

/// What happened to one candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// Element reached the required state
    Matched,
    /// Element did not reach the required state in time
    TimedOut,
    /// Driver failed while checking the candidate
    Errored(String),
}

/// Record of one candidate attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attempt {
    /// Position in the candidate list
    pub index: usize,
    /// Selector as attempted
    pub selector: String,
    /// Result of the attempt
    pub outcome: AttemptOutcome,
}

/// Outcome of resolving one field
#[derive(Debug)]
pub struct ResolutionResult {
    /// Whether a candidate matched
    pub success: bool,
    /// Index of the winning candidate
    pub matched_candidate_index: Option<usize>,
    /// Locator for the winning candidate's element
    pub locator: Option<Locator>,
    /// Diagnostic when no candidate matched
    pub error: Option<HallarError>,
    /// Every attempt, in order
    pub attempts: Vec<Attempt>,
}

impl ResolutionResult {
    fn matched(index: usize, locator: Locator, attempts: Vec<Attempt>) -> Self {
        Self {
            success: true,
            matched_candidate_index: Some(index),
            locator: Some(locator),
            error: None,
            attempts,
        }
    }

    fn failed(error: HallarError, attempts: Vec<Attempt>) -> Self {
        Self {
            success: false,
            matched_candidate_index: None,
            locator: None,
            error: Some(error),
            attempts,
        }
    }

    /// Selector of the winning candidate
    #[must_use]
    pub fn matched_selector(&self) -> Option<&str> {
        let index = self.matched_candidate_index?;
        self.attempts
            .iter()
            .find(|a| a.index == index)
            .map(|a| a.selector.as_str())
    }

    /// Convert into the winning index and locator, or the diagnostic
    pub fn into_match(self) -> HallarResult<(usize, Locator)> {
        match (self.matched_candidate_index, self.locator, self.error) {
            (Some(index), Some(locator), _) => Ok((index, locator)),
            (_, _, Some(err)) => Err(err),
            _ => Err(HallarError::driver("resolution produced neither a match nor an error")),
        }
    }
}

/// Walks candidate chains through a [`PageDriver`]
#[derive(Debug)]
pub struct Resolver<'a, D: PageDriver + ?Sized> {
    driver: &'a D,
}

impl<'a, D: PageDriver + ?Sized> Resolver<'a, D> {
    /// Create a resolver over `driver`
    #[must_use]
    pub const fn new(driver: &'a D) -> Self {
        Self { driver }
    }

    /// Attempt `candidates` in order until one reaches `state`.
    ///
    /// An empty chain fails immediately with a configuration error.
    pub async fn resolve(
        &self,
        field: &str,
        candidates: &[LocatorCandidate],
        state: ElementState,
    ) -> ResolutionResult {
        if candidates.is_empty() {
            warn!(field, "field has no locator candidates");
            return ResolutionResult::failed(
                HallarError::config(field, "no locator candidates declared"),
                Vec::new(),
            );
        }

        let mut attempts = Vec::with_capacity(candidates.len());
        for (index, candidate) in candidates.iter().enumerate() {
            let locator = candidate.locator();
            let selector = locator.selector().to_string();
            let outcome = match self
                .driver
                .wait_for(&locator, state, candidate.timeout())
                .await
            {
                Ok(true) => AttemptOutcome::Matched,
                Ok(false) => {
                    let miss = HallarError::CandidateTimeout {
                        field: field.to_string(),
                        selector: selector.clone(),
                        ms: candidate.timeout_ms,
                    };
                    debug!(field, candidate = index, selector = %selector, outcome = "timed_out", "{miss}");
                    AttemptOutcome::TimedOut
                }
                Err(err) => {
                    debug!(field, candidate = index, selector = %selector, outcome = "errored", error = %err, "candidate lookup failed");
                    AttemptOutcome::Errored(err.to_string())
                }
            };

            let hit = outcome == AttemptOutcome::Matched;
            attempts.push(Attempt {
                index,
                selector,
                outcome,
            });
            if hit {
                info!(field, candidate = index, selector = %locator, outcome = "matched", "field resolved");
                return ResolutionResult::matched(index, locator, attempts);
            }
        }

        let attempted: Vec<String> = attempts.iter().map(|a| a.selector.clone()).collect();
        warn!(field, tried = attempted.len(), "no candidate matched");
        ResolutionResult::failed(
            HallarError::NoMatchingCandidate {
                field: field.to_string(),
                attempted,
            },
            attempts,
        )
    }
}
