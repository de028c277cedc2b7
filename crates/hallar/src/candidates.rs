//! Candidate Generator
//!
//! Turns a field descriptor into the ordered list of locator candidates the
//! resolver walks. Declared candidates always come first, in declared
//! order. Generic fallbacks for the field's kind follow, most specific
//! first, skipping any that duplicate a declared candidate.

use crate::config::LocatorConfig;
use crate::field::{FieldKind, FieldSpec};
use crate::locator::{LocatorCandidate, Selector};

const COMBOBOX_TRIGGER: &str = "button[role=\"combobox\"]";
const FILE_INPUT: &str = "input[type=\"file\"]";

/// Produces candidate chains for fields
#[derive(Debug, Clone, Default)]
pub struct CandidateGenerator {
    config: LocatorConfig,
}

impl CandidateGenerator {
    /// Create a generator using `config` timeouts
    #[must_use]
    pub const fn new(config: LocatorConfig) -> Self {
        Self { config }
    }

    /// Ordered candidates for `field`.
    ///
    /// `current_hint` overrides the field's declared `current_value` as the
    /// text a combobox is expected to display. The result may be empty for
    /// kinds without generic fallbacks; the resolver reports that as a
    /// configuration error.
    #[must_use]
    pub fn generate(&self, field: &FieldSpec, current_hint: Option<&str>) -> Vec<LocatorCandidate> {
        let hint = current_hint.or(field.current_value.as_deref());
        let mut out = field.candidates.clone();

        let mut fallbacks = self.fallbacks(&field.kind, hint);
        fallbacks.sort_by_key(|c| c.effective_selector().specificity());
        for cand in fallbacks {
            let effective = cand.effective_selector();
            if !out.iter().any(|c| c.effective_selector() == effective) {
                out.push(cand);
            }
        }
        out
    }

    fn fallbacks(&self, kind: &FieldKind, hint: Option<&str>) -> Vec<LocatorCandidate> {
        let timeout = self.config.default_timeout_ms;
        match kind {
            FieldKind::Combobox { .. } => {
                let trigger = LocatorCandidate::css(COMBOBOX_TRIGGER)
                    .with_timeout(self.config.combobox_timeout_ms);
                let mut out = Vec::with_capacity(3);
                if let Some(current) = hint {
                    out.push(trigger.clone().with_context(current));
                }
                out.push(trigger);
                out.push(
                    LocatorCandidate::new(Selector::role("combobox", None)).with_timeout(timeout),
                );
                out
            }
            FieldKind::HiddenSelect { .. } => vec![LocatorCandidate::css(
                self.config.hidden_select_selector.clone(),
            )
            .with_timeout(timeout)],
            FieldKind::FileDropzone { .. } => vec![
                LocatorCandidate::css("input[type=\"file\"][accept=\"image/*\"]").with_timeout(timeout),
                LocatorCandidate::css(FILE_INPUT).with_timeout(timeout),
            ],
            FieldKind::TextInput | FieldKind::SearchDropdown { .. } => Vec::new(),
        }
    }
}
