//! Action Executor: drives a resolved control to the requested value.
//!
//! Each field kind has its own interaction. Every one of them first checks
//! whether the control already shows the target and, if so, performs no
//! mutating call at all.

use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::LocatorConfig;
use crate::driver::PageDriver;
use crate::field::{FieldKind, FieldSpec, UploadSpec};
use crate::hidden::HiddenSelectFinder;
use crate::locator::{Locator, Selector};
use crate::result::{HallarError, HallarResult};
use crate::value_map::MappedValue;

/// Effect of a successful action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionEffect {
    /// The page was changed
    Applied,
    /// The control already held the target; nothing was touched
    AlreadySet,
}

/// Preview count after an upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadReport {
    /// Previews expected
    pub expected: usize,
    /// Previews observed by the best strategy
    pub observed: usize,
    /// Missing previews (never negative)
    pub shortfall: usize,
    /// Preview selector that observed the most previews
    pub selector: String,
}

impl UploadReport {
    /// Whether every expected preview rendered
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.shortfall == 0
    }
}

/// Performs field interactions through a [`PageDriver`]
#[derive(Debug)]
pub struct ActionExecutor<'a, D: PageDriver + ?Sized> {
    driver: &'a D,
    config: &'a LocatorConfig,
}

impl<'a, D: PageDriver + ?Sized> ActionExecutor<'a, D> {
    /// Create an executor
    #[must_use]
    pub const fn new(driver: &'a D, config: &'a LocatorConfig) -> Self {
        Self { driver, config }
    }

    /// Set `field`, whose control was resolved to `target`, to `mapped`.
    ///
    /// Configuration and disambiguation errors pass through unchanged;
    /// everything else becomes [`HallarError::ActionFailed`].
    pub async fn apply(
        &self,
        field: &FieldSpec,
        target: &Locator,
        mapped: &MappedValue,
    ) -> HallarResult<ActionEffect> {
        let result = match &field.kind {
            FieldKind::TextInput => self.fill_text(target, &mapped.value).await,
            FieldKind::Combobox { option_selectors } => {
                self.choose_option(&field.name, target, mapped, option_selectors)
                    .await
            }
            FieldKind::SearchDropdown {
                search_input,
                option_selectors,
                search_settle_ms,
            } => {
                let settle = search_settle_ms.unwrap_or(self.config.search_settle_ms);
                self.search_and_pick(target, mapped, search_input, option_selectors, settle)
                    .await
            }
            FieldKind::HiddenSelect { option_matchers } => {
                self.set_hidden(&field.name, target, mapped, option_matchers)
                    .await
            }
            FieldKind::FileDropzone { .. } => Err(HallarError::config(
                &field.name,
                "file dropzones take files, not a value; use an upload",
            )),
        };

        let effect = result.map_err(|e| wrap(&field.name, &mapped.search_text, e))?;
        match effect {
            ActionEffect::Applied => {
                info!(field = %field.name, kind = field.kind.name(), value = %mapped.value, "field set");
            }
            ActionEffect::AlreadySet => {
                info!(field = %field.name, kind = field.kind.name(), value = %mapped.value, "field already set");
            }
        }
        Ok(effect)
    }

    /// Attach `spec.files` to the resolved file input and count previews
    pub async fn upload(&self, spec: &UploadSpec, target: &Locator) -> HallarResult<UploadReport> {
        let value = spec
            .files
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        self.attach_and_count(spec, target)
            .await
            .map_err(|e| wrap(&spec.field.name, &value, e))
    }

    async fn fill_text(&self, target: &Locator, value: &str) -> HallarResult<ActionEffect> {
        if self.driver.input_value(target).await? == value {
            return Ok(ActionEffect::AlreadySet);
        }
        self.driver.clear(target).await?;
        self.driver.fill(target, value).await?;
        Ok(ActionEffect::Applied)
    }

    async fn choose_option(
        &self,
        field: &str,
        trigger: &Locator,
        mapped: &MappedValue,
        option_selectors: &[Selector],
    ) -> HallarResult<ActionEffect> {
        if self.shows(trigger, &mapped.search_text).await? {
            return Ok(ActionEffect::AlreadySet);
        }
        self.driver.click(trigger).await?;
        self.driver
            .wait_for_timeout(self.config.option_render())
            .await;

        let mut texts = vec![mapped.search_text.as_str()];
        if mapped.value != mapped.search_text {
            texts.push(mapped.value.as_str());
        }
        let mut tried = Vec::new();
        for text in texts {
            for base in option_selectors {
                let option = Locator::from_selector(base.clone().with_text(text));
                if self.visible(&option, self.config.option_timeout()).await {
                    debug!(field, option = %option, "clicking option");
                    self.driver.click(&option).await?;
                    return Ok(ActionEffect::Applied);
                }
                tried.push(option.to_string());
            }
        }
        Err(HallarError::driver(format!(
            "no option matching '{}' rendered; tried [{}]",
            mapped.search_text,
            tried.join(", ")
        )))
    }

    async fn search_and_pick(
        &self,
        trigger: &Locator,
        mapped: &MappedValue,
        search_input: &Selector,
        option_selectors: &[Selector],
        settle_ms: u64,
    ) -> HallarResult<ActionEffect> {
        if self.shows(trigger, &mapped.search_text).await? {
            return Ok(ActionEffect::AlreadySet);
        }

        let input = Locator::from_selector(search_input.clone());
        if !self.visible(&input, Duration::ZERO).await {
            self.driver.click(trigger).await?;
            if !self
                .driver
                .wait_for_selector(&input, self.config.option_timeout())
                .await?
            {
                return Err(HallarError::driver(format!(
                    "search input {input} did not appear after opening the dropdown"
                )));
            }
        }
        self.driver.fill(&input, &mapped.search_text).await?;
        self.driver
            .wait_for_timeout(Duration::from_millis(settle_ms))
            .await;

        let mut tried = Vec::with_capacity(option_selectors.len());
        let mut counted = 0;
        for selector in option_selectors {
            let results = Locator::from_selector(selector.clone());
            let found = self.driver.count(&results).await.unwrap_or(0);
            counted += found;
            tried.push(selector.to_string());
            if found == 0 {
                continue;
            }
            if self.visible(&results, self.config.option_timeout()).await {
                self.driver.click(&results).await?;
                return Ok(ActionEffect::Applied);
            }
        }
        Err(HallarError::driver(format!(
            "no search result for '{}'; tried [{}], {counted} option elements counted",
            mapped.search_text,
            tried.join(", ")
        )))
    }

    async fn set_hidden(
        &self,
        field: &str,
        target: &Locator,
        mapped: &MappedValue,
        matchers: &[String],
    ) -> HallarResult<ActionEffect> {
        let control = HiddenSelectFinder::new(self.driver)
            .find(field, target.selector(), matchers)
            .await?;
        let current = self.driver.input_value(&control.locator).await?;
        if current == mapped.value {
            return Ok(ActionEffect::AlreadySet);
        }
        if !control.offers(&mapped.value) {
            debug!(field, value = %mapped.value, "value not among option values, selecting by label");
        }
        self.driver
            .select_option(&control.locator, &mapped.value)
            .await?;
        self.driver
            .wait_for_timeout(self.config.dependent_settle())
            .await;
        Ok(ActionEffect::Applied)
    }

    async fn attach_and_count(&self, spec: &UploadSpec, target: &Locator) -> HallarResult<UploadReport> {
        let FieldKind::FileDropzone {
            preview_selectors,
            upload_timeout_ms,
        } = &spec.field.kind
        else {
            return Err(HallarError::config(
                &spec.field.name,
                format!("upload needs a file_dropzone field, got {}", spec.field.kind.name()),
            ));
        };
        let timeout_ms = upload_timeout_ms.unwrap_or(self.config.upload_timeout_ms);
        let poll_ms = self.config.preview_poll_ms.max(1);

        self.driver.set_input_files(target, &spec.files).await?;

        let mut waited = 0;
        let (observed, selector) = loop {
            let best = self.best_preview_count(preview_selectors).await;
            if best.0 >= spec.min_previews || waited >= timeout_ms {
                break best;
            }
            self.driver
                .wait_for_timeout(Duration::from_millis(poll_ms))
                .await;
            waited += poll_ms;
        };

        if observed == 0 {
            let tried: Vec<String> = preview_selectors.iter().map(ToString::to_string).collect();
            return Err(HallarError::driver(format!(
                "no upload preview rendered within {timeout_ms}ms; tried [{}]",
                tried.join(", ")
            )));
        }

        let shortfall = spec.min_previews.saturating_sub(observed);
        if shortfall > 0 {
            warn!(
                field = %spec.field.name,
                expected = spec.min_previews,
                observed,
                shortfall,
                "fewer upload previews than files"
            );
        } else {
            info!(field = %spec.field.name, observed, "upload previews rendered");
        }
        Ok(UploadReport {
            expected: spec.min_previews,
            observed,
            shortfall,
            selector,
        })
    }

    async fn best_preview_count(&self, selectors: &[Selector]) -> (usize, String) {
        let mut best = (0, String::new());
        for selector in selectors {
            let found = self
                .driver
                .count(&Locator::from_selector(selector.clone()))
                .await
                .unwrap_or(0);
            if found > best.0 || best.1.is_empty() {
                best = (found.max(best.0), selector.to_string());
            }
        }
        best
    }

    /// Whether the trigger displays exactly `text`
    async fn shows(&self, trigger: &Locator, text: &str) -> HallarResult<bool> {
        let shown = self.driver.text_content(trigger).await?.unwrap_or_default();
        let text = text.trim();
        Ok(!text.is_empty() && shown.trim() == text)
    }

    async fn visible(&self, locator: &Locator, timeout: Duration) -> bool {
        self.driver
            .is_visible(locator, timeout)
            .await
            .unwrap_or(false)
    }
}

fn wrap(field: &str, value: &str, err: HallarError) -> HallarError {
    match err {
        HallarError::ConfigurationError { .. }
        | HallarError::AmbiguousHiddenControl { .. }
        | HallarError::ActionFailed { .. } => err,
        HallarError::Driver { message } => HallarError::action(field, value, message),
        other => HallarError::action(field, value, other.to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{MockElement, MockPage};
    use crate::value_map::ValueMap;

    const COMBO: &str = "button[role=\"combobox\"]";
    const HIDDEN: &str = "select[aria-hidden=\"true\"]";

    fn loc(s: &str) -> Locator {
        Locator::from_selector(s.parse().unwrap())
    }

    fn verbatim(label: &str) -> MappedValue {
        ValueMap::new().resolve(label)
    }

    mod text_input_tests {
        use super::*;

        #[tokio::test]
        async fn test_writes_value() {
            let page = MockPage::new().with_element("input[name=\"price_in_vnd\"]", MockElement::visible());
            let config = LocatorConfig::default();
            let field = FieldSpec::text_input("Giá bán");
            let effect = ActionExecutor::new(&page, &config)
                .apply(&field, &loc("input[name=\"price_in_vnd\"]"), &verbatim("2000000000"))
                .await
                .unwrap();
            assert_eq!(effect, ActionEffect::Applied);
            assert_eq!(page.value_of("input[name=\"price_in_vnd\"]").as_deref(), Some("2000000000"));
            assert!(page.was_called("clear:"));
        }

        #[tokio::test]
        async fn test_same_value_is_noop() {
            let page = MockPage::new()
                .with_element("textarea[name=\"title\"]", MockElement::visible().with_value("Căn hộ 2PN"));
            let config = LocatorConfig::default();
            let effect = ActionExecutor::new(&page, &config)
                .apply(&FieldSpec::text_input("Tiêu đề"), &loc("textarea[name=\"title\"]"), &verbatim("Căn hộ 2PN"))
                .await
                .unwrap();
            assert_eq!(effect, ActionEffect::AlreadySet);
            assert!(page.mutations().is_empty());
        }

        #[tokio::test]
        async fn test_stale_element_becomes_action_failed() {
            let page = MockPage::new().with_element("#area", MockElement::broken());
            let config = LocatorConfig::default();
            let err = ActionExecutor::new(&page, &config)
                .apply(&FieldSpec::text_input("Diện tích"), &loc("#area"), &verbatim("85"))
                .await
                .unwrap_err();
            match err {
                HallarError::ActionFailed { field, value, .. } => {
                    assert_eq!(field, "Diện tích");
                    assert_eq!(value, "85");
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    mod combobox_tests {
        use super::*;

        fn demand() -> FieldSpec {
            FieldSpec::combobox("Nhu cầu")
                .with_value_map(ValueMap::from_pairs([("Bán", "sell"), ("Cho thuê", "rent")]).unwrap())
        }

        #[tokio::test]
        async fn test_clicks_option_by_label() {
            let page = MockPage::new()
                .with_element(COMBO, MockElement::visible().with_text("Bán"))
                .on_click(COMBO, [("[role=\"option\"]", MockElement::visible().with_text("Cho thuê"))]);
            let config = LocatorConfig::default();
            let field = demand();
            let mapped = field.map_label("Cho thuê").unwrap();
            let effect = ActionExecutor::new(&page, &config)
                .apply(&field, &loc(COMBO), &mapped)
                .await
                .unwrap();
            assert_eq!(effect, ActionEffect::Applied);
            assert!(page.was_called("wait_for_timeout:500ms"));
            assert!(page.was_called("click:[role=\"option\"]:has-text(\"Cho thuê\")"));
        }

        #[tokio::test]
        async fn test_already_displayed_is_noop() {
            let page = MockPage::new().with_element(COMBO, MockElement::visible().with_text("Bán"));
            let config = LocatorConfig::default();
            let field = demand();
            let effect = ActionExecutor::new(&page, &config)
                .apply(&field, &loc(COMBO), &field.map_label("Bán").unwrap())
                .await
                .unwrap();
            assert_eq!(effect, ActionEffect::AlreadySet);
            assert!(page.mutations().is_empty());
        }

        fn property_type() -> FieldSpec {
            FieldSpec::combobox("Loại bất động sản").with_value_map(
                ValueMap::from_pairs([("Đất", "dat"), ("Đất nền dự án", "dat_nen_du_an")]).unwrap(),
            )
        }

        #[tokio::test]
        async fn test_shorter_label_inside_displayed_text_is_chosen() {
            let page = MockPage::new()
                .with_element(COMBO, MockElement::visible().with_text("Đất nền dự án"))
                .on_click(COMBO, [("[role=\"option\"]", MockElement::visible().with_text("Đất"))]);
            let config = LocatorConfig::default();
            let field = property_type();
            let effect = ActionExecutor::new(&page, &config)
                .apply(&field, &loc(COMBO), &field.map_label("Đất").unwrap())
                .await
                .unwrap();
            assert_eq!(effect, ActionEffect::Applied);
            assert!(page.was_called(&format!("click:{COMBO}")));
            assert!(page.was_called("click:[role=\"option\"]:has-text(\"Đất\")"));
        }

        #[tokio::test]
        async fn test_padded_trigger_text_counts_as_displayed() {
            let page = MockPage::new().with_element(COMBO, MockElement::visible().with_text("  Đất \n"));
            let config = LocatorConfig::default();
            let field = property_type();
            let effect = ActionExecutor::new(&page, &config)
                .apply(&field, &loc(COMBO), &field.map_label("Đất").unwrap())
                .await
                .unwrap();
            assert_eq!(effect, ActionEffect::AlreadySet);
            assert!(page.mutations().is_empty());
        }

        #[tokio::test]
        async fn test_falls_back_to_mapped_value() {
            let page = MockPage::new()
                .with_element(COMBO, MockElement::visible().with_text("Bán"))
                .on_click(COMBO, [("[data-value]", MockElement::visible().with_text("rent"))]);
            let config = LocatorConfig::default();
            let field = demand();
            ActionExecutor::new(&page, &config)
                .apply(&field, &loc(COMBO), &field.map_label("Cho thuê").unwrap())
                .await
                .unwrap();
            assert!(page.was_called("click:[data-value]:has-text(\"rent\")"));
        }

        #[tokio::test]
        async fn test_missing_option_lists_attempts() {
            let page = MockPage::new().with_element(COMBO, MockElement::visible().with_text("Bán"));
            let config = LocatorConfig::default();
            let field = demand();
            let err = ActionExecutor::new(&page, &config)
                .apply(&field, &loc(COMBO), &field.map_label("Cho thuê").unwrap())
                .await
                .unwrap_err();
            let msg = err.to_string();
            assert!(msg.contains("[role=\"option\"]:has-text(\"Cho thuê\")"));
            assert!(msg.contains("[data-value]:has-text(\"rent\")"));
        }
    }

    mod search_dropdown_tests {
        use super::*;

        const TRIGGER: &str = "button[aria-label=\"Tìm nhanh dự án\"]";
        const SEARCH: &str = "input[placeholder=\"Tìm dự án\"]";

        fn project() -> FieldSpec {
            FieldSpec::search_dropdown("Dự án", Selector::css(SEARCH))
        }

        #[tokio::test]
        async fn test_opens_searches_and_picks_first() {
            let page = MockPage::new()
                .with_element(TRIGGER, MockElement::visible())
                .on_click(TRIGGER, [(SEARCH, MockElement::visible())])
                .on_fill(
                    SEARCH,
                    [
                        ("[cmdk-item]", MockElement::visible().with_text("Sunrise City")),
                        ("[cmdk-item]", MockElement::visible().with_text("Sunrise Riverside")),
                    ],
                );
            let config = LocatorConfig::default();
            let effect = ActionExecutor::new(&page, &config)
                .apply(&project(), &loc(TRIGGER), &verbatim("Sunrise"))
                .await
                .unwrap();
            assert_eq!(effect, ActionEffect::Applied);
            assert!(page.was_called(&format!("fill:{SEARCH}:Sunrise")));
            assert!(page.was_called("wait_for_timeout:1500ms"));
            assert!(page.was_called("click:[cmdk-item]"));
        }

        #[tokio::test]
        async fn test_open_dropdown_is_not_clicked_again() {
            let page = MockPage::new()
                .with_element(TRIGGER, MockElement::visible())
                .with_element(SEARCH, MockElement::visible())
                .on_fill(SEARCH, [("[role=\"option\"]", MockElement::visible().with_text("Vinhomes"))]);
            let config = LocatorConfig::default();
            ActionExecutor::new(&page, &config)
                .apply(&project(), &loc(TRIGGER), &verbatim("Vinhomes"))
                .await
                .unwrap();
            assert!(!page.was_called(&format!("click:{TRIGGER}")));
            assert!(!page.was_called("click:[cmdk-list]"));
            assert!(page.was_called("click:[role=\"option\"]"));
        }

        #[tokio::test]
        async fn test_trigger_showing_longer_name_is_searched() {
            let page = MockPage::new()
                .with_element(TRIGGER, MockElement::visible().with_text("Sunrise City"))
                .on_click(TRIGGER, [(SEARCH, MockElement::visible())])
                .on_fill(SEARCH, [("[cmdk-item]", MockElement::visible().with_text("Sunrise"))]);
            let config = LocatorConfig::default();
            let effect = ActionExecutor::new(&page, &config)
                .apply(&project(), &loc(TRIGGER), &verbatim("Sunrise"))
                .await
                .unwrap();
            assert_eq!(effect, ActionEffect::Applied);
            assert!(page.was_called(&format!("fill:{SEARCH}:Sunrise")));
        }

        #[tokio::test]
        async fn test_trigger_showing_exact_name_is_noop() {
            let page = MockPage::new().with_element(TRIGGER, MockElement::visible().with_text("Sunrise City"));
            let config = LocatorConfig::default();
            let effect = ActionExecutor::new(&page, &config)
                .apply(&project(), &loc(TRIGGER), &verbatim("Sunrise City"))
                .await
                .unwrap();
            assert_eq!(effect, ActionEffect::AlreadySet);
            assert!(page.mutations().is_empty());
        }

        #[tokio::test]
        async fn test_zero_results_lists_every_selector() {
            let page = MockPage::new()
                .with_element(TRIGGER, MockElement::visible())
                .on_click(TRIGGER, [(SEARCH, MockElement::visible())]);
            let config = LocatorConfig::default();
            let err = ActionExecutor::new(&page, &config)
                .apply(&project(), &loc(TRIGGER), &verbatim("Sunrise"))
                .await
                .unwrap_err();
            let HallarError::ActionFailed { field, value, reason } = err else {
                panic!("expected ActionFailed");
            };
            assert_eq!(field, "Dự án");
            assert_eq!(value, "Sunrise");
            for selector in ["[cmdk-item]", "[cmdk-list] [role=\"option\"]", "[role=\"option\"]", "[data-value]"] {
                assert!(reason.contains(selector), "{selector} missing from {reason}");
            }
            assert!(reason.contains("0 option elements counted"));
        }

        #[tokio::test]
        async fn test_custom_settle_time() {
            let mut field = project();
            if let FieldKind::SearchDropdown { search_settle_ms, .. } = &mut field.kind {
                *search_settle_ms = Some(200);
            }
            let page = MockPage::new()
                .with_element(TRIGGER, MockElement::visible())
                .with_element(SEARCH, MockElement::visible())
                .on_fill(SEARCH, [("[cmdk-item]", MockElement::visible())]);
            let config = LocatorConfig::default();
            ActionExecutor::new(&page, &config)
                .apply(&field, &loc(TRIGGER), &verbatim("Sun"))
                .await
                .unwrap();
            assert!(page.was_called("wait_for_timeout:200ms"));
        }
    }

    mod hidden_select_tests {
        use super::*;

        fn furniture() -> FieldSpec {
            FieldSpec::hidden_select("Nội thất", ["thất", "furniture"]).with_value_map(
                ValueMap::from_pairs([
                    ("Đầy đủ", "full_furniture"),
                    ("Cơ bản", "basic_furniture"),
                    ("Thô", "unfinished_furniture"),
                ])
                .unwrap(),
            )
        }

        fn page(current: &str) -> MockPage {
            MockPage::new()
                .with_element(HIDDEN, MockElement::hidden().with_options([("sell", "Bán"), ("rent", "Cho thuê")]))
                .with_element(
                    HIDDEN,
                    MockElement::hidden()
                        .with_value(current)
                        .with_options([
                            ("full_furniture", "Đầy đủ"),
                            ("basic_furniture", "Cơ bản"),
                            ("unfinished_furniture", "Thô"),
                        ]),
                )
        }

        #[tokio::test]
        async fn test_current_value_short_circuits() {
            let page = page("basic_furniture");
            let config = LocatorConfig::default();
            let field = furniture();
            let effect = ActionExecutor::new(&page, &config)
                .apply(&field, &loc(HIDDEN), &field.map_label("Cơ bản").unwrap())
                .await
                .unwrap();
            assert_eq!(effect, ActionEffect::AlreadySet);
            assert!(!page.was_called("select_option"));
        }

        #[tokio::test]
        async fn test_selects_on_disambiguated_control() {
            let page = page("");
            let config = LocatorConfig::default();
            let field = furniture();
            ActionExecutor::new(&page, &config)
                .apply(&field, &loc(HIDDEN), &field.map_label("Thô").unwrap())
                .await
                .unwrap();
            assert!(page.was_called(&format!("select_option:{HIDDEN} >> nth=1:unfinished_furniture")));
            assert_eq!(
                page.element_by_key(HIDDEN, 1).unwrap().value,
                "unfinished_furniture"
            );
            assert_eq!(page.value_of(HIDDEN).as_deref(), Some(""));
            assert!(page.was_called("wait_for_timeout:500ms"));
        }

        #[tokio::test]
        async fn test_no_matching_control_passes_through() {
            let page = MockPage::new()
                .with_element(HIDDEN, MockElement::hidden().with_options([("sell", "Bán")]));
            let config = LocatorConfig::default();
            let field = furniture();
            let err = ActionExecutor::new(&page, &config)
                .apply(&field, &loc(HIDDEN), &field.map_label("Cơ bản").unwrap())
                .await
                .unwrap_err();
            assert!(matches!(err, HallarError::AmbiguousHiddenControl { inspected: 1, .. }));
        }
    }

    mod upload_tests {
        use super::*;

        const FILE_INPUT: &str = "input[type=\"file\"][accept=\"image/*\"]";

        fn images() -> UploadSpec {
            UploadSpec::new(FieldSpec::file_dropzone("Hình ảnh"), ["a.jpg", "b.jpg", "c.jpg"])
        }

        #[tokio::test]
        async fn test_all_previews_render() {
            let blob = "img[src*=\"blob:\"]";
            let page = MockPage::new()
                .with_element(FILE_INPUT, MockElement::hidden())
                .on_files(
                    FILE_INPUT,
                    [
                        (blob, MockElement::visible()),
                        (blob, MockElement::visible()),
                        (blob, MockElement::visible()),
                    ],
                );
            let config = LocatorConfig::default();
            let report = ActionExecutor::new(&page, &config)
                .upload(&images(), &loc(FILE_INPUT))
                .await
                .unwrap();
            assert!(report.is_complete());
            assert_eq!(report.observed, 3);
            assert_eq!(report.selector, blob);
            assert!(!page.was_called("wait_for_timeout"));
            assert_eq!(page.element_by_key(FILE_INPUT, 0).unwrap().files.len(), 3);
        }

        #[tokio::test]
        async fn test_shortfall_is_not_failure() {
            let page = MockPage::new()
                .with_element(FILE_INPUT, MockElement::hidden())
                .on_files(FILE_INPUT, [(".dropzone img", MockElement::visible())]);
            let config = LocatorConfig::default().with_upload_timeout(1000);
            let report = ActionExecutor::new(&page, &config)
                .upload(&images(), &loc(FILE_INPUT))
                .await
                .unwrap();
            assert_eq!(report.expected, 3);
            assert_eq!(report.observed, 1);
            assert_eq!(report.shortfall, 2);
            assert_eq!(report.selector, ".dropzone img");
            assert_eq!(
                page.history().iter().filter(|c| c.starts_with("wait_for_timeout")).count(),
                4
            );
        }

        #[tokio::test]
        async fn test_no_preview_fails() {
            let page = MockPage::new().with_element(FILE_INPUT, MockElement::hidden());
            let config = LocatorConfig::default().with_upload_timeout(500);
            let err = ActionExecutor::new(&page, &config)
                .upload(&images(), &loc(FILE_INPUT))
                .await
                .unwrap_err();
            let HallarError::ActionFailed { field, value, reason } = err else {
                panic!("expected ActionFailed");
            };
            assert_eq!(field, "Hình ảnh");
            assert_eq!(value, "a.jpg, b.jpg, c.jpg");
            assert!(reason.contains("within 500ms"));
        }

        #[tokio::test]
        async fn test_dropzone_rejects_plain_value() {
            let page = MockPage::new().with_element(FILE_INPUT, MockElement::hidden());
            let config = LocatorConfig::default();
            let err = ActionExecutor::new(&page, &config)
                .apply(&FieldSpec::file_dropzone("Hình ảnh"), &loc(FILE_INPUT), &verbatim("a.jpg"))
                .await
                .unwrap_err();
            assert!(matches!(err, HallarError::ConfigurationError { .. }));
        }
    }
}
