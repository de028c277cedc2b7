//! Hidden control disambiguation.
//!
//! Styled dropdowns are often backed by visually hidden native selects that
//! carry no name or id. The only way to tell them apart is by what they
//! offer: the finder reads every control's options and picks the first one
//! offering something the field's matchers describe.

use tracing::debug;

use crate::driver::{PageDriver, SelectOption};
use crate::locator::{Locator, Selector};
use crate::result::{HallarError, HallarResult};

/// A hidden select chosen for a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiddenControl {
    /// Locator addressing this control among its siblings
    pub locator: Locator,
    /// Options the control offers
    pub options: Vec<SelectOption>,
    /// Matcher that identified the control
    pub matched_by: String,
}

impl HiddenControl {
    /// Whether `value` is one of the control's option values
    #[must_use]
    pub fn offers(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }
}

/// Finds the hidden select backing a field
#[derive(Debug)]
pub struct HiddenSelectFinder<'a, D: PageDriver + ?Sized> {
    driver: &'a D,
}

impl<'a, D: PageDriver + ?Sized> HiddenSelectFinder<'a, D> {
    /// Create a finder over `driver`
    #[must_use]
    pub const fn new(driver: &'a D) -> Self {
        Self { driver }
    }

    /// Inspect every control matching `selector` in document order.
    ///
    /// Controls whose options cannot be read are skipped.
    pub async fn find(
        &self,
        field: &str,
        selector: &Selector,
        matchers: &[String],
    ) -> HallarResult<HiddenControl> {
        let all = Locator::from_selector(selector.clone());
        let count = self.driver.count(&all).await?;

        for index in 0..count {
            let locator = all.clone().nth(index);
            let options = match self.driver.select_options(&locator).await {
                Ok(options) => options,
                Err(err) => {
                    debug!(field, control = index, error = %err, "could not read hidden control options");
                    continue;
                }
            };
            if let Some(matcher) = first_match(&options, matchers) {
                debug!(field, control = index, matcher, "hidden control identified");
                let matched_by = matcher.to_string();
                return Ok(HiddenControl {
                    locator,
                    options,
                    matched_by,
                });
            }
        }

        Err(HallarError::AmbiguousHiddenControl {
            field: field.to_string(),
            matchers: matchers.to_vec(),
            inspected: count,
        })
    }
}

fn first_match<'m>(options: &[SelectOption], matchers: &'m [String]) -> Option<&'m str> {
    matchers
        .iter()
        .find(|m| {
            options
                .iter()
                .any(|o| o.label.contains(m.as_str()) || o.value.contains(m.as_str()))
        })
        .map(String::as_str)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{MockElement, MockPage};

    const HIDDEN: &str = "select[aria-hidden=\"true\"]";

    fn matchers(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    fn page() -> MockPage {
        MockPage::new()
            .with_element(
                HIDDEN,
                MockElement::hidden().with_options([("sohong_sodo", "Sổ hồng/ Sổ đỏ"), ("hop_dong_mua_ban", "Hợp đồng mua bán")]),
            )
            .with_element(
                HIDDEN,
                MockElement::hidden().with_options([("full_furniture", "Đầy đủ"), ("basic_furniture", "Cơ bản")]),
            )
            .with_element(
                HIDDEN,
                MockElement::hidden().with_options([("east", "Đông"), ("west", "Tây")]),
            )
    }

    #[tokio::test]
    async fn test_picks_control_by_option_value() {
        let page = page();
        let control = HiddenSelectFinder::new(&page)
            .find("Nội thất", &Selector::css(HIDDEN), &matchers(&["thất", "furniture"]))
            .await
            .unwrap();
        assert_eq!(control.locator.index(), 1);
        assert_eq!(control.matched_by, "furniture");
        assert!(control.offers("basic_furniture"));
    }

    #[tokio::test]
    async fn test_picks_control_by_option_label() {
        let page = page();
        let control = HiddenSelectFinder::new(&page)
            .find("Giấy tờ pháp lý", &Selector::css(HIDDEN), &matchers(&["Sổ hồng"]))
            .await
            .unwrap();
        assert_eq!(control.locator.index(), 0);
    }

    #[tokio::test]
    async fn test_first_matching_control_wins() {
        let page = page();
        let control = HiddenSelectFinder::new(&page)
            .find("Hướng ban công", &Selector::css(HIDDEN), &matchers(&["east", "a"]))
            .await
            .unwrap();
        // "a" appears in the first control's values as well
        assert_eq!(control.locator.index(), 0);
    }

    #[tokio::test]
    async fn test_no_match_reports_inspected_count() {
        let page = page();
        let err = HiddenSelectFinder::new(&page)
            .find("Hướng nhà/ đất", &Selector::css(HIDDEN), &matchers(&["north_west"]))
            .await
            .unwrap_err();
        match err {
            HallarError::AmbiguousHiddenControl {
                field, inspected, ..
            } => {
                assert_eq!(field, "Hướng nhà/ đất");
                assert_eq!(inspected, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_unreadable_control_is_skipped() {
        let page = MockPage::new()
            .with_element(HIDDEN, MockElement::broken())
            .with_element(HIDDEN, MockElement::hidden().with_options([("rent", "Cho thuê")]));
        let control = HiddenSelectFinder::new(&page)
            .find("Nhu cầu", &Selector::css(HIDDEN), &matchers(&["rent"]))
            .await
            .unwrap();
        assert_eq!(control.locator.index(), 1);
    }
}
