//! Synchronization primitive over a page or frame context.
//!
//! A [`Surface`] binds a [`Driver`] and provides the low-level vocabulary
//! every higher-level component is built from: selector resolution and
//! bounded waits on element state and text.
//!
//! Failure semantics are deliberately split in two. Resolution failures
//! propagate as [`CuadroError::Resolution`]: the caller is expected to have
//! ensured the element exists. Wait timeouts never propagate; they degrade
//! to `Ok(false)` so a test can branch on "did the UI settle in time"
//! without exception-driven control flow. Callers should assert on the
//! returned boolean, since silently discarding it would hide real UI
//! regressions.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::driver::{Driver, ElementHandle, ElementState};
use crate::locator::{Locator, Selector};
use crate::result::{CuadroError, CuadroResult};
use crate::wait::{poll_until, WaitOptions};

/// A logical reference to one element: either a raw selector or an
/// already-built locator.
///
/// Mirrors the common automation-API convention of accepting "a selector
/// string or a locator" in one parameter. Resolution always happens at the
/// moment of use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A raw selector, resolved as-is
    Raw(Selector),
    /// A pre-built locator chain
    Bound(Locator),
}

impl Target {
    /// Render the target into a driver query string
    #[must_use]
    pub fn to_query(&self) -> String {
        match self {
            Self::Raw(selector) => selector.to_query(),
            Self::Bound(locator) => locator.to_query(),
        }
    }
}

impl From<&str> for Target {
    fn from(selector: &str) -> Self {
        Self::Raw(Selector::css(selector))
    }
}

impl From<String> for Target {
    fn from(selector: String) -> Self {
        Self::Raw(Selector::Css(selector))
    }
}

impl From<Selector> for Target {
    fn from(selector: Selector) -> Self {
        Self::Raw(selector)
    }
}

impl From<Locator> for Target {
    fn from(locator: Locator) -> Self {
        Self::Bound(locator)
    }
}

impl From<&Locator> for Target {
    fn from(locator: &Locator) -> Self {
        Self::Bound(locator.clone())
    }
}

/// A page-or-frame context bound to a driver.
///
/// One surface is expected to stay bound to exactly one page/frame context
/// for its lifetime; operations issued through it observe a total order.
#[derive(Clone)]
pub struct Surface {
    driver: Arc<dyn Driver>,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface").finish_non_exhaustive()
    }
}

impl Surface {
    /// Create a surface over a driver
    #[must_use]
    pub fn new(driver: Arc<dyn Driver>) -> Self {
        Self { driver }
    }

    /// Get the underlying driver
    #[must_use]
    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }

    /// Resolve a target to a concrete element handle.
    ///
    /// # Errors
    ///
    /// Returns [`CuadroError::Resolution`] if nothing matches at call time.
    pub fn resolve(&self, target: impl Into<Target>) -> CuadroResult<ElementHandle> {
        let query = target.into().to_query();
        self.driver
            .find(&query)
            .ok_or(CuadroError::Resolution { query })
    }

    /// Wait for the element to reach a lifecycle state.
    ///
    /// Resolves once, then polls one state sample per interval against the
    /// deadline. Returns `Ok(true)` iff the state was observed in time; a
    /// timeout degrades to `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns [`CuadroError::Resolution`] if the target does not resolve.
    pub fn wait_for_state(
        &self,
        target: impl Into<Target>,
        state: ElementState,
        options: &WaitOptions,
    ) -> CuadroResult<bool> {
        let handle = self.resolve(target)?;
        debug!(query = %handle.query, state = %state, "wait_for_state");
        let hit = poll_until(options, &self.sleeper(), || {
            self.driver.in_state(&handle, state).unwrap_or(false)
        });
        Ok(hit)
    }

    /// Wait for the element's text content to contain a substring.
    ///
    /// Resolves once, then re-reads the text each interval. This is a
    /// polling wait, not an event subscription: frameworks that mutate text
    /// by non-observable means are still caught, at the cost of up to one
    /// poll interval of staleness. Timeout degrades to `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns [`CuadroError::Resolution`] if the target does not resolve.
    pub fn wait_for_text(
        &self,
        target: impl Into<Target>,
        substring: &str,
        options: &WaitOptions,
    ) -> CuadroResult<bool> {
        let handle = self.resolve(target)?;
        debug!(query = %handle.query, substring, "wait_for_text");
        let hit = poll_until(options, &self.sleeper(), || {
            self.driver
                .text_content(&handle)
                .map(|text| text.contains(substring))
                .unwrap_or(false)
        });
        Ok(hit)
    }

    /// Fill an input, then click the suggestion whose text matches.
    ///
    /// The matched text defaults to `value`; pass `match_override` when the
    /// rendered suggestion differs from what was typed. No retry: the
    /// suggestion list must already be populated by the time of the call.
    ///
    /// # Errors
    ///
    /// Returns [`CuadroError::Resolution`] if the input or the matching
    /// suggestion does not resolve, or an action error from the driver.
    pub fn autocomplete_fill(
        &self,
        input: impl Into<Target>,
        suggestions: &Locator,
        value: &str,
        match_override: Option<&str>,
    ) -> CuadroResult<()> {
        let matched = match_override.unwrap_or(value);

        let input_handle = self.resolve(input)?;
        self.driver.fill(&input_handle, value)?;

        let item = suggestions.clone().has_text(matched);
        let item_handle = self.resolve(item)?;
        self.driver.click(&item_handle)
    }

    /// Fill an element, then blur it so change handlers fire.
    ///
    /// # Errors
    ///
    /// Returns a resolution or action error from the driver.
    pub fn fill_and_blur(&self, target: impl Into<Target>, value: &str) -> CuadroResult<()> {
        let handle = self.resolve(target)?;
        self.driver.fill(&handle, value)?;
        self.driver.evaluate(&handle, "element.blur()")?;
        Ok(())
    }

    /// Check whether the element's class list contains a class.
    ///
    /// # Errors
    ///
    /// Returns a resolution or action error from the driver.
    pub fn has_class(&self, target: impl Into<Target>, class_name: &str) -> CuadroResult<bool> {
        let handle = self.resolve(target)?;
        let script = format!("element.classList.contains({class_name:?})");
        let value = self.driver.evaluate(&handle, &script)?;
        Ok(value.as_bool().unwrap_or(false))
    }

    /// Check whether the element's text content contains a substring.
    ///
    /// One sample, no wait; use [`Surface::wait_for_text`] for settling UIs.
    ///
    /// # Errors
    ///
    /// Returns a resolution or action error from the driver.
    pub fn has_text(&self, target: impl Into<Target>, text: &str) -> CuadroResult<bool> {
        let handle = self.resolve(target)?;
        let content = self.driver.text_content(&handle)?;
        Ok(content.contains(text))
    }

    fn sleeper(&self) -> impl Fn(Duration) + '_ {
        move |d| self.driver.wait_for_timeout(d)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mock::{MockAction, MockDriver, MockElement, MockOp};
    use std::time::Duration;

    fn fast_options() -> WaitOptions {
        WaitOptions::new()
            .with_timeout(Duration::from_millis(50))
            .with_poll_interval(Duration::from_millis(5))
    }

    mod target_tests {
        use super::*;

        #[test]
        fn test_target_from_str() {
            let target: Target = "#userName".into();
            assert_eq!(target.to_query(), "#userName");
        }

        #[test]
        fn test_target_from_locator() {
            let target: Target = Locator::id("grid").child("tbody tr").into();
            assert_eq!(target.to_query(), "#grid >> tbody tr");
        }

        #[test]
        fn test_target_from_selector() {
            let target: Target = Selector::id("btnApply").into();
            assert_eq!(target.to_query(), "#btnApply");
        }
    }

    mod resolve_tests {
        use super::*;

        #[test]
        fn test_resolve_existing() {
            let driver = MockDriver::new();
            driver.insert("#ok", MockElement::default());
            let surface = Surface::new(driver);

            let handle = surface.resolve("#ok").unwrap();
            assert_eq!(handle.query, "#ok");
        }

        #[test]
        fn test_resolve_missing_propagates() {
            let surface = Surface::new(MockDriver::new());
            let err = surface.resolve("#missing").unwrap_err();
            assert!(matches!(err, CuadroError::Resolution { query } if query == "#missing"));
        }
    }

    mod wait_for_state_tests {
        use super::*;

        #[test]
        fn test_already_in_state() {
            let driver = MockDriver::new();
            driver.insert("#spinner", MockElement::default());
            let surface = Surface::new(driver);

            let hit = surface
                .wait_for_state("#spinner", ElementState::Visible, &fast_options())
                .unwrap();
            assert!(hit);
        }

        #[test]
        fn test_state_reached_later() {
            let driver = MockDriver::new();
            driver.insert("#panel", MockElement::default().with_visible(false));
            driver.schedule(4, MockOp::SetVisible("#panel".into(), true));
            let surface = Surface::new(driver);

            let hit = surface
                .wait_for_state("#panel", ElementState::Visible, &fast_options())
                .unwrap();
            assert!(hit);
        }

        #[test]
        fn test_timeout_degrades_to_false() {
            let driver = MockDriver::new();
            driver.insert("#panel", MockElement::default().with_visible(false));
            let surface = Surface::new(driver);

            let hit = surface
                .wait_for_state("#panel", ElementState::Visible, &fast_options())
                .unwrap();
            assert!(!hit);
        }

        #[test]
        fn test_missing_element_is_error_not_false() {
            let surface = Surface::new(MockDriver::new());
            let result = surface.wait_for_state("#gone", ElementState::Visible, &fast_options());
            assert!(matches!(result, Err(CuadroError::Resolution { .. })));
        }
    }

    mod wait_for_text_tests {
        use super::*;

        #[test]
        fn test_text_present() {
            let driver = MockDriver::new();
            driver.insert("#status", MockElement::default().with_text("Done: 3 rows"));
            let surface = Surface::new(driver);

            let hit = surface
                .wait_for_text("#status", "Done", &fast_options())
                .unwrap();
            assert!(hit);
        }

        #[test]
        fn test_text_appears_later() {
            let driver = MockDriver::new();
            driver.insert("#status", MockElement::default().with_text("Loading"));
            driver.schedule(3, MockOp::SetText("#status".into(), "Complete".into()));
            let surface = Surface::new(driver);

            let hit = surface
                .wait_for_text("#status", "Complete", &fast_options())
                .unwrap();
            assert!(hit);
        }

        #[test]
        fn test_text_timeout_degrades_to_false() {
            let driver = MockDriver::new();
            driver.insert("#status", MockElement::default().with_text("Loading"));
            let surface = Surface::new(driver);

            let hit = surface
                .wait_for_text("#status", "Complete", &fast_options())
                .unwrap();
            assert!(!hit);
        }
    }

    mod autocomplete_tests {
        use super::*;

        #[test]
        fn test_fill_then_click_matching_item() {
            let driver = MockDriver::new();
            driver.insert("#employeeName", MockElement::default());
            let items = Locator::new(".ui-menu-item-wrapper");
            driver.insert(
                &items.clone().has_text("aaron.chen@example.com").to_query(),
                MockElement::default(),
            );
            let surface = Surface::new(driver.clone());

            surface
                .autocomplete_fill(
                    "#employeeName",
                    &items,
                    "aaron chen",
                    Some("aaron.chen@example.com"),
                )
                .unwrap();

            let journal = driver.journal();
            assert!(journal.contains(&MockAction::Fill {
                query: "#employeeName".into(),
                value: "aaron chen".into(),
            }));
            assert!(journal.iter().any(|a| matches!(
                a,
                MockAction::Click { query } if query.contains("aaron.chen@example.com")
            )));
        }

        #[test]
        fn test_match_defaults_to_value() {
            let driver = MockDriver::new();
            driver.insert("#input", MockElement::default());
            let items = Locator::new(".item");
            driver.insert(
                &items.clone().has_text("anna").to_query(),
                MockElement::default(),
            );
            let surface = Surface::new(driver.clone());

            surface
                .autocomplete_fill("#input", &items, "anna", None)
                .unwrap();
            assert!(driver
                .journal()
                .iter()
                .any(|a| matches!(a, MockAction::Click { query } if query.contains("anna"))));
        }

        #[test]
        fn test_no_matching_item_is_resolution_error() {
            let driver = MockDriver::new();
            driver.insert("#input", MockElement::default());
            let surface = Surface::new(driver);

            let result =
                surface.autocomplete_fill("#input", &Locator::new(".item"), "nope", None);
            assert!(matches!(result, Err(CuadroError::Resolution { .. })));
        }
    }

    mod helper_tests {
        use super::*;

        #[test]
        fn test_fill_and_blur_journals_fill_then_evaluate() {
            let driver = MockDriver::new();
            driver.insert("#txtEmail", MockElement::default());
            let surface = Surface::new(driver.clone());

            surface.fill_and_blur("#txtEmail", "a@b.c").unwrap();

            let journal = driver.journal();
            let fill_at = journal
                .iter()
                .position(|a| matches!(a, MockAction::Fill { .. }))
                .unwrap();
            let eval_at = journal
                .iter()
                .position(|a| matches!(a, MockAction::Evaluate { .. }))
                .unwrap();
            assert!(fill_at < eval_at);
        }

        #[test]
        fn test_has_class() {
            let driver = MockDriver::new();
            driver.insert(
                "#tabLink6",
                MockElement::default().with_class("PageHeader--tabs--link__active"),
            );
            let surface = Surface::new(driver);

            assert!(surface
                .has_class("#tabLink6", "PageHeader--tabs--link__active")
                .unwrap());
            assert!(!surface.has_class("#tabLink6", "hidden").unwrap());
        }

        #[test]
        fn test_has_text() {
            let driver = MockDriver::new();
            driver.insert("#menu", MockElement::default().with_text("Stop Impersonation"));
            let surface = Surface::new(driver);

            assert!(surface.has_text("#menu", "Impersonation").unwrap());
            assert!(!surface.has_text("#menu", "Profile").unwrap());
        }
    }
}
