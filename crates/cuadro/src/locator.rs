//! Locator abstraction for element selection.
//!
//! A [`Locator`] is a lazily-evaluated query: building one never touches the
//! page. The chain is rendered into a single deterministic query string by
//! [`Locator::to_query`] and handed to the driver at the moment of use, so
//! the same locator can be re-resolved against a live DOM any number of
//! times without going stale.
//!
//! # Design Philosophy
//!
//! - **Lazy**: construction and filtering are pure; resolution happens later
//! - **Deterministic**: equal chains render equal query strings
//! - **Fluent API**: chainable methods for narrowing a selection

use serde::{Deserialize, Serialize};

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selector {
    /// CSS selector (e.g., `"tbody tr"`)
    Css(String),
    /// Element identifier, rendered as `#id`
    Id(String),
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an identifier selector
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// Render the selector as a query fragment
    #[must_use]
    pub fn to_query(&self) -> String {
        match self {
            Self::Css(s) => s.clone(),
            Self::Id(id) => format!("#{id}"),
        }
    }
}

/// One step in a locator chain.
///
/// `Has` stores the contained locator pre-rendered: the chain is frozen at
/// the moment `has()` is called, which keeps `to_query` a pure function of
/// the construction sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    /// Scope to descendants matching a CSS fragment
    Child(String),
    /// Keep only elements whose text contains the string
    HasText(String),
    /// Keep only elements structurally containing a match of the query
    Has(String),
    /// Zero-based ordinal tie-break in document order
    Nth(usize),
}

impl Step {
    fn render(&self) -> String {
        match self {
            Self::Child(css) => css.clone(),
            Self::HasText(text) => format!("has-text({text:?})"),
            Self::Has(query) => format!("has({query})"),
            Self::Nth(n) => format!("nth={n}"),
        }
    }
}

/// A lazily-evaluated, re-resolvable element query.
///
/// Filtering methods consume and return `Self`, so chains read naturally:
///
/// ```
/// use cuadro::locator::Locator;
///
/// let row = Locator::id("tileGrid")
///     .child("tbody tr")
///     .has_text("Widget")
///     .nth(1);
/// assert_eq!(row.to_query(), "#tileGrid >> tbody tr >> has-text(\"Widget\") >> nth=1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    selector: Selector,
    chain: Vec<Step>,
}

impl Locator {
    /// Create a new locator from a CSS selector
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self::from_selector(Selector::Css(selector.into()))
    }

    /// Create a new locator targeting an element identifier
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::from_selector(Selector::Id(id.into()))
    }

    /// Create a locator from a selector
    #[must_use]
    pub fn from_selector(selector: Selector) -> Self {
        Self {
            selector,
            chain: Vec::new(),
        }
    }

    /// Scope to descendants matching a CSS fragment
    #[must_use]
    pub fn child(mut self, css: impl Into<String>) -> Self {
        self.chain.push(Step::Child(css.into()));
        self
    }

    /// Filter by text content (substring containment, not equality)
    #[must_use]
    pub fn has_text(mut self, text: impl Into<String>) -> Self {
        self.chain.push(Step::HasText(text.into()));
        self
    }

    /// Filter to elements that structurally contain a match of `other`
    #[must_use]
    pub fn has(mut self, other: &Locator) -> Self {
        self.chain.push(Step::Has(other.to_query()));
        self
    }

    /// Select the `n`-th match in document order (zero-based).
    ///
    /// An out-of-range ordinal is not an error here; the rendered query
    /// simply fails to resolve at the point of use.
    #[must_use]
    pub fn nth(mut self, n: usize) -> Self {
        self.chain.push(Step::Nth(n));
        self
    }

    /// Get the base selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Render the full chain into one query string.
    ///
    /// Pure and deterministic: two locators built by the same construction
    /// sequence render byte-identical queries.
    #[must_use]
    pub fn to_query(&self) -> String {
        let mut query = self.selector.to_query();
        for step in &self.chain {
            query.push_str(" >> ");
            query.push_str(&step.render());
        }
        query
    }
}

impl From<Selector> for Locator {
    fn from(selector: Selector) -> Self {
        Self::from_selector(selector)
    }
}
