//! Typed data-grid abstraction.
//!
//! A [`Grid`] translates a declarative contract (logical column name to
//! underlying column identifier, logical menu action to command identifier)
//! into a queryable, filterable, actionable grid, and encapsulates the
//! grid's reload/settle protocol.
//!
//! Logical names are consumer-defined enums implementing [`GridKey`]; a
//! [`Registry`] pairs every variant with its markup identifier and is
//! validated complete at construction. From then on every query uses only
//! logical names, so a markup change is a one-line registry edit instead of
//! a selector hunt across the test suite.
//!
//! The full derived locator set is computed once, eagerly, at construction:
//! a pure function of the table identifier and the registries. Locators are
//! never re-derived afterwards, but each one is re-resolved against the
//! live DOM on every use.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::driver::{Driver, ElementState};
use crate::locator::Locator;
use crate::result::{CuadroError, CuadroResult};
use crate::wait::{poll_until, WaitOptions};

/// Default settle timeout for the reload-wait protocol (2 seconds)
pub const DEFAULT_SETTLE_TIMEOUT_MS: u64 = 2000;

/// Upper bound on the spinner-hidden wait (30 seconds).
///
/// The protocol trusts the loading indicator to disappear, but not
/// unconditionally: past this bound the grid is considered stuck and
/// [`CuadroError::StuckLoading`] is raised instead of hanging the test run.
pub const STUCK_LOADING_TIMEOUT_MS: u64 = 30_000;

/// A closed set of logical names for grid columns or menu actions.
///
/// Implement on a fieldless enum; `variants()` lists every variant so a
/// [`Registry`] can be checked complete at construction.
///
/// ```
/// use cuadro::grid::GridKey;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Column {
///     DcrId,
///     Submitter,
/// }
///
/// impl GridKey for Column {
///     fn variants() -> &'static [Self] {
///         &[Self::DcrId, Self::Submitter]
///     }
///     fn as_str(&self) -> &'static str {
///         match self {
///             Self::DcrId => "dcr_id",
///             Self::Submitter => "submitter",
///         }
///     }
/// }
/// ```
pub trait GridKey: Copy + Eq + Hash + std::fmt::Debug + Send + Sync + 'static {
    /// Every value of the key type, in declaration order
    fn variants() -> &'static [Self];

    /// Stable logical name, used in error messages and logging
    fn as_str(&self) -> &'static str;
}

/// Key type for grids that expose no context-menu actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoMenu {}

impl GridKey for NoMenu {
    fn variants() -> &'static [Self] {
        &[]
    }

    fn as_str(&self) -> &'static str {
        match *self {}
    }
}

/// An immutable, validated mapping from logical names to underlying
/// identifiers.
///
/// Fixed at grid construction and never mutated.
#[derive(Debug, Clone)]
pub struct Registry<K: GridKey> {
    entries: HashMap<K, String>,
}

impl<K: GridKey> Registry<K> {
    /// Build a registry, validating it against the key enumeration.
    ///
    /// # Errors
    ///
    /// Returns [`CuadroError::Registry`] if a variant is missing or listed
    /// twice, or an identifier is empty or mapped by two names.
    pub fn new<I, S>(entries: I) -> CuadroResult<Self>
    where
        I: IntoIterator<Item = (K, S)>,
        S: Into<String>,
    {
        let mut map: HashMap<K, String> = HashMap::new();
        let mut seen_ids: HashSet<String> = HashSet::new();

        for (key, identifier) in entries {
            let identifier = identifier.into();
            if identifier.is_empty() {
                return Err(CuadroError::Registry {
                    message: format!("empty identifier for '{}'", key.as_str()),
                });
            }
            if !seen_ids.insert(identifier.clone()) {
                return Err(CuadroError::Registry {
                    message: format!("identifier '{identifier}' mapped by two names"),
                });
            }
            if map.insert(key, identifier).is_some() {
                return Err(CuadroError::Registry {
                    message: format!("duplicate entry for '{}'", key.as_str()),
                });
            }
        }

        for variant in K::variants() {
            if !map.contains_key(variant) {
                return Err(CuadroError::Registry {
                    message: format!("missing entry for '{}'", variant.as_str()),
                });
            }
        }

        Ok(Self { entries: map })
    }

    /// An empty registry for key types with no variants
    #[must_use]
    pub fn empty() -> Self {
        debug_assert!(K::variants().is_empty());
        Self {
            entries: HashMap::new(),
        }
    }

    /// Get the identifier for a logical name.
    ///
    /// Infallible: construction validated every variant present.
    #[must_use]
    pub fn get(&self, key: K) -> &str {
        self.entries
            .get(&key)
            .map(String::as_str)
            .expect("registry validated complete at construction")
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Selection granularity for [`Grid::locate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Granularity {
    /// Locate the whole row
    #[default]
    Row,
    /// Locate the single cell
    Cell,
}

/// Options for [`Grid::locate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LocateOptions {
    /// Zero-based ordinal tie-break among multiple matches
    pub ordinal: usize,
    /// Row or cell selection
    pub granularity: Granularity,
}

impl LocateOptions {
    /// Defaults: first match, row granularity
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ordinal tie-break
    #[must_use]
    pub const fn with_ordinal(mut self, ordinal: usize) -> Self {
        self.ordinal = ordinal;
        self
    }

    /// Set the selection granularity
    #[must_use]
    pub const fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }
}

/// The derived locator set for one column, computed once at construction
#[derive(Debug, Clone)]
struct ColumnLocators {
    /// `<table_id>_<identifier>`
    column_id: String,
    /// Header cell (`#<column_id>`)
    header: Locator,
    /// Filter input rendered below the header
    filter_input: Locator,
    /// Data cells described by the header (`[aria-describedby="<column_id>"]`)
    cells: Locator,
}

/// A typed web data grid bound to one page context.
///
/// `C` enumerates the logical columns; `M` the context-menu actions
/// (defaulting to [`NoMenu`] for grids without a menu).
#[derive(Clone)]
pub struct Grid<C: GridKey, M: GridKey = NoMenu> {
    driver: Arc<dyn Driver>,
    table_id: String,
    table: Locator,
    header_band: Locator,
    loading_query: String,
    columns: HashMap<C, ColumnLocators>,
    menus: Option<HashMap<M, Locator>>,
}

impl<C: GridKey, M: GridKey> std::fmt::Debug for Grid<C, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grid")
            .field("table_id", &self.table_id)
            .field("columns", &self.columns.len())
            .field("menus", &self.menus.as_ref().map(HashMap::len))
            .finish_non_exhaustive()
    }
}

impl<C: GridKey> Grid<C, NoMenu> {
    /// Construct a grid with no context menu
    #[must_use]
    pub fn new(driver: Arc<dyn Driver>, table_id: impl Into<String>, columns: Registry<C>) -> Self {
        Self::with_menus(driver, table_id, columns, None)
    }
}

impl<C: GridKey, M: GridKey> Grid<C, M> {
    /// Construct a grid, optionally with a context-menu registry.
    ///
    /// The full derived locator set is computed here, eagerly and exactly
    /// once; later operations only re-resolve the cached locators.
    #[must_use]
    pub fn with_menus(
        driver: Arc<dyn Driver>,
        table_id: impl Into<String>,
        columns: Registry<C>,
        menus: Option<Registry<M>>,
    ) -> Self {
        let table_id = table_id.into();

        let column_locators: HashMap<C, ColumnLocators> = columns
            .entries
            .iter()
            .map(|(&key, identifier)| {
                let column_id = format!("{table_id}_{identifier}");
                let locators = ColumnLocators {
                    header: Locator::id(&column_id),
                    filter_input: Locator::new(format!(".ui-igedit-input:below(#{column_id})")),
                    cells: Locator::new(format!("[aria-describedby=\"{column_id}\"]")),
                    column_id,
                };
                (key, locators)
            })
            .collect();

        let menu_locators: Option<HashMap<M, Locator>> = menus.map(|registry| {
            registry
                .entries
                .iter()
                .map(|(&key, command)| {
                    let locator = Locator::new(format!("[data-command=\"{command}\"] div:visible"));
                    (key, locator)
                })
                .collect()
        });

        Self {
            driver,
            table: Locator::id(&table_id),
            header_band: Locator::id(format!("{table_id}_headers")),
            loading_query: format!("#{table_id}_container_loading"),
            table_id,
            columns: column_locators,
            menus: menu_locators,
        }
    }

    /// The table identifier this grid is bound to
    #[must_use]
    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    /// The whole-table locator
    #[must_use]
    pub fn table_locator(&self) -> &Locator {
        &self.table
    }

    /// The header-band locator
    #[must_use]
    pub fn header_locator(&self) -> &Locator {
        &self.header_band
    }

    /// The derived column identifier for a logical column
    #[must_use]
    pub fn column_id(&self, column: C) -> &str {
        &self.column(column).column_id
    }

    /// Locate the header cell for a logical column
    #[must_use]
    pub fn locate_header(&self, column: C) -> Locator {
        self.header_band.clone().has(&self.column(column).header)
    }

    /// Locate the `ordinal`-th row whose cell under `column` contains
    /// `text`.
    ///
    /// Matching is substring containment; ties break in document order. An
    /// out-of-range ordinal yields a locator that fails at resolution, not
    /// an immediate error.
    #[must_use]
    pub fn locate_row(&self, column: C, text: &str, ordinal: usize) -> Locator {
        self.locate(
            column,
            text,
            LocateOptions::new().with_ordinal(ordinal),
        )
    }

    /// Locate the `ordinal`-th cell under `column` containing `text`
    #[must_use]
    pub fn locate_cell(&self, column: C, text: &str, ordinal: usize) -> Locator {
        self.column(column).cells.clone().has_text(text).nth(ordinal)
    }

    /// Unified row/cell lookup with [`LocateOptions`]
    #[must_use]
    pub fn locate(&self, column: C, text: &str, options: LocateOptions) -> Locator {
        let scope = match options.granularity {
            Granularity::Row => "tbody tr",
            Granularity::Cell => "tbody td",
        };
        self.table
            .clone()
            .child(scope)
            .has(&self.column(column).cells)
            .has_text(text)
            .nth(options.ordinal)
    }

    /// Write `text` into the column's filter input and wait for the grid to
    /// settle.
    ///
    /// An empty string clears the filter and still runs the full
    /// reload-wait protocol. A synthetic keyup is dispatched because a
    /// programmatic fill does not raise the grid framework's own change
    /// event. Filtering to zero matches is not an error.
    ///
    /// # Errors
    ///
    /// Returns a resolution/action error, or [`CuadroError::StuckLoading`]
    /// from the protocol.
    pub fn filter(&self, column: C, text: &str) -> CuadroResult<()> {
        self.filter_with(column, text, Duration::from_millis(DEFAULT_SETTLE_TIMEOUT_MS))
    }

    /// [`Grid::filter`] with an explicit settle timeout
    ///
    /// # Errors
    ///
    /// Returns a resolution/action error, or [`CuadroError::StuckLoading`]
    /// from the protocol.
    pub fn filter_with(
        &self,
        column: C,
        text: &str,
        settle_timeout: Duration,
    ) -> CuadroResult<()> {
        debug!(table = %self.table_id, column = column.as_str(), text, "filter");
        let input = self.column(column).filter_input.clone().nth(0);
        let handle = self.resolve(&input.to_query())?;

        self.driver.fill(&handle, text)?;
        self.driver
            .evaluate(&handle, "element.dispatchEvent(new KeyboardEvent('keyup'))")?;

        self.wait_for_loaded(settle_timeout)
    }

    /// Click the column header to trigger a sort, then wait for the grid to
    /// settle.
    ///
    /// # Errors
    ///
    /// Returns a resolution/action error, or [`CuadroError::StuckLoading`]
    /// from the protocol.
    pub fn sort_by(&self, column: C) -> CuadroResult<()> {
        debug!(table = %self.table_id, column = column.as_str(), "sort_by");
        let handle = self.resolve(&self.locate_header(column).to_query())?;
        self.driver.click(&handle)?;
        self.wait_for_loaded(Duration::from_millis(DEFAULT_SETTLE_TIMEOUT_MS))
    }

    /// Invoke a context-menu action.
    ///
    /// A grid constructed without a menu registry makes this a no-op.
    ///
    /// # Errors
    ///
    /// Returns a resolution or action error from the driver.
    pub fn click_menu(&self, action: M) -> CuadroResult<()> {
        let Some(menus) = &self.menus else {
            return Ok(());
        };
        let locator = menus
            .get(&action)
            .expect("registry validated complete at construction");
        let handle = self.resolve(&locator.to_query())?;
        self.driver.click(&handle)
    }

    /// The reload-wait protocol: settle after an operation that may trigger
    /// a server round-trip.
    ///
    /// Step 1 polls, bounded by `settle_timeout`, for the loading indicator
    /// to become visible; synchronous backends never show one, so the step
    /// is allowed to expire quietly. Step 2 then waits for the indicator to
    /// be hidden (or absent), bounded by [`STUCK_LOADING_TIMEOUT_MS`].
    ///
    /// # Errors
    ///
    /// Returns [`CuadroError::StuckLoading`] if the indicator is still
    /// visible when the secondary bound expires.
    pub fn wait_for_loaded(&self, settle_timeout: Duration) -> CuadroResult<()> {
        let sleep = |d: Duration| self.driver.wait_for_timeout(d);

        let appear = WaitOptions::new().with_timeout(settle_timeout);
        let appeared = poll_until(&appear, &sleep, || self.spinner_visible());
        debug!(table = %self.table_id, appeared, "reload-wait: settling");

        let disappear =
            WaitOptions::new().with_timeout(Duration::from_millis(STUCK_LOADING_TIMEOUT_MS));
        let settled = poll_until(&disappear, &sleep, || !self.spinner_visible());
        if !settled {
            return Err(CuadroError::StuckLoading {
                table_id: self.table_id.clone(),
                ms: STUCK_LOADING_TIMEOUT_MS,
            });
        }
        debug!(table = %self.table_id, "reload-wait: settled");
        Ok(())
    }

    /// One sample of the loading indicator. Absent counts as hidden.
    fn spinner_visible(&self) -> bool {
        self.driver.find(&self.loading_query).is_some_and(|handle| {
            self.driver
                .in_state(&handle, ElementState::Visible)
                .unwrap_or(false)
        })
    }

    fn resolve(&self, query: &str) -> CuadroResult<crate::driver::ElementHandle> {
        self.driver.find(query).ok_or(CuadroError::Resolution {
            query: query.to_string(),
        })
    }

    fn column(&self, column: C) -> &ColumnLocators {
        self.columns
            .get(&column)
            .expect("registry validated complete at construction")
    }
}
