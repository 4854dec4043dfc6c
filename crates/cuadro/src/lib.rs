//! Cuadro: typed data-grid abstraction and polling synchronization for
//! browser UI test automation.
//!
//! Legacy web applications render their data in server-driven grids:
//! filterable columns, sortable headers, context menus, and a loading
//! spinner whose timing nobody controls. Cuadro gives a test author a
//! declarative way to describe such a grid once, as a typed mapping from
//! logical names to markup identifiers, and then drive it without writing a
//! single raw selector or `sleep` in the tests themselves.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Test code                          │
//! │        enums + registries: columns, menu actions            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Grid (typed grid)         │  Surface (sync primitive)      │
//! │  derived locator cache,    │  resolve, wait_for_state,      │
//! │  locate/filter/sort/menu,  │  wait_for_text,                │
//! │  reload-wait protocol      │  autocomplete_fill             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Locator (lazy queries)    │  wait (deadline polling)       │
//! ├─────────────────────────────────────────────────────────────┤
//! │              Driver trait (injected backend)                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two layers, bottom-up: a [`Surface`] resolves logical selectors to live
//! element handles and offers bounded waits that degrade to `false` on
//! timeout instead of raising; a [`Grid`] derives every DOM query for a
//! table from its registries at construction time and funnels each
//! "this might still be loading" operation through the shared reload-wait
//! protocol.
//!
//! Cuadro owns no browser. Element location, actions, and time all go
//! through the [`Driver`] trait, so the same grid definitions run against a
//! real automation backend or the in-memory [`mock::MockDriver`].
//!
//! # Example
//!
//! ```
//! use cuadro::{Grid, GridKey, Registry};
//! use cuadro::mock::{MockDriver, MockElement};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum Column {
//!     Name,
//!     Release,
//! }
//!
//! impl GridKey for Column {
//!     fn variants() -> &'static [Self] {
//!         &[Self::Name, Self::Release]
//!     }
//!     fn as_str(&self) -> &'static str {
//!         match self {
//!             Self::Name => "name",
//!             Self::Release => "release",
//!         }
//!     }
//! }
//!
//! # fn main() -> cuadro::CuadroResult<()> {
//! let columns = Registry::new([(Column::Name, "DeliverableName"), (Column::Release, "Release")])?;
//! let grid = Grid::new(MockDriver::new(), "tileGrid", columns);
//!
//! let row = grid.locate_row(Column::Name, "Widget", 0);
//! assert!(row.to_query().contains("tileGrid_DeliverableName"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod driver;
pub mod grid;
pub mod locator;
pub mod mock;
pub mod result;
pub mod surface;
pub mod wait;

pub use driver::{Driver, ElementHandle, ElementState};
pub use grid::{Granularity, Grid, GridKey, LocateOptions, NoMenu, Registry};
pub use locator::{Locator, Selector};
pub use result::{CuadroError, CuadroResult};
pub use surface::{Surface, Target};
pub use wait::{WaitOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS};
