//! Driver - abstract element-location trait.
//!
//! Cuadro owns no browser. Everything that touches a live page goes through
//! the [`Driver`] trait, injected as `Arc<dyn Driver>` at construction time.
//! A production implementation adapts a real automation backend; the
//! [`crate::mock`] module provides a scriptable in-memory one for tests.
//!
//! The surface is deliberately synchronous: one logical thread of control
//! per test, with suspension happening only inside driver calls and the
//! explicit polling loops in [`crate::wait`]. Polling loops sleep through
//! [`Driver::wait_for_timeout`], so an implementation controls time as well
//! as the DOM.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::result::CuadroResult;

/// Element lifecycle states a driver can sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementState {
    /// Attached and rendered
    Visible,
    /// Detached or not rendered
    Hidden,
    /// Not animating
    Stable,
    /// Accepts input
    Enabled,
    /// Rejects input
    Disabled,
    /// Accepts text editing
    Editable,
}

impl ElementState {
    /// Get the state name string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::Hidden => "hidden",
            Self::Stable => "stable",
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
            Self::Editable => "editable",
        }
    }
}

impl std::fmt::Display for ElementState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Concrete handle to one element, valid at the moment of resolution.
///
/// Handles are never cached by Cuadro; they may go stale between
/// operations, and every locator use re-resolves against the live page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Driver-scoped identifier for the resolved element
    pub id: String,
    /// The query that produced this handle
    pub query: String,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(id: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            query: query.into(),
        }
    }
}

/// Abstract element-location and interaction backend.
///
/// All methods take one sample or perform one action; Cuadro supplies the
/// polling loops, timeouts, and retry policy on top.
pub trait Driver: Send + Sync {
    /// Locate zero-or-one element by query within the current page/frame
    /// context
    fn find(&self, query: &str) -> Option<ElementHandle>;

    /// Replace the element's value with `value`
    fn fill(&self, handle: &ElementHandle, value: &str) -> CuadroResult<()>;

    /// Click the element
    fn click(&self, handle: &ElementHandle) -> CuadroResult<()>;

    /// Evaluate a script in the context of the element
    fn evaluate(&self, handle: &ElementHandle, script: &str) -> CuadroResult<serde_json::Value>;

    /// Read the element's text content
    fn text_content(&self, handle: &ElementHandle) -> CuadroResult<String>;

    /// Sample whether the element is currently in `state`
    fn in_state(&self, handle: &ElementHandle, state: ElementState) -> CuadroResult<bool>;

    /// Suspend for a fixed duration.
    ///
    /// Used by the polling loops between samples and by the grid's
    /// reload-wait protocol.
    fn wait_for_timeout(&self, duration: Duration);
}

#[cfg(test)]
mod tests {
    use super::*;

    mod element_state_tests {
        use super::*;

        #[test]
        fn test_state_names() {
            assert_eq!(ElementState::Visible.as_str(), "visible");
            assert_eq!(ElementState::Hidden.as_str(), "hidden");
            assert_eq!(ElementState::Stable.as_str(), "stable");
            assert_eq!(ElementState::Enabled.as_str(), "enabled");
            assert_eq!(ElementState::Disabled.as_str(), "disabled");
            assert_eq!(ElementState::Editable.as_str(), "editable");
        }

        #[test]
        fn test_state_display() {
            assert_eq!(format!("{}", ElementState::Visible), "visible");
        }
    }

    mod element_handle_tests {
        use super::*;

        #[test]
        fn test_handle_new() {
            let handle = ElementHandle::new("el-1", "#grid");
            assert_eq!(handle.id, "el-1");
            assert_eq!(handle.query, "#grid");
        }
    }
}
