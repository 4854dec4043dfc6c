//! Scriptable in-memory driver for tests.
//!
//! [`MockDriver`] implements [`Driver`] over a hash map of elements keyed
//! by exact query string, with two extras that make asynchronous UI
//! behavior testable deterministically:
//!
//! - an **action journal** recording every call in order, so tests can
//!   assert which queries were issued and what was done to them;
//! - a **schedule** of DOM mutations keyed on a tick counter that advances
//!   on every driver call, including the sleeps issued by polling loops.
//!   Because polls sleep through [`Driver::wait_for_timeout`], a scripted
//!   spinner can appear on tick 3 and vanish on tick 10 without any real
//!   time passing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::driver::{Driver, ElementHandle, ElementState};
use crate::result::{CuadroError, CuadroResult};

/// One scripted element
#[derive(Debug, Clone)]
pub struct MockElement {
    /// Text content
    pub text: String,
    /// Current input value
    pub value: String,
    /// Class list
    pub classes: Vec<String>,
    /// Rendered and attached
    pub visible: bool,
    /// Accepts input
    pub enabled: bool,
    /// Accepts text editing
    pub editable: bool,
}

impl Default for MockElement {
    fn default() -> Self {
        Self {
            text: String::new(),
            value: String::new(),
            classes: Vec::new(),
            visible: true,
            enabled: true,
            editable: true,
        }
    }
}

impl MockElement {
    /// Set the text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set visibility
    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Set enabled state
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Add a class
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }
}

/// One recorded driver call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockAction {
    /// `find` was issued
    Find {
        /// Query string
        query: String,
    },
    /// `fill` was issued
    Fill {
        /// Query of the filled element
        query: String,
        /// Value written
        value: String,
    },
    /// `click` was issued
    Click {
        /// Query of the clicked element
        query: String,
    },
    /// `evaluate` was issued
    Evaluate {
        /// Query of the target element
        query: String,
        /// Script text
        script: String,
    },
    /// `text_content` was issued
    ReadText {
        /// Query of the target element
        query: String,
    },
    /// `in_state` was issued
    SampleState {
        /// Query of the target element
        query: String,
    },
    /// `wait_for_timeout` was issued
    Sleep {
        /// Requested duration in milliseconds
        ms: u64,
    },
}

/// A scheduled DOM mutation
#[derive(Debug, Clone)]
pub enum MockOp {
    /// Insert (or replace) an element under a query
    Insert(String, MockElement),
    /// Remove the element under a query
    Remove(String),
    /// Replace an element's text content
    SetText(String, String),
    /// Flip an element's visibility
    SetVisible(String, bool),
}

#[derive(Debug, Default)]
struct MockState {
    elements: HashMap<String, MockElement>,
    schedule: Vec<(u64, MockOp)>,
    tick: u64,
    journal: Vec<MockAction>,
    next_id: u64,
}

impl MockState {
    /// Advance the tick and apply any mutations that have come due.
    fn advance(&mut self) {
        self.tick += 1;
        let tick = self.tick;
        let due: Vec<MockOp> = {
            let mut kept = Vec::new();
            let mut due = Vec::new();
            for (at, op) in self.schedule.drain(..) {
                if at <= tick {
                    due.push(op);
                } else {
                    kept.push((at, op));
                }
            }
            self.schedule = kept;
            due
        };
        for op in due {
            match op {
                MockOp::Insert(query, element) => {
                    let _ = self.elements.insert(query, element);
                }
                MockOp::Remove(query) => {
                    let _ = self.elements.remove(&query);
                }
                MockOp::SetText(query, text) => {
                    if let Some(element) = self.elements.get_mut(&query) {
                        element.text = text;
                    }
                }
                MockOp::SetVisible(query, visible) => {
                    if let Some(element) = self.elements.get_mut(&query) {
                        element.visible = visible;
                    }
                }
            }
        }
    }
}

/// In-memory [`Driver`] implementation for tests
#[derive(Debug, Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl MockDriver {
    /// Create a new empty mock driver
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register an element under an exact query string
    pub fn insert(&self, query: &str, element: MockElement) {
        let mut state = self.state.lock().unwrap();
        let _ = state.elements.insert(query.to_string(), element);
    }

    /// Schedule a mutation to apply once the tick counter reaches `at`
    pub fn schedule(&self, at: u64, op: MockOp) {
        self.state.lock().unwrap().schedule.push((at, op));
    }

    /// Snapshot of the action journal
    #[must_use]
    pub fn journal(&self) -> Vec<MockAction> {
        self.state.lock().unwrap().journal.clone()
    }

    /// Queries of all `click` actions, in order
    #[must_use]
    pub fn clicked_queries(&self) -> Vec<String> {
        self.journal()
            .into_iter()
            .filter_map(|action| match action {
                MockAction::Click { query } => Some(query),
                _ => None,
            })
            .collect()
    }

    /// Current value of the element under a query
    #[must_use]
    pub fn value_of(&self, query: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state.elements.get(query).map(|e| e.value.clone())
    }

    /// Current tick count
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.state.lock().unwrap().tick
    }

    fn with_element<T>(
        &self,
        handle: &ElementHandle,
        action: MockAction,
        f: impl FnOnce(&mut MockElement) -> T,
    ) -> CuadroResult<T> {
        let mut state = self.state.lock().unwrap();
        state.advance();
        state.journal.push(action);
        state
            .elements
            .get_mut(&handle.query)
            .map(f)
            .ok_or_else(|| CuadroError::Action {
                message: format!("stale handle: '{}' is gone", handle.query),
            })
    }
}

impl Driver for MockDriver {
    fn find(&self, query: &str) -> Option<ElementHandle> {
        let mut state = self.state.lock().unwrap();
        state.advance();
        state.journal.push(MockAction::Find {
            query: query.to_string(),
        });
        if state.elements.contains_key(query) {
            state.next_id += 1;
            Some(ElementHandle::new(format!("el-{}", state.next_id), query))
        } else {
            None
        }
    }

    fn fill(&self, handle: &ElementHandle, value: &str) -> CuadroResult<()> {
        self.with_element(
            handle,
            MockAction::Fill {
                query: handle.query.clone(),
                value: value.to_string(),
            },
            |element| element.value = value.to_string(),
        )
    }

    fn click(&self, handle: &ElementHandle) -> CuadroResult<()> {
        self.with_element(
            handle,
            MockAction::Click {
                query: handle.query.clone(),
            },
            |_| (),
        )
    }

    fn evaluate(&self, handle: &ElementHandle, script: &str) -> CuadroResult<serde_json::Value> {
        self.with_element(
            handle,
            MockAction::Evaluate {
                query: handle.query.clone(),
                script: script.to_string(),
            },
            |element| {
                // Interpret the one query-style script the core issues.
                if script.starts_with("element.classList.contains") {
                    let class = script
                        .split('"')
                        .nth(1)
                        .unwrap_or_default()
                        .to_string();
                    serde_json::Value::Bool(element.classes.iter().any(|c| *c == class))
                } else {
                    serde_json::Value::Null
                }
            },
        )
    }

    fn text_content(&self, handle: &ElementHandle) -> CuadroResult<String> {
        self.with_element(
            handle,
            MockAction::ReadText {
                query: handle.query.clone(),
            },
            |element| element.text.clone(),
        )
    }

    fn in_state(&self, handle: &ElementHandle, state: ElementState) -> CuadroResult<bool> {
        self.with_element(
            handle,
            MockAction::SampleState {
                query: handle.query.clone(),
            },
            |element| match state {
                ElementState::Visible => element.visible,
                ElementState::Hidden => !element.visible,
                ElementState::Stable => true,
                ElementState::Enabled => element.enabled,
                ElementState::Disabled => !element.enabled,
                ElementState::Editable => element.editable,
            },
        )
    }

    fn wait_for_timeout(&self, duration: Duration) {
        let mut state = self.state.lock().unwrap();
        state.advance();
        state.journal.push(MockAction::Sleep {
            ms: duration.as_millis() as u64,
        });
    }
}
