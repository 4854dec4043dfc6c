//! Result and error types for Cuadro.

use thiserror::Error;

/// Result type for Cuadro operations
pub type CuadroResult<T> = Result<T, CuadroError>;

/// Errors that can occur in Cuadro
#[derive(Debug, Error)]
pub enum CuadroError {
    /// Selector matched no element at the moment of resolution
    #[error("No element matched query '{query}'")]
    Resolution {
        /// The query that failed to resolve
        query: String,
    },

    /// A bounded wait expired.
    ///
    /// Only raised by operations documented to do so; the `wait_for_*`
    /// family degrades to `false` instead of producing this variant.
    #[error("Operation timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// The grid's loading indicator never disappeared
    #[error("Table '{table_id}' still loading after {ms}ms")]
    StuckLoading {
        /// Table identifier whose indicator stayed visible
        table_id: String,
        /// Bound that was exhausted, in milliseconds
        ms: u64,
    },

    /// A name registry is incomplete or contains duplicates
    #[error("Invalid registry: {message}")]
    Registry {
        /// Error message
        message: String,
    },

    /// An element action (fill, click, evaluate) failed in the driver
    #[error("Element action failed: {message}")]
    Action {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
