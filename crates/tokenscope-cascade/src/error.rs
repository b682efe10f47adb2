//! Error types for tokenscope-cascade.

use thiserror::Error;

/// Result type for cascade operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the cascade graph and scheduler.
///
/// All of these are caller contract violations: the graph and token tables
/// are fixed, so there is nothing to retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The id does not name a node in the current graph.
    #[error("unknown cascade node: {0:?}")]
    UnknownNode(String),

    /// A token key was not one of the known token names.
    #[error("unknown token key: {0:?}")]
    UnknownToken(String),

    /// A color mode or brand name was not recognized.
    #[error("invalid theme setting: {0}")]
    InvalidTheme(String),
}
