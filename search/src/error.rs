//! Typed search errors.
//!
//! `ConfigurationError` represents pre-flight failures only. Runtime
//! terminations (budget exhaustion, cancellation, collaborator degradation)
//! are expressed via [`crate::result::TerminationReason`] and always produce a
//! `SearchResult`.

use thiserror::Error;

/// Rejected search input.
///
/// Returned before the tree is built and before any collaborator call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    /// `search_method` is not one of `bfs`, `dfs`, `beam`.
    #[error("unknown search method {0:?} (expected bfs, dfs or beam)")]
    UnknownSearchMethod(String),

    /// `task_type` is not in the closed set of task tags.
    #[error("unknown task type {0:?}")]
    UnknownTaskType(String),

    /// A bound that must be at least 1 was zero or negative.
    #[error("{field} must be at least 1, got {value}")]
    NonPositiveBound { field: &'static str, value: i64 },

    /// A bound does not fit the platform integer type.
    #[error("{field} is too large: {value}")]
    BoundTooLarge { field: &'static str, value: i64 },

    /// Sampling temperature outside `[0, 2]` or not finite.
    #[error("temperature must be within [0, 2], got {0}")]
    TemperatureOutOfRange(f64),
}
