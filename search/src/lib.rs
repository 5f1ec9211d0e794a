//! Thicket Search: tree-of-thoughts search over pluggable collaborators.
//!
//! This crate owns the search loop. It depends on `thicket_kernel` for the
//! thought tree and knows nothing about models, prompts or transports; those
//! live behind [`ThoughtGenerator`] and [`ThoughtEvaluator`].
//!
//! # Crate dependency graph
//!
//! ```text
//! thicket_kernel  ←  thicket_search  ←  thicket_harness
//! (tree, verdicts)   (engine, frontier)   (collaborators, runner)
//! ```
//!
//! # Key types
//!
//! - [`SearchConfig`] / [`RawSearchConfig`]: validated and wire-shaped configuration
//! - [`run_search`]: the engine entry point
//! - [`Frontier`]: BFS, DFS and beam disciplines
//! - [`SearchResult`]: tree, best path, answer and step log
//! - [`ProgressSink`]: best-effort live stream of [`SearchStep`]s

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collaborator;
pub mod config;
pub mod error;
pub mod event;
pub mod fallback;
pub mod frontier;
pub mod parse;
pub mod result;
pub mod search;

pub use collaborator::{EvaluationRequest, GenerationRequest, ThoughtEvaluator, ThoughtGenerator};
pub use config::{GenerationParams, RawSearchConfig, SearchConfig, SearchMethod, TaskType};
pub use error::ConfigurationError;
pub use event::{ChannelSink, NoopSink, ProgressSink, SearchEvent, SearchStep};
pub use frontier::Frontier;
pub use result::{SearchResult, Selection, TerminationReason};
pub use search::{run_search, Collaborators};
