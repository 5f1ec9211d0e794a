//! Thicket Kernel: the thought-tree data model.
//!
//! # API Surface
//!
//! - [`tree::ThoughtTree`] -- append-only arena of thought nodes with a hard node budget
//! - [`evaluation::Verdict`] -- the three-valued classification attached to a node exactly once
//! - [`digest::canonical_hash`] -- domain-separated SHA-256 digests for tree and result artifacts
//!
//! # Module Dependency Direction
//!
//! `evaluation` ← `node` ← `tree` ← `digest`
//!
//! One-way only. The kernel knows nothing about search strategies or
//! collaborators; those live in `thicket_search`.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod digest;
pub mod error;
pub mod evaluation;
pub mod node;
pub mod tree;

pub use error::TreeError;
pub use evaluation::{Evaluation, Verdict};
pub use node::{NodeId, ThoughtNode};
pub use tree::{PendingThought, ThoughtTree};
