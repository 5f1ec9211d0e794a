//! Thicket Harness: everything around the search engine.
//!
//! The harness loads requests, supplies collaborators, runs the engine and
//! packages the result as a digested report. It does NOT implement search
//! logic; that lives in `thicket_search`.
//!
//! - [`collaborators`]: scripted and prompt-backed generators/evaluators
//! - [`request`]: TOML request files
//! - [`runner`]: `run_request`, report directories
//! - [`sink`]: recording progress sink
//! - [`telemetry`]: tracing subscriber setup

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collaborators;
pub mod error;
pub mod request;
pub mod runner;
pub mod sink;
pub mod telemetry;

pub use error::HarnessError;
pub use request::SearchRequest;
pub use runner::{run_request, run_scripted, verify_dir, RunReport};
pub use sink::RecordingSink;
