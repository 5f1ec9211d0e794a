//! Ready-made [`ThoughtGenerator`](thicket_search::ThoughtGenerator) and
//! [`ThoughtEvaluator`](thicket_search::ThoughtEvaluator) implementations.

pub mod prompted;
pub mod scripted;

pub use prompted::{CompletionError, PromptedEvaluator, PromptedGenerator, TextCompletion};
pub use scripted::{Script, ScriptedEvaluator, ScriptedGenerator, ScriptedVerdict};
