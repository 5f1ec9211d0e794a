//! Collaborator contracts: the only way the engine reaches text generation.
//!
//! # Contract
//!
//! - [`ThoughtGenerator::generate`] returns at most `request.count` distinct
//!   candidate thoughts. Fewer, including zero, is a legitimate answer. The
//!   engine trims, de-duplicates and drops blank candidates itself and never
//!   assumes the count it asked for.
//! - [`ThoughtEvaluator::evaluate`] always returns a verdict. Malformed model
//!   output must be mapped to [`Verdict::degraded`] by the implementation;
//!   [`crate::parse`] has helpers for that.
//! - Both calls may be slow. The engine races them against its cancellation
//!   token and an optional deadline, and drops the future when either fires.
//! - A panic inside a collaborator is caught and treated as degraded output.

use async_trait::async_trait;
use thicket_kernel::{NodeId, PendingThought, ThoughtNode, Verdict};

use crate::config::{GenerationParams, TaskType};

/// Input to one generation call.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub problem: &'a str,
    pub task_type: TaskType,
    /// The node being expanded.
    pub node_id: NodeId,
    pub thought: &'a str,
    pub depth: u32,
    /// Ancestor thoughts, root first.
    pub path: &'a [String],
    /// Number of candidates requested.
    pub count: usize,
    pub params: &'a GenerationParams,
}

impl<'a> GenerationRequest<'a> {
    #[must_use]
    pub fn for_node(
        node: &'a ThoughtNode,
        problem: &'a str,
        task_type: TaskType,
        count: usize,
        params: &'a GenerationParams,
    ) -> Self {
        Self {
            problem,
            task_type,
            node_id: node.id(),
            thought: node.thought(),
            depth: node.depth(),
            path: node.path(),
            count,
            params,
        }
    }
}

/// Input to one evaluation call.
///
/// The thought being judged is not yet part of the tree.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationRequest<'a> {
    pub problem: &'a str,
    pub task_type: TaskType,
    pub parent_id: NodeId,
    pub thought: &'a str,
    pub depth: u32,
    pub path: &'a [String],
    pub params: &'a GenerationParams,
}

impl<'a> EvaluationRequest<'a> {
    #[must_use]
    pub fn for_pending(
        pending: &'a PendingThought,
        problem: &'a str,
        task_type: TaskType,
        params: &'a GenerationParams,
    ) -> Self {
        Self {
            problem,
            task_type,
            parent_id: pending.parent(),
            thought: pending.thought(),
            depth: pending.depth(),
            path: pending.path(),
            params,
        }
    }
}

/// Proposes next thoughts for a node.
#[async_trait]
pub trait ThoughtGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest<'_>) -> Vec<String>;
}

/// Classifies a single thought.
#[async_trait]
pub trait ThoughtEvaluator: Send + Sync {
    async fn evaluate(&self, request: &EvaluationRequest<'_>) -> Verdict;
}

#[async_trait]
impl<T: ThoughtGenerator + ?Sized> ThoughtGenerator for std::sync::Arc<T> {
    async fn generate(&self, request: &GenerationRequest<'_>) -> Vec<String> {
        (**self).generate(request).await
    }
}

#[async_trait]
impl<T: ThoughtEvaluator + ?Sized> ThoughtEvaluator for std::sync::Arc<T> {
    async fn evaluate(&self, request: &EvaluationRequest<'_>) -> Verdict {
        (**self).evaluate(request).await
    }
}
