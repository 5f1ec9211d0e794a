//! Search step log and progress sinks.
//!
//! Every event the engine records is appended to the result's step log and,
//! when a sink is attached, handed to it once. Sinks must not block: the
//! engine calls [`ProgressSink::emit`] inline and never waits for a consumer.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use thicket_kernel::{Evaluation, NodeId};
use tokio::sync::mpsc;

use crate::result::TerminationReason;

/// Which collaborator a degradation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollaboratorStage {
    Generation,
    Evaluation,
}

/// How a collaborator call fell short of its contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Degradation {
    /// The collaborator panicked.
    Panicked,
    /// The per-call deadline elapsed.
    TimedOut,
    /// More candidates than requested came back.
    OverDelivered { requested: usize, received: usize },
    /// Blank or repeated candidates were dropped.
    Discarded { dropped: usize },
    /// The evaluator answered `pending`; stored as the default verdict.
    Unclassified,
}

/// One discrete, self-describing search record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchEvent {
    /// A node was taken from the frontier.
    ExploreNode {
        node_id: NodeId,
        depth: u32,
        thought: String,
    },
    /// A child was created from a generated candidate.
    GenerateCandidate {
        parent_id: NodeId,
        node_id: NodeId,
        depth: u32,
        thought: String,
    },
    /// A child's verdict was recorded.
    EvaluationComplete {
        node_id: NodeId,
        evaluation: Evaluation,
        confidence: f64,
        reasoning: String,
    },
    /// A node at the depth limit was finalized as a leaf.
    DepthLimit { node_id: NodeId },
    /// Expansion produced no usable candidates.
    DeadEnd { node_id: NodeId },
    /// Fewer candidates were turned into nodes than generated.
    BudgetTruncated {
        node_id: NodeId,
        generated: usize,
        created: usize,
    },
    /// A new beam level became active.
    BeamLevel {
        level: u32,
        kept: Vec<NodeId>,
        pruned: Vec<NodeId>,
    },
    /// A collaborator call degraded; the search continued.
    Degraded {
        node_id: NodeId,
        stage: CollaboratorStage,
        degradation: Degradation,
    },
    /// The search ended.
    Complete {
        termination: TerminationReason,
        best_node: NodeId,
        final_answer: String,
        total_nodes: usize,
        explored_nodes: usize,
    },
}

/// An event with its position in the run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchStep {
    /// Zero-based, gap-free.
    pub order: u64,
    #[serde(flatten)]
    pub event: SearchEvent,
}

/// Best-effort consumer of search steps.
pub trait ProgressSink: Send + Sync {
    /// Accept one step. Must return promptly.
    fn emit(&self, step: &SearchStep);
}

impl<F> ProgressSink for F
where
    F: Fn(&SearchStep) + Send + Sync,
{
    fn emit(&self, step: &SearchStep) {
        self(step);
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn emit(&self, _step: &SearchStep) {}
}

/// Forwards steps over a bounded channel, dropping them when it is full or
/// closed.
#[derive(Debug)]
pub struct ChannelSink {
    tx: mpsc::Sender<SearchStep>,
    dropped: AtomicU64,
}

impl ChannelSink {
    /// Create a sink and its receiving end. `capacity` of 0 is treated as 1.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<SearchStep>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                tx,
                dropped: AtomicU64::new(0),
            },
            rx,
        )
    }

    /// Steps that could not be delivered.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl ProgressSink for ChannelSink {
    fn emit(&self, step: &SearchStep) {
        if self.tx.try_send(step.clone()).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Append-only step log that mirrors each entry to an optional sink.
pub(crate) struct StepLog<'a> {
    steps: Vec<SearchStep>,
    sink: Option<&'a dyn ProgressSink>,
}

impl<'a> StepLog<'a> {
    pub(crate) fn new(sink: Option<&'a dyn ProgressSink>) -> Self {
        Self {
            steps: Vec::new(),
            sink,
        }
    }

    pub(crate) fn record(&mut self, event: SearchEvent) {
        let step = SearchStep {
            order: self.steps.len() as u64,
            event,
        };
        if let Some(sink) = self.sink {
            sink.emit(&step);
        }
        self.steps.push(step);
    }

    pub(crate) fn into_steps(self) -> Vec<SearchStep> {
        self.steps
    }
}
