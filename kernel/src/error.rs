//! Typed tree errors.
//!
//! Every variant describes a misuse of the tree API. The search engine never
//! lets one of these escape; it records them as a termination reason instead.

use thiserror::Error;

use crate::node::NodeId;

/// Failure of a tree mutation or lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The referenced node does not exist in this tree.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// A node's verdict was already set; verdicts are write-once.
    #[error("node {0} already evaluated")]
    AlreadyEvaluated(NodeId),

    /// A `pending` verdict cannot be recorded as an evaluation.
    #[error("cannot record a pending verdict on node {0}")]
    PendingVerdict(NodeId),

    /// Creating another node would exceed the tree's node budget.
    #[error("node budget of {max_nodes} exhausted")]
    NodeBudgetExhausted { max_nodes: usize },

    /// A prepared child no longer matches its parent.
    #[error("prepared child does not match parent {parent}: {detail}")]
    StaleChild { parent: NodeId, detail: String },

    /// A structural invariant does not hold.
    #[error("tree invariant violated: {detail}")]
    InvariantViolated { detail: String },
}
