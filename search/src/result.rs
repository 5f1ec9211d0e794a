//! Search result and termination reasons.

use serde::Serialize;
use thicket_kernel::digest::{canonical_hash, ContentHash, DOMAIN_SEARCH_RESULT};
use thicket_kernel::{NodeId, ThoughtNode, ThoughtTree};

use crate::config::SearchMethod;
use crate::event::SearchStep;

/// Why the search stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TerminationReason {
    /// A child was classified `sure`.
    Solved { node_id: NodeId },
    /// No node was left to expand.
    FrontierExhausted,
    /// `max_nodes` was reached.
    NodeBudgetExhausted,
    /// The caller's cancellation token fired.
    Cancelled,
    /// A tree mutation failed; the tree is returned as it stood.
    TreeInvariantViolation { detail: String },
}

/// How the answer node was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Selection {
    /// The first `sure` node.
    Sure { node_id: NodeId },
    /// Best fallback score among leaves.
    Fallback { node_id: NodeId, score: f64 },
}

impl Selection {
    #[must_use]
    pub fn node_id(&self) -> NodeId {
        match self {
            Self::Sure { node_id } | Self::Fallback { node_id, .. } => *node_id,
        }
    }
}

/// Outcome of a search run.
///
/// Always structurally valid, whatever the termination reason.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub method: SearchMethod,
    /// Every node created, for visualization.
    pub tree: ThoughtTree,
    /// Node ids from the root to the selected node.
    pub best_path: Vec<NodeId>,
    /// Thought of the selected node.
    pub final_answer: String,
    pub selection: Selection,
    pub termination: TerminationReason,
    pub cancelled: bool,
    /// Nodes created, root included.
    pub total_nodes: usize,
    /// Nodes taken from the frontier.
    pub explored_nodes: usize,
    pub frontier_high_water: usize,
    pub steps: Vec<SearchStep>,
}

impl SearchResult {
    /// True if a `sure` node ended the search.
    #[must_use]
    pub fn is_solved(&self) -> bool {
        matches!(self.termination, TerminationReason::Solved { .. })
    }

    #[must_use]
    pub fn best_node(&self) -> NodeId {
        self.selection.node_id()
    }

    /// The nodes of `best_path`, root first.
    #[must_use]
    pub fn best_path_nodes(&self) -> Vec<&ThoughtNode> {
        self.best_path
            .iter()
            .filter_map(|id| self.tree.get(*id))
            .collect()
    }

    /// Serialize for a visualization client.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if encoding fails.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Content digest of [`Self::to_json_bytes`].
    ///
    /// # Errors
    ///
    /// Returns the serializer error if encoding fails.
    pub fn digest(&self) -> Result<ContentHash, serde_json::Error> {
        Ok(canonical_hash(DOMAIN_SEARCH_RESULT, &self.to_json_bytes()?))
    }
}
