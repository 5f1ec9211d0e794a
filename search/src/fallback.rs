//! Fallback selection when no thought was classified `sure`.
//!
//! Score = `confidence + evaluation bonus + 0.1 × depth`, over terminal nodes
//! only (finalized leaves or childless nodes). Traversal is pre-order from
//! the root with children in creation order; the first maximum wins.

use serde::Serialize;
use thicket_kernel::{NodeId, ThoughtNode, ThoughtTree};

/// Weight of depth in the fallback score.
pub const DEPTH_WEIGHT: f64 = 0.1;

/// The leaf picked by [`select_fallback`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FallbackChoice {
    pub node_id: NodeId,
    pub score: f64,
}

/// Fallback score of a single node.
#[must_use]
pub fn fallback_score(node: &ThoughtNode) -> f64 {
    node.confidence() + node.evaluation().bonus() + DEPTH_WEIGHT * f64::from(node.depth())
}

/// Pick the best-scoring terminal node.
///
/// A tree always has at least one terminal node, so this never fails; a
/// lone root is its own answer.
#[must_use]
pub fn select_fallback(tree: &ThoughtTree) -> FallbackChoice {
    let mut best: Option<FallbackChoice> = None;
    for node in tree.pre_order().filter(|n| n.is_terminal()) {
        let score = fallback_score(node);
        if best.is_none_or(|b| score > b.score) {
            best = Some(FallbackChoice {
                node_id: node.id(),
                score,
            });
        }
    }
    best.unwrap_or_else(|| FallbackChoice {
        node_id: NodeId::ROOT,
        score: fallback_score(tree.root()),
    })
}
