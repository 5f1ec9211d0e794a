//! Thought node and node identifier types.

use std::fmt;

use serde::Serialize;

use crate::evaluation::{Evaluation, Verdict};

/// Identifier of a node, unique within one tree.
///
/// Allocated densely from 0 (the root) in creation order, so an id doubles
/// as the node's index in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl NodeId {
    /// The root node of every tree.
    pub const ROOT: NodeId = NodeId(0);

    #[must_use]
    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }

    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node of the thought tree.
///
/// Structural fields (`depth`, `path`, `ancestors`) are fixed at creation.
/// The verdict fields are written exactly once. Only `children` (append) and
/// `is_leaf` (false → true) change afterwards, and only through
/// [`crate::tree::ThoughtTree`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThoughtNode {
    pub(crate) id: NodeId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) thought: String,
    pub(crate) depth: u32,
    pub(crate) evaluation: Evaluation,
    pub(crate) confidence: f64,
    pub(crate) reasoning: String,
    pub(crate) is_leaf: bool,
    /// Ancestor thoughts from the root down to the parent.
    pub(crate) path: Vec<String>,
    /// Ancestor ids matching `path` element for element.
    pub(crate) ancestors: Vec<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl ThoughtNode {
    pub(crate) fn root(problem: String) -> Self {
        Self {
            id: NodeId::ROOT,
            parent: None,
            thought: problem,
            depth: 0,
            evaluation: Evaluation::Pending,
            confidence: 0.0,
            reasoning: String::new(),
            is_leaf: false,
            path: Vec::new(),
            ancestors: Vec::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[must_use]
    pub fn thought(&self) -> &str {
        &self.thought
    }

    /// Tree depth (root = 0).
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[must_use]
    pub fn evaluation(&self) -> Evaluation {
        self.evaluation
    }

    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    #[must_use]
    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }

    #[must_use]
    pub fn is_evaluated(&self) -> bool {
        self.evaluation != Evaluation::Pending
    }

    /// True once the node will not be expanded further.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.is_leaf
    }

    /// Ancestor thoughts, root first. Empty for the root.
    #[must_use]
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Ancestor ids, root first. Empty for the root.
    #[must_use]
    pub fn ancestors(&self) -> &[NodeId] {
        &self.ancestors
    }

    /// Child ids in creation order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Leaf for fallback purposes: explicitly finalized or childless.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.is_leaf || self.children.is_empty()
    }

    /// The verdict recorded on this node, if any.
    #[must_use]
    pub fn verdict(&self) -> Option<Verdict> {
        self.is_evaluated().then(|| Verdict {
            evaluation: self.evaluation,
            confidence: self.confidence,
            reasoning: self.reasoning.clone(),
        })
    }
}
