//! Append-only arena of thought nodes.
//!
//! Nodes live in a flat `Vec` indexed by [`NodeId`]; parent and child links
//! are ids, never references. Ancestor paths are copied into each child when
//! it is created, so no path is ever rebuilt by walking parent links.
//!
//! Two ways to add a child:
//!
//! - [`ThoughtTree::create_child`] + [`ThoughtTree::mark_evaluated`]: the
//!   node exists in `pending` state between the two calls.
//! - [`ThoughtTree::prepare_child`] + [`ThoughtTree::commit_child`]: the
//!   child is described off-tree, evaluated, then inserted together with its
//!   verdict. The search engine uses this form so the tree never holds a
//!   half-initialized node.

use serde::Serialize;

use crate::digest::{canonical_hash, ContentHash, DOMAIN_THOUGHT_TREE};
use crate::error::TreeError;
use crate::evaluation::{Evaluation, Verdict};
use crate::node::{NodeId, ThoughtNode};

/// A child described relative to its parent but not yet inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingThought {
    parent: NodeId,
    thought: String,
    depth: u32,
    path: Vec<String>,
    ancestors: Vec<NodeId>,
}

impl PendingThought {
    #[must_use]
    pub fn parent(&self) -> NodeId {
        self.parent
    }

    #[must_use]
    pub fn thought(&self) -> &str {
        &self.thought
    }

    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[must_use]
    pub fn path(&self) -> &[String] {
        &self.path
    }
}

/// The thought tree explored by one search run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThoughtTree {
    max_nodes: usize,
    nodes: Vec<ThoughtNode>,
}

impl ThoughtTree {
    /// Create a tree holding only the root, whose thought is the problem text.
    ///
    /// `max_nodes` counts the root; a value of 0 is treated as 1.
    #[must_use]
    pub fn new(problem: impl Into<String>, max_nodes: usize) -> Self {
        Self {
            max_nodes: max_nodes.max(1),
            nodes: vec![ThoughtNode::root(problem.into())],
        }
    }

    #[must_use]
    pub fn root(&self) -> &ThoughtNode {
        &self.nodes[0]
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&ThoughtNode> {
        self.nodes.get(id.index())
    }

    /// Look up a node.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] if `id` was never allocated.
    pub fn node(&self, id: NodeId) -> Result<&ThoughtNode, TreeError> {
        self.get(id).ok_or(TreeError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut ThoughtNode, TreeError> {
        self.nodes
            .get_mut(id.index())
            .ok_or(TreeError::UnknownNode(id))
    }

    /// All nodes in creation order.
    #[must_use]
    pub fn nodes(&self) -> &[ThoughtNode] {
        &self.nodes
    }

    /// Number of nodes created so far, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }

    /// How many more nodes may be created.
    #[must_use]
    pub fn remaining_budget(&self) -> usize {
        self.max_nodes.saturating_sub(self.nodes.len())
    }

    #[must_use]
    pub fn is_budget_exhausted(&self) -> bool {
        self.remaining_budget() == 0
    }

    /// Describe a child of `parent` without inserting it.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] if `parent` does not exist.
    pub fn prepare_child(
        &self,
        parent: NodeId,
        thought: impl Into<String>,
    ) -> Result<PendingThought, TreeError> {
        let p = self.node(parent)?;
        let mut path = Vec::with_capacity(p.path.len() + 1);
        path.extend_from_slice(&p.path);
        path.push(p.thought.clone());
        let mut ancestors = Vec::with_capacity(p.ancestors.len() + 1);
        ancestors.extend_from_slice(&p.ancestors);
        ancestors.push(p.id);
        Ok(PendingThought {
            parent,
            thought: thought.into(),
            depth: p.depth + 1,
            path,
            ancestors,
        })
    }

    /// Allocate the next node id for a `pending` child of `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] for a missing parent and
    /// [`TreeError::NodeBudgetExhausted`] when the budget is spent.
    pub fn create_child(
        &mut self,
        parent: NodeId,
        thought: impl Into<String>,
    ) -> Result<NodeId, TreeError> {
        let pending = self.prepare_child(parent, thought)?;
        self.insert(pending)
    }

    /// Record a node's verdict. Verdicts are write-once.
    ///
    /// # Errors
    ///
    /// - [`TreeError::UnknownNode`] if `id` does not exist.
    /// - [`TreeError::AlreadyEvaluated`] if the node already has a verdict.
    /// - [`TreeError::PendingVerdict`] if `verdict` is itself `pending`.
    pub fn mark_evaluated(&mut self, id: NodeId, verdict: Verdict) -> Result<(), TreeError> {
        let node = self.node_mut(id)?;
        if node.is_evaluated() {
            return Err(TreeError::AlreadyEvaluated(id));
        }
        if verdict.evaluation == Evaluation::Pending {
            return Err(TreeError::PendingVerdict(id));
        }
        let verdict = verdict.sanitized();
        node.evaluation = verdict.evaluation;
        node.confidence = verdict.confidence;
        node.reasoning = verdict.reasoning;
        Ok(())
    }

    /// Insert a prepared child together with its verdict.
    ///
    /// Either the node is inserted fully evaluated or the tree is unchanged.
    ///
    /// # Errors
    ///
    /// - [`TreeError::PendingVerdict`] if `verdict` is `pending`.
    /// - [`TreeError::StaleChild`] if `pending` does not describe a child of
    ///   its recorded parent.
    /// - [`TreeError::NodeBudgetExhausted`] when the budget is spent.
    pub fn commit_child(
        &mut self,
        pending: PendingThought,
        verdict: Verdict,
    ) -> Result<NodeId, TreeError> {
        if verdict.evaluation == Evaluation::Pending {
            return Err(TreeError::PendingVerdict(self.next_id()));
        }
        self.check_pending(&pending)?;
        let id = self.insert(pending)?;
        self.mark_evaluated(id, verdict)?;
        Ok(id)
    }

    /// Flag a node as not further expanded.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] if `id` does not exist.
    pub fn mark_leaf(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.node_mut(id)?.is_leaf = true;
        Ok(())
    }

    /// Mark every childless node as a leaf. Returns how many were marked.
    pub fn finalize_leaves(&mut self) -> usize {
        let mut marked = 0;
        for node in self.nodes.iter_mut().filter(|n| n.children.is_empty() && !n.is_leaf) {
            node.is_leaf = true;
            marked += 1;
        }
        marked
    }

    /// Node ids from the root to `id`, inclusive.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] if `id` does not exist.
    pub fn path_ids(&self, id: NodeId) -> Result<Vec<NodeId>, TreeError> {
        let node = self.node(id)?;
        let mut ids = node.ancestors.clone();
        ids.push(id);
        Ok(ids)
    }

    /// Depth-first pre-order traversal from the root, children in creation order.
    #[must_use]
    pub fn pre_order(&self) -> PreOrder<'_> {
        PreOrder {
            tree: self,
            stack: vec![NodeId::ROOT],
        }
    }

    /// Verify every structural invariant of the tree.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvariantViolated`] describing the first failure.
    pub fn check_invariants(&self) -> Result<(), TreeError> {
        let fail = |detail: String| Err(TreeError::InvariantViolated { detail });

        if self.nodes.len() > self.max_nodes {
            return fail(format!(
                "{} nodes exceed budget {}",
                self.nodes.len(),
                self.max_nodes
            ));
        }
        for (index, node) in self.nodes.iter().enumerate() {
            if node.id.index() != index {
                return fail(format!("node at index {index} has id {}", node.id));
            }
            if node.path.len() != node.depth as usize || node.ancestors.len() != node.path.len() {
                return fail(format!("node {} path length disagrees with depth", node.id));
            }
            let Some(parent_id) = node.parent else {
                if !node.id.is_root() || node.depth != 0 {
                    return fail(format!("parentless node {} is not a depth-0 root", node.id));
                }
                continue;
            };
            let Some(parent) = self.get(parent_id) else {
                return fail(format!("node {} has unknown parent {parent_id}", node.id));
            };
            if parent_id >= node.id {
                return fail(format!("node {} created before its parent", node.id));
            }
            if node.depth != parent.depth + 1 {
                return fail(format!("node {} depth is not parent depth + 1", node.id));
            }
            if node.path[..node.path.len() - 1] != parent.path[..]
                || node.path.last() != Some(&parent.thought)
            {
                return fail(format!("node {} path is not parent path + parent", node.id));
            }
            if !parent.children.contains(&node.id) {
                return fail(format!("parent {parent_id} does not list child {}", node.id));
            }
        }
        Ok(())
    }

    /// Content digest of the serialized tree.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if the tree cannot be encoded.
    pub fn digest(&self) -> Result<ContentHash, serde_json::Error> {
        let bytes = serde_json::to_vec(self)?;
        Ok(canonical_hash(DOMAIN_THOUGHT_TREE, &bytes))
    }

    fn next_id(&self) -> NodeId {
        NodeId(self.nodes.len() as u64)
    }

    fn check_pending(&self, pending: &PendingThought) -> Result<(), TreeError> {
        let parent = self.node(pending.parent)?;
        let stale = |detail: &str| TreeError::StaleChild {
            parent: pending.parent,
            detail: detail.to_string(),
        };
        if pending.depth != parent.depth + 1 {
            return Err(stale("depth"));
        }
        if pending.path.len() != pending.depth as usize
            || pending.path.last() != Some(&parent.thought)
        {
            return Err(stale("path"));
        }
        Ok(())
    }

    fn insert(&mut self, pending: PendingThought) -> Result<NodeId, TreeError> {
        if self.is_budget_exhausted() {
            return Err(TreeError::NodeBudgetExhausted {
                max_nodes: self.max_nodes,
            });
        }
        let id = self.next_id();
        self.node_mut(pending.parent)?.children.push(id);
        self.nodes.push(ThoughtNode {
            id,
            parent: Some(pending.parent),
            thought: pending.thought,
            depth: pending.depth,
            evaluation: Evaluation::Pending,
            confidence: 0.0,
            reasoning: String::new(),
            is_leaf: false,
            path: pending.path,
            ancestors: pending.ancestors,
            children: Vec::new(),
        });
        Ok(id)
    }
}

/// Iterator returned by [`ThoughtTree::pre_order`].
pub struct PreOrder<'a> {
    tree: &'a ThoughtTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a ThoughtNode;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.tree.get(id)?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
