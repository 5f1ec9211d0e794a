//! Frontier disciplines for the three search methods.
//!
//! The engine loop is shared; a [`Frontier`] decides only which admitted
//! node is expanded next. Breadth-first and depth-first differ in queue vs
//! stack. Beam keeps an active level and a pool for the next depth, and
//! promotes the pool (best `width` by confidence) once the level is drained.

use std::collections::VecDeque;

use thicket_kernel::NodeId;

use crate::config::SearchMethod;

/// A child that survived evaluation, in generation order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Admitted {
    pub node_id: NodeId,
    pub confidence: f64,
}

/// Beam level change observed while popping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelPromotion {
    /// Depth of the new active level.
    pub level: u32,
    /// Nodes carried into the level, best first.
    pub kept: Vec<NodeId>,
    /// Pool members dropped by the width cut.
    pub pruned: Vec<NodeId>,
}

/// Result of [`Frontier::pop`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popped {
    pub node_id: NodeId,
    /// Set when this pop started a new beam level.
    pub promotion: Option<LevelPromotion>,
}

/// Ordering discipline over nodes awaiting expansion.
pub trait Frontier: Send {
    fn method(&self) -> SearchMethod;

    /// Add viable children of the node just expanded, in generation order.
    fn admit(&mut self, children: &[Admitted]);

    /// Next node to expand, if any.
    fn pop(&mut self) -> Option<Popped>;

    /// Nodes currently waiting (for beam: active level plus pool).
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every node still waiting, in no particular order.
    fn pending(&self) -> Vec<NodeId>;

    /// Largest `len()` observed.
    fn high_water(&self) -> usize;
}

/// Build the frontier for `method`, seeded with `root`.
///
/// `width` is the beam width; ignored by the other methods.
#[must_use]
pub fn frontier_for(method: SearchMethod, width: usize, root: NodeId) -> Box<dyn Frontier> {
    match method {
        SearchMethod::Bfs => Box::new(BreadthFirst::new(root)),
        SearchMethod::Dfs => Box::new(DepthFirst::new(root)),
        SearchMethod::Beam => Box::new(Beam::new(root, width)),
    }
}

/// FIFO frontier.
#[derive(Debug)]
pub struct BreadthFirst {
    queue: VecDeque<NodeId>,
    high_water: usize,
}

impl BreadthFirst {
    #[must_use]
    pub fn new(root: NodeId) -> Self {
        Self {
            queue: VecDeque::from([root]),
            high_water: 1,
        }
    }
}

impl Frontier for BreadthFirst {
    fn method(&self) -> SearchMethod {
        SearchMethod::Bfs
    }

    fn admit(&mut self, children: &[Admitted]) {
        self.queue.extend(children.iter().map(|c| c.node_id));
        self.high_water = self.high_water.max(self.queue.len());
    }

    fn pop(&mut self) -> Option<Popped> {
        self.queue.pop_front().map(|node_id| Popped {
            node_id,
            promotion: None,
        })
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn pending(&self) -> Vec<NodeId> {
        self.queue.iter().copied().collect()
    }

    fn high_water(&self) -> usize {
        self.high_water
    }
}

/// LIFO frontier. Children are pushed in reverse so the first-generated
/// child is popped first.
#[derive(Debug)]
pub struct DepthFirst {
    stack: Vec<NodeId>,
    high_water: usize,
}

impl DepthFirst {
    #[must_use]
    pub fn new(root: NodeId) -> Self {
        Self {
            stack: vec![root],
            high_water: 1,
        }
    }
}

impl Frontier for DepthFirst {
    fn method(&self) -> SearchMethod {
        SearchMethod::Dfs
    }

    fn admit(&mut self, children: &[Admitted]) {
        self.stack.extend(children.iter().rev().map(|c| c.node_id));
        self.high_water = self.high_water.max(self.stack.len());
    }

    fn pop(&mut self) -> Option<Popped> {
        self.stack.pop().map(|node_id| Popped {
            node_id,
            promotion: None,
        })
    }

    fn len(&self) -> usize {
        self.stack.len()
    }

    fn pending(&self) -> Vec<NodeId> {
        self.stack.clone()
    }

    fn high_water(&self) -> usize {
        self.high_water
    }
}

/// Level-synchronized beam frontier.
#[derive(Debug)]
pub struct Beam {
    width: usize,
    level: u32,
    active: VecDeque<NodeId>,
    pool: Vec<Admitted>,
    high_water: usize,
}

impl Beam {
    #[must_use]
    pub fn new(root: NodeId, width: usize) -> Self {
        Self {
            width: width.max(1),
            level: 0,
            active: VecDeque::from([root]),
            pool: Vec::new(),
            high_water: 1,
        }
    }

    /// Sort the pool by descending confidence (stable, so ties keep
    /// generation order) and keep the best `width` as the next level.
    fn promote(&mut self) -> LevelPromotion {
        let mut pool = std::mem::take(&mut self.pool);
        pool.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        let pruned = pool
            .split_off(self.width.min(pool.len()))
            .into_iter()
            .map(|c| c.node_id)
            .collect();
        let kept: Vec<NodeId> = pool.into_iter().map(|c| c.node_id).collect();
        self.level += 1;
        self.active = kept.iter().copied().collect();
        LevelPromotion {
            level: self.level,
            kept,
            pruned,
        }
    }
}

impl Frontier for Beam {
    fn method(&self) -> SearchMethod {
        SearchMethod::Beam
    }

    fn admit(&mut self, children: &[Admitted]) {
        self.pool.extend_from_slice(children);
        self.high_water = self.high_water.max(self.len());
    }

    fn pop(&mut self) -> Option<Popped> {
        let mut promotion = None;
        if self.active.is_empty() {
            if self.pool.is_empty() {
                return None;
            }
            promotion = Some(self.promote());
        }
        self.active.pop_front().map(|node_id| Popped {
            node_id,
            promotion,
        })
    }

    fn len(&self) -> usize {
        self.active.len() + self.pool.len()
    }

    fn pending(&self) -> Vec<NodeId> {
        self.active
            .iter()
            .copied()
            .chain(self.pool.iter().map(|c| c.node_id))
            .collect()
    }

    fn high_water(&self) -> usize {
        self.high_water
    }
}
