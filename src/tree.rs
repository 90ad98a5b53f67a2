//! Hypothesis tree arena
//!
//! Nodes live in a single-owner arena and refer to each other by [`NodeId`].
//! Child lists are ordered, which makes path enumeration (and therefore
//! export) reproducible for a given tree shape.
//!
//! ```text
//! root(t=0) ──> a(t=1) ──> b(t=2)
//!                    └───> c(t=2)     two hypotheses for step 2
//! ```

use crate::detection::Detection;
use crate::{Error, Result};
use std::fmt;
use std::ops::Index;

/// Stable handle of a node inside a [`HypothesisTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Arena slot of this node.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }

    #[cfg(test)]
    pub(crate) const fn from_index(index: usize) -> Self {
        Self(index)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// What a node stands for at its time step.
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    /// A measured (or imputed, see [`TrackNode::missing`]) eddy.
    Detection(Detection),
    /// A hypothesis without a detection, e.g. a track-termination branch.
    /// It occupies a time position but is never encoded as a row.
    Synthetic,
}

impl Observation {
    /// The wrapped detection, if any.
    #[must_use]
    pub const fn detection(&self) -> Option<&Detection> {
        match self {
            Self::Detection(detection) => Some(detection),
            Self::Synthetic => None,
        }
    }
}

impl From<Detection> for Observation {
    fn from(detection: Detection) -> Self {
        Self::Detection(detection)
    }
}

/// One hypothesis: an observation plus tracking metadata and links.
#[derive(Debug, Clone)]
pub struct TrackNode {
    observation: Observation,
    is_final: bool,
    base_depth: i64,
    score: f64,
    missing: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl TrackNode {
    /// Create a detached, unconfirmed node with zero score at base depth 0.
    #[must_use]
    pub fn new(observation: impl Into<Observation>) -> Self {
        Self {
            observation: observation.into(),
            is_final: false,
            base_depth: 0,
            score: 0.0,
            missing: false,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Create a node without a detection.
    #[must_use]
    pub fn synthetic() -> Self {
        Self::new(Observation::Synthetic)
    }

    /// Set the time step at which this node's chain begins.
    ///
    /// Only meaningful for roots: attaching a node overwrites it with the
    /// parent's value.
    #[must_use]
    pub const fn with_base_depth(mut self, base_depth: i64) -> Self {
        self.base_depth = base_depth;
        self
    }

    /// Set the cumulative score.
    #[must_use]
    pub const fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    /// Mark the node as imputed rather than observed.
    #[must_use]
    pub const fn with_missing(mut self, missing: bool) -> Self {
        self.missing = missing;
        self
    }

    /// Mark the node as part of a confirmed chain.
    #[must_use]
    pub const fn with_final(mut self, is_final: bool) -> Self {
        self.is_final = is_final;
        self
    }

    /// The wrapped observation.
    #[must_use]
    pub const fn observation(&self) -> &Observation {
        &self.observation
    }

    /// The wrapped detection, if the node carries one.
    #[must_use]
    pub const fn detection(&self) -> Option<&Detection> {
        self.observation.detection()
    }

    /// Whether the node belongs to a confirmed chain.
    #[must_use]
    pub const fn is_final(&self) -> bool {
        self.is_final
    }

    /// Time step at which the root of this node's chain began.
    #[must_use]
    pub const fn base_depth(&self) -> i64 {
        self.base_depth
    }

    /// Cumulative track score up to and including this node.
    #[must_use]
    pub const fn score(&self) -> f64 {
        self.score
    }

    /// Whether the detection was imputed.
    #[must_use]
    pub const fn missing(&self) -> bool {
        self.missing
    }

    /// Parent handle; `None` for roots.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in attachment order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Whether the node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Update the cumulative score.
    pub fn set_score(&mut self, score: f64) {
        self.score = score;
    }

    /// Update the confirmation flag.
    pub fn set_final(&mut self, is_final: bool) {
        self.is_final = is_final;
    }

    /// Update the imputed flag.
    pub fn set_missing(&mut self, missing: bool) {
        self.missing = missing;
    }
}

/// Arena owning every node of one or more hypothesis trees.
#[derive(Debug, Clone, Default)]
pub struct HypothesisTree {
    nodes: Vec<TrackNode>,
}

impl HypothesisTree {
    /// Create an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an arena with room for `capacity` nodes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// Number of nodes in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the arena holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a node; it stays a root until attached with [`set_child`](Self::set_child).
    ///
    /// Links carried by `node` are discarded.
    pub fn insert(&mut self, mut node: TrackNode) -> NodeId {
        node.parent = None;
        node.children.clear();
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Get a node by handle.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&TrackNode> {
        self.nodes.get(id.0)
    }

    /// Get a node mutably, for score and flag updates.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut TrackNode> {
        self.nodes.get_mut(id.0)
    }

    /// Parent of `id`, if `id` exists and is attached.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(TrackNode::parent)
    }

    /// Children of `id`; empty for unknown handles.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.get(id) {
            Some(node) => &node.children,
            None => &[],
        }
    }

    /// Parentless nodes in insertion order.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(i, _)| NodeId(i))
    }

    /// Attach `child` under `parent`.
    ///
    /// The child and every node already below it inherit the parent's
    /// `base_depth`; the child is appended after any existing children.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if either handle is unknown, the child
    /// already has a parent, or the attachment would close a cycle.
    pub fn set_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let base_depth = self
            .get(parent)
            .ok_or_else(|| Error::InvalidInput(format!("unknown parent node {parent}")))?
            .base_depth;
        let child_node = self
            .get(child)
            .ok_or_else(|| Error::InvalidInput(format!("unknown child node {child}")))?;
        if let Some(existing) = child_node.parent {
            return Err(Error::InvalidInput(format!(
                "node {child} is already attached to {existing}"
            )));
        }
        if self.ancestors(parent).any(|id| id == child) {
            return Err(Error::InvalidInput(format!(
                "attaching {child} under {parent} would create a cycle"
            )));
        }

        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);

        let mut pending = vec![child];
        while let Some(id) = pending.pop() {
            let node = &mut self.nodes[id.0];
            node.base_depth = base_depth;
            pending.extend_from_slice(&node.children);
        }
        Ok(())
    }

    /// `id` followed by each of its ancestors up to the root.
    fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.get(id).map(|_| id), move |&current| self.parent(current))
    }
}

impl Index<NodeId> for HypothesisTree {
    type Output = TrackNode;

    fn index(&self, id: NodeId) -> &Self::Output {
        &self.nodes[id.0]
    }
}
