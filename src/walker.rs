//! Root-to-leaf path enumeration
//!
//! [`HypothesisTree::tracks`] yields every path from a root to a childless
//! node as a [`Track`]. The walk is depth-first with siblings visited in
//! child-list order, so the same tree shape always yields the same sequence.

use crate::tree::{HypothesisTree, NodeId};

/// Ordered node handles from a root to one of its descendants.
///
/// Equality and hashing are defined over node identity, so two tracks are
/// equal only when they pass through the very same nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Track {
    nodes: Vec<NodeId>,
}

impl Track {
    /// Create a track from node handles.
    #[must_use]
    pub fn new(nodes: Vec<NodeId>) -> Self {
        Self { nodes }
    }

    /// Node handles, root first.
    #[must_use]
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the track has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First node (the root), if any.
    #[must_use]
    pub fn first(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    /// Prefix holding at most the first `end` nodes.
    #[must_use]
    pub fn truncated(&self, end: usize) -> Self {
        Self {
            nodes: self.nodes[..end.min(self.nodes.len())].to_vec(),
        }
    }
}

impl HypothesisTree {
    /// Lazily enumerate every root-to-leaf path below `root`.
    ///
    /// Each call returns a fresh iterator. A childless root yields a single
    /// one-node track; an unknown handle yields nothing.
    ///
    /// # Example
    ///
    /// ```rust
    /// use eddy_mht::tree::{HypothesisTree, TrackNode};
    ///
    /// # fn main() -> eddy_mht::Result<()> {
    /// let mut tree = HypothesisTree::new();
    /// let root = tree.insert(TrackNode::synthetic());
    /// let left = tree.insert(TrackNode::synthetic());
    /// let right = tree.insert(TrackNode::synthetic());
    /// tree.set_child(root, left)?;
    /// tree.set_child(root, right)?;
    ///
    /// let tracks: Vec<_> = tree.tracks(root).collect();
    /// assert_eq!(tracks.len(), 2);
    /// assert_eq!(tracks[0].nodes(), &[root, left]);
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn tracks(&self, root: NodeId) -> Tracks<'_> {
        let stack = if self.get(root).is_some() {
            vec![(root, 0)]
        } else {
            Vec::new()
        };
        Tracks {
            tree: self,
            stack,
            path: Vec::new(),
        }
    }
}

/// Depth-first iterator over the root-to-leaf paths of one tree.
pub struct Tracks<'a> {
    tree: &'a HypothesisTree,
    // (node, depth of node in the current path)
    stack: Vec<(NodeId, usize)>,
    path: Vec<NodeId>,
}

impl Iterator for Tracks<'_> {
    type Item = Track;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((id, depth)) = self.stack.pop() {
            self.path.truncate(depth);
            self.path.push(id);

            let children = self.tree.children(id);
            if children.is_empty() {
                return Some(Track::new(self.path.clone()));
            }
            self.stack
                .extend(children.iter().rev().map(|&child| (child, depth + 1)));
        }
        None
    }
}
