//! Track exporter
//!
//! Turns the confirmed part of a hypothesis tree into fixed-width matrices.
//! Export is a two-phase pipeline because the row width is a property of the
//! whole batch:
//!
//! 1. walk, truncate to the confirmed horizon, deduplicate;
//! 2. find the longest pixel list, then encode every surviving track.

use crate::encoding::{encode_row, row_width, TrackMatrix};
use crate::tree::HypothesisTree;
use crate::tree::NodeId;
use crate::walker::Track;
use rustc_hash::FxHashSet;
use tracing::{debug, warn};

/// Default gating distance recorded alongside exported tracks.
pub const DEFAULT_GATE_DIST: f64 = 150.0;

/// Settings applied when writing tracks to a container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    prune_depth: usize,
    gate_dist: f64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            prune_depth: 0,
            gate_dist: DEFAULT_GATE_DIST,
        }
    }
}

impl ExportOptions {
    /// Options with no pruning and the default gating distance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of trailing time steps left out as still speculative.
    #[must_use]
    pub const fn prune_depth(mut self, prune_depth: usize) -> Self {
        self.prune_depth = prune_depth;
        self
    }

    /// Gating distance passed through to the container.
    #[must_use]
    pub fn gate_dist(mut self, gate_dist: f64) -> Self {
        self.gate_dist = gate_dist;
        self
    }

    /// Configured prune depth.
    #[must_use]
    pub const fn get_prune_depth(&self) -> usize {
        self.prune_depth
    }

    /// Configured gating distance.
    #[must_use]
    pub const fn get_gate_dist(&self) -> f64 {
        self.gate_dist
    }
}

/// Export the confirmed prefixes of every track below `roots`.
///
/// A track rooted at `base_depth` keeps its first
/// `timestep_count - prune_depth - base_depth` nodes; tracks with nothing
/// left are dropped, and identical prefixes are emitted once. All matrices
/// share one width, `FIXED_FIELDS + longest pixel list in the batch`.
/// Tracks without any detection-bearing node are omitted.
///
/// Output order follows `roots` and child-list order, first occurrence wins.
///
/// # Example
///
/// ```rust
/// use eddy_mht::detection::Detection;
/// use eddy_mht::export::export_tracks;
/// use eddy_mht::tree::{HypothesisTree, TrackNode};
///
/// # fn main() -> eddy_mht::Result<()> {
/// let mut tree = HypothesisTree::new();
/// let root = tree.insert(TrackNode::new(Detection::builder(1.0, 2.0).build()));
/// let detection = Detection::builder(1.1, 2.1).pixel_indices(vec![3, 4]).build();
/// let next = tree.insert(TrackNode::new(detection));
/// tree.set_child(root, next)?;
///
/// let matrices = export_tracks(&tree, &[root], 2, 0);
/// assert_eq!(matrices.len(), 1);
/// assert_eq!(matrices[0].rows(), 2);
/// assert_eq!(matrices[0].cols(), 11);
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn export_tracks(
    tree: &HypothesisTree,
    roots: &[NodeId],
    timestep_count: usize,
    prune_depth: usize,
) -> Vec<TrackMatrix> {
    let confirmed = confirmed_tracks(tree, roots, timestep_count, prune_depth);

    let max_pixels = confirmed
        .iter()
        .flat_map(Track::nodes)
        .filter_map(|&id| tree[id].detection())
        .map(|detection| detection.pixel_count())
        .max()
        .unwrap_or(0);
    let width = row_width(max_pixels);

    let mut matrices = Vec::with_capacity(confirmed.len());
    for track in &confirmed {
        let Some(root) = track.first() else {
            continue;
        };
        let base_depth = tree[root].base_depth();

        let mut cells = Vec::with_capacity(track.len() * width);
        for (position, &id) in (0_i64..).zip(track.nodes()) {
            let node = &tree[id];
            if let Some(detection) = node.detection() {
                cells.extend(encode_row(
                    detection,
                    base_depth + 1 + position,
                    node.score(),
                    node.missing(),
                    width,
                ));
            }
        }

        if cells.is_empty() {
            debug!(root = %root, nodes = track.len(), "omitting track without detections");
            continue;
        }
        matrices.push(TrackMatrix::from_encoded(width, cells));
    }

    debug!(
        tracks = matrices.len(),
        width,
        timestep_count,
        prune_depth,
        "exported confirmed tracks"
    );
    matrices
}

/// Phase one: truncated, deduplicated tracks in first-seen order.
fn confirmed_tracks(
    tree: &HypothesisTree,
    roots: &[NodeId],
    timestep_count: usize,
    prune_depth: usize,
) -> Vec<Track> {
    let horizon = to_signed(timestep_count) - to_signed(prune_depth);
    let mut seen: FxHashSet<Track> = FxHashSet::default();
    let mut confirmed = Vec::new();

    for &root in roots {
        if tree.get(root).is_none() {
            warn!(root = %root, "skipping unknown root");
            continue;
        }
        for track in tree.tracks(root) {
            let Some(first) = track.first() else {
                continue;
            };
            let end = horizon - tree[first].base_depth();
            if end <= 0 {
                continue;
            }
            let prefix = track.truncated(usize::try_from(end).unwrap_or(usize::MAX));
            if seen.insert(prefix.clone()) {
                confirmed.push(prefix);
            }
        }
    }
    confirmed
}

fn to_signed(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::Detection;
    use crate::encoding::{Field, FIXED_FIELDS, PADDING_SENTINEL};
    use crate::tree::TrackNode;

    fn detection_with_pixels(n: u64) -> Detection {
        Detection::builder(n as f64, -(n as f64))
            .pixel_indices((100..100 + n).collect::<Vec<_>>())
            .build()
    }

    /// Chain of detections with the given pixel counts, rooted at `base_depth`.
    fn chain(tree: &mut HypothesisTree, pixels: &[u64], base_depth: i64) -> Vec<NodeId> {
        let mut ids = Vec::new();
        for (i, &n) in pixels.iter().enumerate() {
            let node = TrackNode::new(detection_with_pixels(n))
                .with_base_depth(base_depth)
                .with_score(i as f64 * 0.5);
            let id = tree.insert(node);
            if let Some(&parent) = ids.last() {
                tree.set_child(parent, id).unwrap();
            }
            ids.push(id);
        }
        ids
    }

    #[test]
    fn test_chain_full_export() {
        let mut tree = HypothesisTree::new();
        let ids = chain(&mut tree, &[0, 2, 5], 0);

        let matrices = export_tracks(&tree, &[ids[0]], 3, 0);
        assert_eq!(matrices.len(), 1);
        let m = &matrices[0];
        assert_eq!((m.rows(), m.cols()), (3, 14));
        assert!(m.row(0)[FIXED_FIELDS..].iter().all(|&v| v == PADDING_SENTINEL));
        assert_eq!(&m.row(2)[FIXED_FIELDS..], &[100.0, 101.0, 102.0, 103.0, 104.0]);
        let times: Vec<_> = m.iter_rows().map(|r| r[Field::TimeIndex.column()]).collect();
        assert_eq!(times, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_prune_drops_last_step_and_recomputes_width() {
        let mut tree = HypothesisTree::new();
        let ids = chain(&mut tree, &[0, 2, 5], 0);

        let matrices = export_tracks(&tree, &[ids[0]], 3, 1);
        assert_eq!(matrices.len(), 1);
        assert_eq!((matrices[0].rows(), matrices[0].cols()), (2, 11));
    }

    #[test]
    fn test_truncation_boundary() {
        let mut tree = HypothesisTree::new();
        // horizon = 5 - 1 = 4; base_depth 2 → end = 2
        let kept = chain(&mut tree, &[1, 1], 2);
        // base_depth 4 → end = 0
        let dropped = chain(&mut tree, &[1], 4);

        let matrices = export_tracks(&tree, &[kept[0], dropped[0]], 5, 1);
        assert_eq!(matrices.len(), 1);
        assert_eq!(matrices[0].rows(), 2);
        assert!((matrices[0].row(0)[Field::TimeIndex.column()] - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_branches_identical_after_truncation_deduplicate() {
        let mut tree = HypothesisTree::new();
        let ids = chain(&mut tree, &[1, 1], 0);
        let left = tree.insert(TrackNode::new(detection_with_pixels(3)));
        let right = tree.insert(TrackNode::new(detection_with_pixels(4)));
        tree.set_child(ids[1], left).unwrap();
        tree.set_child(ids[1], right).unwrap();

        // three steps, last one unconfirmed: both branches collapse to [root, ids[1]]
        let matrices = export_tracks(&tree, &[ids[0]], 3, 1);
        assert_eq!(matrices.len(), 1);
        assert_eq!(matrices[0].cols(), FIXED_FIELDS + 1);

        // fully confirmed: branches stay distinct
        let matrices = export_tracks(&tree, &[ids[0]], 3, 0);
        assert_eq!(matrices.len(), 2);
        assert!(matrices.iter().all(|m| m.cols() == FIXED_FIELDS + 4));
    }

    #[test]
    fn test_duplicate_roots_export_once() {
        let mut tree = HypothesisTree::new();
        let ids = chain(&mut tree, &[1, 2], 0);

        let matrices = export_tracks(&tree, &[ids[0], ids[0]], 2, 0);
        assert_eq!(matrices.len(), 1);
    }

    #[test]
    fn test_synthetic_nodes_keep_positions() {
        let mut tree = HypothesisTree::new();
        let root = tree.insert(TrackNode::new(detection_with_pixels(1)).with_base_depth(1));
        let gap = tree.insert(TrackNode::synthetic());
        let last = tree.insert(TrackNode::new(detection_with_pixels(1)));
        tree.set_child(root, gap).unwrap();
        tree.set_child(gap, last).unwrap();

        let matrices = export_tracks(&tree, &[root], 10, 0);
        let times: Vec<_> = matrices[0]
            .iter_rows()
            .map(|r| r[Field::TimeIndex.column()])
            .collect();
        assert_eq!(times, vec![2.0, 4.0]);
    }

    #[test]
    fn test_all_synthetic_track_is_omitted() {
        let mut tree = HypothesisTree::new();
        let root = tree.insert(TrackNode::synthetic());

        assert!(export_tracks(&tree, &[root], 3, 0).is_empty());
    }

    #[test]
    fn test_degenerate_inputs_yield_empty() {
        let mut tree = HypothesisTree::new();
        let ids = chain(&mut tree, &[1, 2, 3], 0);

        assert!(export_tracks(&tree, &[], 3, 0).is_empty());
        assert!(export_tracks(&tree, &[ids[0]], 3, 3).is_empty());
        assert!(export_tracks(&tree, &[ids[0]], 3, 10).is_empty());
    }

    #[test]
    fn test_export_options_builder() {
        let options = ExportOptions::new().prune_depth(2).gate_dist(75.0);
        assert_eq!(options.get_prune_depth(), 2);
        assert!((options.get_gate_dist() - 75.0).abs() < f64::EPSILON);
        let default_gate = ExportOptions::default().get_gate_dist();
        assert!((default_gate - DEFAULT_GATE_DIST).abs() < f64::EPSILON);
    }
}
