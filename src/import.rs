//! Track importer
//!
//! Rebuilds hypothesis chains from stored matrices. Persisted tracks never
//! branch, so every matrix becomes one root with a single line of
//! descendants, all marked final.

use crate::container::TrackContainer;
use crate::encoding::{decode_detection, decode_time_index, Field, FIXED_FIELDS};
use crate::tree::{HypothesisTree, NodeId, TrackNode};
use crate::{Error, Result};
use tracing::{debug, warn};

/// Trees and header values restored from a container.
#[derive(Debug, Clone)]
pub struct LoadedTracks {
    /// Arena holding every restored node
    pub tree: HypothesisTree,
    /// One root per stored track, in storage order
    pub roots: Vec<NodeId>,
    /// Absolute label of time step 0
    pub start_date: i64,
    /// Step at which tracking resumes (the stored `end_depth`)
    pub start_depth: i64,
    /// Trailing unconfirmed steps at save time
    pub prune_depth: i64,
    /// Gating distance in use at save time
    pub gate_dist: f64,
}

/// Rebuild chains from the matrices of `container`.
///
/// Each row becomes a final node whose `base_depth` is the first row's time
/// index minus one. Matrices without rows are skipped.
///
/// # Errors
///
/// Returns [`Error::WidthMismatch`] if the matrices disagree on width, and
/// [`Error::MalformedContainer`] for a matrix whose cells do not fill its
/// declared shape, a width below the fixed fields, a non-integral time
/// index, or an invalid pixel value.
pub fn import_tracks(container: &TrackContainer) -> Result<LoadedTracks> {
    container.validate()?;

    let total_rows: usize = container.tracks.iter().map(|m| m.rows()).sum();
    let mut tree = HypothesisTree::with_capacity(total_rows);
    let mut roots = Vec::with_capacity(container.tracks.len());
    let mut batch_width: Option<usize> = None;

    for (index, matrix) in container.tracks.iter().enumerate() {
        if matrix.is_empty() {
            warn!(track = index, "skipping stored track without rows");
            continue;
        }

        let width = matrix.cols();
        match batch_width {
            None if width < FIXED_FIELDS => {
                return Err(Error::MalformedContainer(format!(
                    "track {index} has {width} columns, need at least {FIXED_FIELDS}"
                )));
            }
            None => batch_width = Some(width),
            Some(expected) if expected != width => {
                return Err(Error::WidthMismatch {
                    track: index,
                    expected,
                    found: width,
                });
            }
            Some(_) => {}
        }

        let base_depth = decode_time_index(matrix.row(0))? - 1;
        let mut parent: Option<NodeId> = None;
        for row in matrix.iter_rows() {
            let node = TrackNode::new(decode_detection(row)?)
                .with_final(true)
                .with_base_depth(base_depth)
                .with_score(row[Field::Score.column()])
                .with_missing(row[Field::Missing.column()] != 0.0);
            let id = tree.insert(node);
            match parent {
                Some(p) => tree.set_child(p, id)?,
                None => roots.push(id),
            }
            parent = Some(id);
        }
    }

    debug!(
        tracks = roots.len(),
        nodes = tree.len(),
        width = batch_width.unwrap_or(FIXED_FIELDS),
        "imported tracks"
    );

    Ok(LoadedTracks {
        tree,
        roots,
        start_date: container.start_date,
        start_depth: container.end_depth,
        prune_depth: container.prune_depth,
        gate_dist: container.gate_dist,
    })
}
