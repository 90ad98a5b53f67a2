//! Save and restore hypothesis trees through a container backend

use crate::container::{ContainerIo, TrackContainer};
use crate::export::{export_tracks, ExportOptions};
use crate::import::{import_tracks, LoadedTracks};
use crate::tree::{HypothesisTree, NodeId};
use crate::{Error, Result};
use std::path::Path;
use tracing::info;

/// Write the confirmed part of the tracks below `roots` to `dest`.
///
/// `timesteps` holds the absolute label of every time step processed so far;
/// its first entry becomes `start_date` and its length the timestep count.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if `timesteps` is empty, or the backend's
/// error if the container cannot be written.
///
/// # Example
///
/// ```rust
/// use eddy_mht::archive::{load_tracks, write_tracks};
/// use eddy_mht::container::MemoryContainer;
/// use eddy_mht::detection::Detection;
/// use eddy_mht::export::ExportOptions;
/// use eddy_mht::tree::{HypothesisTree, TrackNode};
/// use std::path::Path;
///
/// # fn main() -> eddy_mht::Result<()> {
/// let mut tree = HypothesisTree::new();
/// let root = tree.insert(TrackNode::new(Detection::builder(-35.0, 150.0).build()));
///
/// let io = MemoryContainer::new();
/// let dest = Path::new("tracks");
/// write_tracks(&io, dest, &tree, &[root], &[20_050_101, 20_050_108], &ExportOptions::new())?;
///
/// let loaded = load_tracks(&io, dest)?;
/// assert_eq!(loaded.roots.len(), 1);
/// assert_eq!(loaded.start_depth, 2);
/// # Ok(())
/// # }
/// ```
pub fn write_tracks<C: ContainerIo + ?Sized>(
    io: &C,
    dest: &Path,
    tree: &HypothesisTree,
    roots: &[NodeId],
    timesteps: &[i64],
    options: &ExportOptions,
) -> Result<()> {
    let start_date = *timesteps
        .first()
        .ok_or_else(|| Error::InvalidInput("timesteps must not be empty".to_string()))?;
    let prune_depth = options.get_prune_depth();

    let tracks = export_tracks(tree, roots, timesteps.len(), prune_depth);
    let container = TrackContainer::new(
        tracks,
        start_date,
        signed(timesteps.len()) - signed(prune_depth),
        signed(prune_depth),
        options.get_gate_dist(),
    );
    io.write(dest, &container)?;

    info!(
        path = %dest.display(),
        tracks = container.tracks.len(),
        end_depth = container.end_depth,
        "saved confirmed tracks"
    );
    Ok(())
}

/// Read the container at `src` and rebuild its chains.
///
/// # Errors
///
/// Returns the backend's read error or any import failure.
pub fn load_tracks<C: ContainerIo + ?Sized>(io: &C, src: &Path) -> Result<LoadedTracks> {
    let container = io.read(src)?;
    let loaded = import_tracks(&container)?;

    info!(
        path = %src.display(),
        tracks = loaded.roots.len(),
        start_depth = loaded.start_depth,
        "loaded tracks"
    );
    Ok(loaded)
}

fn signed(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
