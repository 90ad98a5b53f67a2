//! Exchange container I/O
//!
//! A container holds the exported track matrices plus four header scalars,
//! addressed by fixed key names. Backends persist it without transforming
//! any value:
//!
//! - [`ParquetContainer`]: Arrow/Parquet file, scalars in schema metadata
//! - [`JsonContainer`]: JSON document keyed by the same names
//! - [`MemoryContainer`]: in-process store, no disk
//!
//! # Example
//!
//! ```rust
//! use eddy_mht::container::{ContainerIo, MemoryContainer, TrackContainer};
//!
//! # fn main() -> eddy_mht::Result<()> {
//! let io = MemoryContainer::new();
//! let container = TrackContainer::new(Vec::new(), 20_050_101, 10, 2, 150.0);
//! io.write("tracks.mat".as_ref(), &container)?;
//! assert_eq!(io.read("tracks.mat".as_ref())?, container);
//! # Ok(())
//! # }
//! ```

mod json_store;
mod memory;
mod parquet_store;

pub use json_store::JsonContainer;
pub use memory::MemoryContainer;
pub use parquet_store::ParquetContainer;

use crate::encoding::TrackMatrix;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Key of the track matrices.
pub const TRACKS_KEY: &str = "tracks";
/// Key of the absolute label of time step 0.
pub const START_DATE_KEY: &str = "start_date";
/// Key of `timestep_count - prune_depth`.
pub const END_DEPTH_KEY: &str = "end_depth";
/// Key of the trailing unconfirmed step count.
pub const PRUNE_DEPTH_KEY: &str = "prune_depth";
/// Key of the pass-through gating distance.
pub const GATE_DIST_KEY: &str = "gate_dist";

/// Contents of one exchange container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackContainer {
    /// One matrix per exported track
    pub tracks: Vec<TrackMatrix>,
    /// Absolute label of time step 0
    pub start_date: i64,
    /// One past the last confirmed step
    pub end_depth: i64,
    /// Trailing unconfirmed step count
    pub prune_depth: i64,
    /// Tracker gating distance
    pub gate_dist: f64,
}

impl TrackContainer {
    /// Create a container from its parts.
    #[must_use]
    pub const fn new(
        tracks: Vec<TrackMatrix>,
        start_date: i64,
        end_depth: i64,
        prune_depth: i64,
        gate_dist: f64,
    ) -> Self {
        Self {
            tracks,
            start_date,
            end_depth,
            prune_depth,
            gate_dist,
        }
    }

    /// Check that every matrix holds exactly `rows * cols` values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedContainer`] naming the first bad matrix.
    pub fn validate(&self) -> Result<()> {
        match self.tracks.iter().position(|m| !m.is_shape_consistent()) {
            Some(index) => Err(Error::MalformedContainer(format!(
                "track {index} does not match its declared shape"
            ))),
            None => Ok(()),
        }
    }
}

/// Named-array persistence for [`TrackContainer`].
pub trait ContainerIo {
    /// Read the container stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the container is missing, unreadable, lacks a
    /// required key, or holds inconsistent shapes.
    fn read(&self, path: &Path) -> Result<TrackContainer>;

    /// Write `container` to `path`, replacing anything already there.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination cannot be written.
    fn write(&self, path: &Path, container: &TrackContainer) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_built_matrices() {
        let container = TrackContainer::new(
            vec![TrackMatrix::filled(2, 9, 0.0)],
            0,
            1,
            0,
            150.0,
        );
        assert!(container.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inconsistent_shape() {
        let bad: TrackMatrix =
            serde_json::from_str(r#"{"rows": 2, "cols": 9, "data": [1.0, 2.0]}"#).unwrap();
        let container = TrackContainer::new(vec![bad], 0, 1, 0, 150.0);

        let err = container.validate().unwrap_err();
        assert!(err.to_string().contains("track 0"));
    }
}
