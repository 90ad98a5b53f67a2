//! # eddy-mht: Hypothesis-Tree Persistence for Eddy Tracking
//!
//! Multi-hypothesis tracking follows ocean eddies across time steps by
//! growing a tree of candidate continuations. This crate converts that tree
//! to and from a flat exchange format:
//!
//! - **Export**: enumerate every root-to-leaf path, keep the confirmed prefix
//!   (everything older than `prune_depth` steps), drop duplicate prefixes, and
//!   encode each detection as a fixed-width `f64` row with `-1` padding.
//! - **Import**: rebuild one final, non-branching chain per stored track.
//! - **Containers**: Parquet (Arrow), JSON, or in-memory storage.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use eddy_mht::archive::{load_tracks, write_tracks};
//! use eddy_mht::container::ParquetContainer;
//! use eddy_mht::detection::Detection;
//! use eddy_mht::export::ExportOptions;
//! use eddy_mht::tree::{HypothesisTree, TrackNode};
//! use std::path::Path;
//!
//! let mut tree = HypothesisTree::new();
//! let root = tree.insert(TrackNode::new(Detection::builder(-38.2, 151.4).build()));
//! let next = tree.insert(TrackNode::new(Detection::builder(-38.3, 151.2).build()));
//! tree.set_child(root, next)?;
//!
//! let io = ParquetContainer::new();
//! let options = ExportOptions::new().prune_depth(1);
//! let timesteps = [19930101, 19930108, 19930115];
//! write_tracks(&io, Path::new("tracks.parquet"), &tree, &[root], &timesteps, &options)?;
//!
//! let loaded = load_tracks(&io, Path::new("tracks.parquet"))?;
//! println!("{} tracks, resume at step {}", loaded.roots.len(), loaded.start_depth);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod archive;
pub mod container;
pub mod detection;
pub mod encoding;
pub mod error;
pub mod export;
pub mod import;
pub mod tree;
pub mod walker;

pub use error::{Error, Result};
