//! Save a small hypothesis forest, load it back, and keep tracking.
//!
//! Run with `RUST_LOG=debug cargo run --example roundtrip` to see the
//! exporter and container logs.

use anyhow::Context;
use eddy_mht::archive::{load_tracks, write_tracks};
use eddy_mht::container::ParquetContainer;
use eddy_mht::detection::Detection;
use eddy_mht::export::{export_tracks, ExportOptions};
use eddy_mht::tree::{HypothesisTree, TrackNode};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Weekly time steps; the last one is still speculative.
    let timesteps = [19_930_101_i64, 19_930_108, 19_930_115, 19_930_122];
    let options = ExportOptions::new().prune_depth(1);

    let mut tree = HypothesisTree::new();
    let root = tree.insert(TrackNode::new(
        Detection::builder(-38.25, 151.5)
            .amplitude(0.11)
            .pixel_indices(vec![1_024, 1_025])
            .build(),
    ));
    let step1 = tree.insert(
        TrackNode::new(
            Detection::builder(-38.30, 151.3)
                .amplitude(0.12)
                .pixel_indices(vec![1_025, 1_026, 1_027])
                .build(),
        )
        .with_score(0.8),
    );
    let step2 = tree.insert(
        TrackNode::new(
            Detection::builder(-38.40, 151.1)
                .amplitude(0.12)
                .pixel_indices(vec![1_026])
                .build(),
        )
        .with_score(1.7),
    );
    // two competing hypotheses at the unconfirmed step
    let left = tree.insert(
        TrackNode::new(Detection::builder(-38.5, 150.9).build()).with_score(2.1),
    );
    let right = tree.insert(TrackNode::synthetic().with_score(1.9));
    tree.set_child(root, step1)?;
    tree.set_child(step1, step2)?;
    tree.set_child(step2, left)?;
    tree.set_child(step2, right)?;

    let path = std::env::temp_dir().join("eddy_mht_roundtrip.parquet");
    let io = ParquetContainer::new();
    write_tracks(&io, &path, &tree, &[root], &timesteps, &options)
        .with_context(|| format!("writing {}", path.display()))?;

    let loaded = load_tracks(&io, &path).with_context(|| format!("reading {}", path.display()))?;
    println!(
        "restored {} track(s) from {}, resuming at step {}",
        loaded.roots.len(),
        loaded.start_date,
        loaded.start_depth
    );

    let matrices = export_tracks(&loaded.tree, &loaded.roots, timesteps.len(), 0);
    for (i, m) in matrices.iter().enumerate() {
        println!("track {i}: {} rows x {} columns", m.rows(), m.cols());
    }

    std::fs::remove_file(&path).ok();
    Ok(())
}
