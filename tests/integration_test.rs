//! Integration tests for the save/load pipeline
//!
//! Builds hypothesis trees the way a tracker would, writes the confirmed
//! part through each container backend, and checks what comes back.

use eddy_mht::archive::{load_tracks, write_tracks};
use eddy_mht::container::{
    ContainerIo, JsonContainer, MemoryContainer, ParquetContainer, TrackContainer,
};
use eddy_mht::detection::Detection;
use eddy_mht::encoding::{Field, FIXED_FIELDS, PADDING_SENTINEL};
use eddy_mht::export::{export_tracks, ExportOptions};
use eddy_mht::import::import_tracks;
use eddy_mht::tree::{HypothesisTree, NodeId, TrackNode};
use eddy_mht::Error;
use std::path::PathBuf;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("eddy_mht_it_{}_{name}", std::process::id()))
}

#[allow(clippy::cast_precision_loss)]
fn eddy(step: u64, pixels: &[u64]) -> Detection {
    Detection::builder(-40.0 + step as f64 * 0.25, 150.0 + step as f64 * 0.5)
        .surface_area(1_000.0 + step as f64)
        .amplitude(0.08)
        .thresh_found(0.35)
        .mean_geo_speed(0.12)
        .pixel_indices(pixels.to_vec())
        .build()
}

/// Chain with pixel lists {0, 2, 5}, rooted at step 0.
fn three_step_chain(tree: &mut HypothesisTree) -> Vec<NodeId> {
    let pixels: [&[u64]; 3] = [&[], &[11, 12], &[20, 21, 22, 23, 24]];
    let mut ids: Vec<NodeId> = Vec::new();
    for (step, px) in (0_u64..).zip(pixels) {
        #[allow(clippy::cast_precision_loss)]
        let node = TrackNode::new(eddy(step, px))
            .with_score(step as f64 * 1.5)
            .with_missing(step == 1);
        let id = tree.insert(node);
        if let Some(&parent) = ids.last() {
            tree.set_child(parent, id).unwrap();
        }
        ids.push(id);
    }
    ids
}

#[test]
fn test_three_step_chain_export_layout() {
    let mut tree = HypothesisTree::new();
    let ids = three_step_chain(&mut tree);

    let matrices = export_tracks(&tree, &[ids[0]], 3, 0);
    assert_eq!(matrices.len(), 1);
    let m = &matrices[0];
    assert_eq!(m.rows(), 3);
    assert_eq!(m.cols(), 14);

    assert!(m.row(0)[FIXED_FIELDS..]
        .iter()
        .all(|&v| (v - PADDING_SENTINEL).abs() < f64::EPSILON));
    assert_eq!(&m.row(2)[FIXED_FIELDS..], &[20.0, 21.0, 22.0, 23.0, 24.0]);
    assert!((m.row(1)[Field::Missing.column()] - 1.0).abs() < f64::EPSILON);
}

#[test]
fn test_three_step_chain_with_prune() {
    let mut tree = HypothesisTree::new();
    let ids = three_step_chain(&mut tree);

    let matrices = export_tracks(&tree, &[ids[0]], 3, 1);
    assert_eq!(matrices.len(), 1);
    assert_eq!(matrices[0].rows(), 2);
    assert_eq!(matrices[0].cols(), 11);
}

fn assert_round_trip<C: ContainerIo>(io: &C, path: &std::path::Path) {
    let mut tree = HypothesisTree::new();
    let ids = three_step_chain(&mut tree);
    let options = ExportOptions::new().prune_depth(1).gate_dist(120.0);

    write_tracks(io, path, &tree, &[ids[0]], &[19_930_101, 19_930_108, 19_930_115], &options)
        .unwrap();
    let loaded = load_tracks(io, path).unwrap();

    assert_eq!(loaded.start_date, 19_930_101);
    assert_eq!(loaded.start_depth, 2);
    assert_eq!(loaded.prune_depth, 1);
    assert!((loaded.gate_dist - 120.0).abs() < f64::EPSILON);
    assert_eq!(loaded.roots.len(), 1);

    let restored: Vec<_> = loaded.tree.tracks(loaded.roots[0]).collect();
    assert_eq!(restored.len(), 1);
    let restored = restored[0].nodes();
    assert_eq!(restored.len(), 2);

    for (&original, &copy) in ids.iter().zip(restored) {
        let (a, b) = (&tree[original], &loaded.tree[copy]);
        assert_eq!(a.detection(), b.detection());
        assert!((a.score() - b.score()).abs() < f64::EPSILON);
        assert_eq!(a.missing(), b.missing());
        assert_eq!(b.base_depth(), 0);
        assert!(b.is_final());
    }
}

#[test]
fn test_round_trip_parquet() {
    let path = temp_path("round_trip.parquet");
    assert_round_trip(&ParquetContainer::new(), &path);
    std::fs::remove_file(&path).ok();
}

#[test]
fn test_round_trip_json() {
    let path = temp_path("round_trip.json");
    assert_round_trip(&JsonContainer::new().pretty(true), &path);
    std::fs::remove_file(&path).ok();
}

#[test]
fn test_round_trip_memory() {
    assert_round_trip(&MemoryContainer::new(), &temp_path("memory"));
}

/// Tracking resumes after a load: the restored chains are extended with new
/// hypotheses and exported again.
#[test]
fn test_resume_extend_and_export_again() {
    let io = MemoryContainer::new();
    let path = temp_path("resume");

    let mut tree = HypothesisTree::new();
    let ids = three_step_chain(&mut tree);
    write_tracks(&io, &path, &tree, &[ids[0]], &[1, 2, 3], &ExportOptions::new()).unwrap();

    let mut loaded = load_tracks(&io, &path).unwrap();
    let tail = loaded
        .tree
        .tracks(loaded.roots[0])
        .next()
        .and_then(|t| t.nodes().last().copied())
        .unwrap();

    // two competing hypotheses for step 4; only one is confirmed once step 5 is pruned
    let a = loaded.tree.insert(TrackNode::new(eddy(3, &[1])));
    let b = loaded.tree.insert(TrackNode::new(eddy(3, &[2, 3, 4, 5, 6, 7])));
    loaded.tree.set_child(tail, a).unwrap();
    loaded.tree.set_child(tail, b).unwrap();

    let matrices = export_tracks(&loaded.tree, &loaded.roots, 4, 1);
    assert_eq!(matrices.len(), 1);
    assert_eq!(matrices[0].rows(), 3);

    let matrices = export_tracks(&loaded.tree, &loaded.roots, 4, 0);
    assert_eq!(matrices.len(), 2);
    assert!(matrices.iter().all(|m| m.rows() == 4 && m.cols() == FIXED_FIELDS + 6));
    let last_times: Vec<_> = matrices
        .iter()
        .map(|m| m.row(3)[Field::TimeIndex.column()])
        .collect();
    assert_eq!(last_times, vec![4.0, 4.0]);
}

#[test]
fn test_late_root_keeps_absolute_time() {
    let mut tree = HypothesisTree::new();
    let root = tree.insert(TrackNode::new(eddy(5, &[3])).with_base_depth(5));
    let next = tree.insert(TrackNode::new(eddy(6, &[4])));
    tree.set_child(root, next).unwrap();

    let matrices = export_tracks(&tree, &[root], 8, 0);
    let times: Vec<_> = matrices[0]
        .iter_rows()
        .map(|r| r[Field::TimeIndex.column()])
        .collect();
    assert_eq!(times, vec![6.0, 7.0]);

    let container = TrackContainer::new(matrices, 0, 8, 0, 150.0);
    let loaded = import_tracks(&container).unwrap();
    assert_eq!(loaded.tree[loaded.roots[0]].base_depth(), 5);
}

#[test]
fn test_mixed_width_container_fails_to_load() {
    let path = temp_path("mixed.json");
    let narrow = eddy_mht::encoding::TrackMatrix::filled(1, 10, 1.0);
    let wide = eddy_mht::encoding::TrackMatrix::filled(1, 12, 1.0);
    let io = JsonContainer::new();
    io.write(&path, &TrackContainer::new(vec![narrow, wide], 0, 1, 0, 150.0))
        .unwrap();

    let result = load_tracks(&io, &path);
    std::fs::remove_file(&path).ok();

    assert!(matches!(result, Err(Error::WidthMismatch { track: 1, .. })));
}
