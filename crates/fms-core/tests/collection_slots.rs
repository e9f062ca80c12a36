mod common;

use common::{collection, traj, GaussProvider};
use fms_core::{Complex64, FmsError, SlotStatus};

fn three() -> fms_core::BasisCollection {
    collection(vec![
        traj(0, 0.0, 0.0, (0.6, 0.0)),
        traj(0, 1.0, 0.5, (0.3, 0.1)),
        traj(1, -0.5, 0.0, (0.2, -0.2)),
    ])
}

#[test]
fn add_assigns_labels_and_slots_in_order() {
    let basis = three();
    assert_eq!(basis.alive_indices(), &[0, 1, 2]);
    let labels: Vec<_> = basis.alive_trajectories().map(|t| t.label).collect();
    assert_eq!(labels, vec![0, 1, 2]);
    assert_eq!(basis.next_label(), 3);
    assert_eq!(basis.overlap_matrix().nrows(), 3);
}

#[test]
fn kill_and_revive_keep_slot_handles_stable() {
    let mut basis = three();
    let amp = basis.trajectory(1).unwrap().amplitude;

    basis.kill(1).unwrap();
    assert_eq!(basis.nalive(), 2);
    assert_eq!(basis.ndead(), 1);
    assert_eq!(basis.alive_indices(), &[0, 2]);
    assert_eq!(basis.trajectory(1).unwrap().amplitude, Complex64::new(0.0, 0.0));
    assert_eq!(basis.trajectory(2).unwrap().label, 2);
    assert!(matches!(basis.status(1), Some(SlotStatus::Culled { .. })));

    basis.revive(1).unwrap();
    assert_eq!(basis.alive_indices(), &[0, 1, 2]);
    assert_eq!(basis.trajectory(1).unwrap().amplitude, amp);
}

#[test]
fn invalid_slot_transitions_are_rejected() {
    let mut basis = three();
    assert!(matches!(basis.revive(0), Err(FmsError::Slot(_))));
    assert!(matches!(basis.kill(7), Err(FmsError::Slot(_))));
    basis.retire(2).unwrap();
    let err = basis.revive(2).unwrap_err();
    assert_eq!(err.info().code, "slot-status");
}

#[test]
fn add_reuses_retired_slots_first() {
    let mut basis = three();
    basis.retire(1).unwrap();
    basis.kill(0).unwrap();
    let idx = basis.add(traj(1, 2.0, 0.0, (0.0, 0.0))).unwrap();
    assert_eq!(idx, 1);
    assert_eq!(basis.trajectory(1).unwrap().label, 3);
    assert_eq!(basis.alive_indices(), &[1, 2]);
    let idx = basis.add(traj(1, 3.0, 0.0, (0.0, 0.0))).unwrap();
    assert_eq!(idx, 3);
    assert_eq!(basis.capacity(), 4);
}

#[test]
fn clones_are_independent() {
    let basis = three();
    let mut copy = basis.clone();
    copy.kill(0).unwrap();
    copy.trajectory_mut(1).unwrap().position[0] = 42.0;
    assert_eq!(basis.nalive(), 3);
    assert_eq!(basis.trajectory(1).unwrap().position[0], 1.0);
}

#[test]
fn stale_overlap_blocks_normalisation() {
    let mut basis = three();
    basis.kill(2).unwrap();
    let err = basis.renormalize().unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(err.info().code, "stale-overlap");

    basis.rebuild_matrices(&GaussProvider);
    basis.renormalize().unwrap();
    assert!((basis.norm().unwrap() - 1.0).abs() < 1e-10);
}

#[test]
fn overlap_matrix_is_hermitian_with_unit_diagonal() {
    let basis = three();
    let s = basis.overlap_matrix();
    for i in 0..3 {
        assert!((s[(i, i)].re - 1.0).abs() < 1e-12);
        assert!(s[(i, i)].im.abs() < 1e-12);
        for j in 0..3 {
            assert!((s[(i, j)] - s[(j, i)].conj()).norm() < 1e-12);
        }
    }
    assert_eq!(s[(0, 2)], Complex64::new(0.0, 0.0));
}

#[test]
fn populations_sum_to_norm() {
    let mut basis = three();
    basis.renormalize().unwrap();
    let pops = basis.populations().unwrap();
    assert_eq!(pops.len(), 2);
    assert!((pops.iter().sum::<f64>() - 1.0).abs() < 1e-10);
    assert!(pops[1] > 0.0);
}

#[test]
fn nstates_mismatch_is_a_config_error() {
    let mut basis = three();
    let mut other = traj(0, 0.0, 0.0, (1.0, 0.0));
    other.nstates = 3;
    other.last_spawn = vec![None; 3];
    other.exit_time = vec![None; 3];
    assert!(matches!(basis.add(other), Err(FmsError::Config(_))));
}

#[test]
fn collection_round_trips_through_json() {
    let basis = three();
    let json = serde_json::to_string(&basis).expect("serialize");
    let decoded: fms_core::BasisCollection = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded.alive_indices(), basis.alive_indices());
    assert_eq!(decoded.slots(), basis.slots());
}

fn reload(
    basis: &fms_core::BasisCollection,
    edit: impl FnOnce(&mut serde_json::Value),
) -> FmsError {
    let mut json = serde_json::to_value(basis).unwrap();
    edit(&mut json);
    let restored: fms_core::BasisCollection = serde_json::from_value(json).unwrap();
    restored.validate().unwrap_err()
}

#[test]
fn validate_accepts_collections_built_through_the_api() {
    let mut basis = three();
    basis.kill(1).unwrap();
    basis.retire(2).unwrap();
    basis.validate().unwrap();
}

#[test]
fn validate_rejects_inconsistent_alive_bookkeeping() {
    let mut basis = three();
    basis.kill(1).unwrap();

    let err = reload(&basis, |json| json["alive"] = serde_json::json!([0, 7]));
    assert!(matches!(err, FmsError::InvariantViolation(_)));
    assert_eq!(err.info().code, "collection-alive");

    let err = reload(&basis, |json| json["alive"] = serde_json::json!([2, 0]));
    assert_eq!(err.info().code, "collection-alive");

    let err = reload(&basis, |json| json["alive"] = serde_json::json!([0, 1, 2]));
    assert_eq!(err.info().code, "collection-alive");

    let err = reload(&basis, |json| json["alive"] = serde_json::json!([0]));
    assert_eq!(err.info().code, "collection-alive");
}

#[test]
fn validate_rejects_malformed_trajectories_and_labels() {
    let basis = three();

    let err = reload(&basis, |json| {
        json["slots"][2]["trajectory"]["widths"] = serde_json::json!([1.0, 1.0]);
    });
    assert_eq!(err.info().code, "trajectory-shape");

    let err = reload(&basis, |json| json["slots"][0]["trajectory"]["label"] = 3.into());
    assert_eq!(err.info().code, "collection-label");
}

#[test]
fn retire_culled_frees_discarded_slots_without_touching_the_overlap() {
    let mut basis = three();
    basis.kill(0).unwrap();
    basis.kill(2).unwrap();
    basis.rebuild_matrices(&GaussProvider);

    assert_eq!(basis.retire_culled().unwrap(), vec![0, 2]);
    assert_eq!(basis.status(0), Some(SlotStatus::Retired));
    assert_eq!(basis.status(2), Some(SlotStatus::Retired));
    assert_eq!(basis.alive_indices(), &[1]);
    assert!(basis.overlap_is_current());
    assert!(basis.retire_culled().unwrap().is_empty());

    let idx = basis.add(traj(1, 2.0, 0.0, (0.0, 0.0))).unwrap();
    assert_eq!(idx, 0);
    assert_eq!(basis.capacity(), 3);
}
