//! Tests for volume/surface activation and metadata adaptation.

use super::{active_counts, hydrated, raw};
use crate::model::{FilePatch, SurfaceFile, VolumeFile};
use crate::state::ProjectFiles;

/// Hydrated project plus one local volume and one local surface.
fn mixed() -> ProjectFiles {
    hydrated().from_added_local_files(&[raw("t2.nii"), raw("lh.white")])
}

#[test]
fn test_activate_volume_deactivates_everything_else() {
    let files = mixed();
    let surface = files.surfaces()[0].clone();
    let files = files.from_one_surface_activated(&surface);
    assert_eq!(active_counts(&files), (0, 1));

    let target = files
        .volumes()
        .iter()
        .find(|v| v.name() == "t1.nii")
        .cloned()
        .unwrap();
    let files = files.from_one_volume_activated(&target);

    assert_eq!(active_counts(&files), (1, 0));
    assert_eq!(files.active_volume().unwrap().name(), "t1.nii");
}

#[test]
fn test_activate_surface_deactivates_volumes() {
    let files = mixed();
    let volume = files.volumes()[0].clone();
    let files = files.from_one_volume_activated(&volume);
    assert_eq!(files.active_volume().unwrap().name(), "t2.nii");

    let surface = files
        .surfaces()
        .iter()
        .find(|s| s.name() == "brain.gii")
        .cloned()
        .unwrap();
    let files = files.from_one_surface_activated(&surface);

    assert_eq!(active_counts(&files), (0, 1));
    assert_eq!(files.active_surface().unwrap().name(), "brain.gii");
}

#[test]
fn test_single_active_over_sequence() {
    let mut files = mixed();
    let volumes: Vec<VolumeFile> = files.volumes().to_vec();
    let surfaces: Vec<SurfaceFile> = files.surfaces().to_vec();

    for step in 0..8 {
        files = if step % 3 == 0 {
            files.from_one_surface_activated(&surfaces[step % surfaces.len()])
        } else {
            files.from_one_volume_activated(&volumes[step % volumes.len()])
        };
        let (active_volumes, active_surfaces) = active_counts(&files);
        assert!(active_volumes <= 1);
        assert!(active_surfaces <= 1);
        assert!(active_volumes + active_surfaces <= 1);
    }
}

#[test]
fn test_activation_keeps_previous_snapshot() {
    let before = mixed();
    let volume = before.volumes()[0].clone();
    let after = before.from_one_volume_activated(&volume);

    assert!(before.active_volume().is_none());
    assert!(after.active_volume().is_some());
}

#[test]
fn test_activation_matches_by_identity_not_value() {
    let files = mixed();
    // a stale copy with different flags still denotes the same file
    let stale = files.volumes()[0].from_patch(&FilePatch::new().checked(false).order(9));
    let files = files.from_one_volume_activated(&stale);
    assert_eq!(files.active_volume().unwrap().name(), "t2.nii");
    assert!(files.active_volume().unwrap().is_checked());
}

#[test]
fn test_adapted_volumes_partition_by_lifecycle() {
    let files = mixed();
    let mut reordered: Vec<VolumeFile> = files.volumes().iter().rev().cloned().collect();
    reordered = reordered
        .iter()
        .enumerate()
        .map(|(i, v)| v.from_patch(&FilePatch::new().order(i as u32)))
        .collect();

    let adapted = files.from_adapted_volumes(reordered);

    assert_eq!(adapted.local_volumes().len(), 1);
    assert_eq!(adapted.cloud_volumes().len(), 1);
    assert_eq!(adapted.cloud_volumes()[0].order, Some(0));
    assert_eq!(adapted.local_volumes()[0].order, Some(1));
    assert_eq!(adapted.surfaces(), files.surfaces());
}

#[test]
fn test_adapted_surfaces_partition_by_lifecycle() {
    let files = mixed();
    let hidden: Vec<SurfaceFile> = files
        .surfaces()
        .iter()
        .map(|s| s.from_patch(&FilePatch::new().checked(false)))
        .collect();

    let adapted = files.from_adapted_surfaces(hidden);

    assert_eq!(adapted.local_surfaces().len(), 1);
    assert_eq!(adapted.cloud_surfaces().len(), 1);
    assert!(adapted.surfaces().iter().all(|s| !s.is_checked()));
    assert_eq!(adapted.all().len(), files.all().len());
}

#[test]
fn test_volume_opacity_normalized() {
    let files = hydrated();
    let volume = files.volumes()[0].clone();

    let files = files.from_volume_opacity(&volume, 140.2);
    assert_eq!(files.cloud_volumes()[0].opacity, 100.0);

    let files = files.from_volume_opacity(&volume, 33.4);
    assert_eq!(files.cloud_volumes()[0].opacity, 33.0);
}

#[test]
fn test_volume_opacity_ignores_local() {
    let files = mixed();
    let local = files
        .volumes()
        .iter()
        .find(|v| !v.is_cloud())
        .cloned()
        .unwrap();
    assert_eq!(files.from_volume_opacity(&local, 10.0), files);
}
