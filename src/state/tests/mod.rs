//! Tests for the project file aggregate.
//!
//! Shared fixtures live here; each topic has its own file.

mod activation_tests;

use crate::dto::{
    CreateVolumeResponseDto, GetProjectAnnotationDto, GetProjectDto, GetProjectOverlayDto,
    GetProjectSurfaceDto, GetProjectVolumeDto,
};
use crate::model::RawFile;
use crate::state::ProjectFiles;

/// Backend snapshot with one surface (id 1) and one volume (id 2).
pub(super) fn backend_state() -> GetProjectDto {
    GetProjectDto {
        id: Some(7),
        name: Some("subject-01".into()),
        surfaces: Some(vec![GetProjectSurfaceDto {
            id: Some(1),
            file_name: Some("brain.gii".into()),
            file_size: Some(80),
            ..Default::default()
        }]),
        volumes: Some(vec![GetProjectVolumeDto {
            id: Some(2),
            file_name: Some("t1.nii".into()),
            file_size: Some(100),
            order: Some(0),
            opacity: Some(1.0),
            ..Default::default()
        }]),
    }
}

/// Backend snapshot with one cloud surface (id 1) carrying two cloud
/// overlays (10, 11) and two cloud annotations (20, 21).
pub(super) fn layered_backend_state() -> GetProjectDto {
    let overlay = |id, name: &str| GetProjectOverlayDto {
        id: Some(id),
        file_name: Some(name.into()),
        selected: None,
    };
    let annotation = |id, name: &str| GetProjectAnnotationDto {
        id: Some(id),
        file_name: Some(name.into()),
        selected: None,
    };
    GetProjectDto {
        surfaces: Some(vec![GetProjectSurfaceDto {
            id: Some(1),
            file_name: Some("lh.pial".into()),
            file_size: Some(80),
            overlays: Some(vec![overlay(10, "lh.thickness"), overlay(11, "lh.curv")]),
            annotations: Some(vec![
                annotation(20, "lh.aparc.annot"),
                annotation(21, "lh.BA.annot"),
            ]),
            ..Default::default()
        }]),
        ..Default::default()
    }
}

pub(super) fn hydrated() -> ProjectFiles {
    ProjectFiles::from_backend(&backend_state()).unwrap()
}

pub(super) fn raw(name: &str) -> RawFile {
    RawFile::new(name, 100)
}

pub(super) fn volume_response(id: u32, name: &str) -> CreateVolumeResponseDto {
    CreateVolumeResponseDto {
        id: Some(id),
        file_name: Some(name.into()),
        file_size: Some(100),
        order: Some(0),
        opacity: Some(1.0),
        ..Default::default()
    }
}

/// Number of active volumes and active surfaces in the snapshot.
pub(super) fn active_counts(files: &ProjectFiles) -> (usize, usize) {
    (
        files.volumes().iter().filter(|v| v.is_active()).count(),
        files.surfaces().iter().filter(|s| s.is_active()).count(),
    )
}
