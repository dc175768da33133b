//! A project session: the current snapshot, the actions that move it
//! forward and the history that moves it back.

use crate::config::AppConfig;
use crate::dto::{
    CreateAnnotationResponseDto, CreateOverlayResponseDto, CreateSurfaceResponseDto,
    CreateVolumeResponseDto, GetProjectDto,
};
use crate::error::Result;
use crate::history::{HistoryOptions, ProjectHistory};
use crate::model::{
    AnnotationFile, FileId, FileTypes, OverlayFile, PointSetFile, RawFile, SurfaceFile, VolumeFile,
};
use crate::state::ProjectFiles;

/// Everything that can happen to the project files.
#[derive(Debug, Clone)]
pub enum ProjectAction {
    AdaptVolumes(Vec<VolumeFile>),
    AdaptSurfaces(Vec<SurfaceFile>),
    ActivateVolume(VolumeFile),
    ActivateSurface(SurfaceFile),
    AddLocalFiles(Vec<RawFile>),
    DeleteFile(String),
    AddOverlay {
        surface: SurfaceFile,
        file: RawFile,
    },
    AddAnnotation {
        surface: SurfaceFile,
        file: RawFile,
    },
    DeleteOverlay {
        surface: SurfaceFile,
        overlay: OverlayFile,
    },
    DeleteAnnotation {
        surface: SurfaceFile,
        annotation: AnnotationFile,
    },
    ToggleOverlay {
        surface: SurfaceFile,
        overlay: OverlayFile,
    },
    ToggleAnnotation {
        surface: SurfaceFile,
        annotation: AnnotationFile,
    },
    SetVolumeOpacity {
        volume: VolumeFile,
        opacity: f32,
    },
    CachePointSets(Vec<PointSetFile>),
    /// Backend acknowledged uploaded volumes
    VolumesUploaded(Vec<CreateVolumeResponseDto>),
    /// Backend acknowledged uploaded surfaces
    SurfacesUploaded(Vec<CreateSurfaceResponseDto>),
    OverlaysUploaded {
        surface_id: FileId,
        responses: Vec<CreateOverlayResponseDto>,
    },
    AnnotationsUploaded {
        surface_id: FileId,
        responses: Vec<CreateAnnotationResponseDto>,
    },
}

impl ProjectAction {
    /// Get a human-readable description of this action
    pub fn description(&self) -> String {
        match self {
            ProjectAction::AdaptVolumes(_) => "Edit volumes".to_string(),
            ProjectAction::AdaptSurfaces(_) => "Edit surfaces".to_string(),
            ProjectAction::ActivateVolume(volume) => format!("Select '{}'", volume.name()),
            ProjectAction::ActivateSurface(surface) => format!("Select '{}'", surface.name()),
            ProjectAction::AddLocalFiles(files) => format!("Add {} files", files.len()),
            ProjectAction::DeleteFile(name) => format!("Delete '{}'", name),
            ProjectAction::AddOverlay { file, .. } => format!("Add overlay '{}'", file.name),
            ProjectAction::AddAnnotation { file, .. } => format!("Add annotation '{}'", file.name),
            ProjectAction::DeleteOverlay { overlay, .. } => {
                format!("Delete overlay '{}'", overlay.name())
            }
            ProjectAction::DeleteAnnotation { annotation, .. } => {
                format!("Delete annotation '{}'", annotation.name())
            }
            ProjectAction::ToggleOverlay { overlay, .. } => {
                format!("Toggle overlay '{}'", overlay.name())
            }
            ProjectAction::ToggleAnnotation { annotation, .. } => {
                format!("Toggle annotation '{}'", annotation.name())
            }
            ProjectAction::SetVolumeOpacity { volume, .. } => {
                format!("Change opacity of '{}'", volume.name())
            }
            ProjectAction::CachePointSets(sets) => format!("Cache {} point sets", sets.len()),
            ProjectAction::VolumesUploaded(responses) => {
                format!("Upload {} volumes", responses.len())
            }
            ProjectAction::SurfacesUploaded(responses) => {
                format!("Upload {} surfaces", responses.len())
            }
            ProjectAction::OverlaysUploaded { responses, .. } => {
                format!("Upload {} overlays", responses.len())
            }
            ProjectAction::AnnotationsUploaded { responses, .. } => {
                format!("Upload {} annotations", responses.len())
            }
        }
    }

    /// Upload completions reflect backend state and cannot be undone.
    pub fn is_undoable(&self) -> bool {
        !matches!(
            self,
            ProjectAction::VolumesUploaded(_)
                | ProjectAction::SurfacesUploaded(_)
                | ProjectAction::OverlaysUploaded { .. }
                | ProjectAction::AnnotationsUploaded { .. }
        )
    }

    /// Compute the snapshot that follows `files`.
    pub fn apply(&self, files: &ProjectFiles, types: &FileTypes) -> Result<ProjectFiles> {
        let next = match self {
            ProjectAction::AdaptVolumes(volumes) => files.from_adapted_volumes(volumes.clone()),
            ProjectAction::AdaptSurfaces(surfaces) => files.from_adapted_surfaces(surfaces.clone()),
            ProjectAction::ActivateVolume(volume) => files.from_one_volume_activated(volume),
            ProjectAction::ActivateSurface(surface) => files.from_one_surface_activated(surface),
            ProjectAction::AddLocalFiles(raw) => files.from_added_local_files_with(raw, types),
            ProjectAction::DeleteFile(name) => files.from_deleted_file(name),
            ProjectAction::AddOverlay { surface, file } => {
                files.from_added_local_surface_overlay(surface, file)
            }
            ProjectAction::AddAnnotation { surface, file } => {
                files.from_added_local_surface_annotation(surface, file)
            }
            ProjectAction::DeleteOverlay { surface, overlay } => {
                files.from_deleted_overlay(surface, overlay)
            }
            ProjectAction::DeleteAnnotation {
                surface,
                annotation,
            } => files.from_deleted_annotation(surface, annotation),
            ProjectAction::ToggleOverlay { surface, overlay } => {
                files.from_is_active_overlay(surface, overlay)
            }
            ProjectAction::ToggleAnnotation {
                surface,
                annotation,
            } => files.from_is_active_annotation(surface, annotation),
            ProjectAction::SetVolumeOpacity { volume, opacity } => {
                files.from_volume_opacity(volume, *opacity)
            }
            ProjectAction::CachePointSets(sets) => files.from_cached_point_sets(sets.clone()),
            ProjectAction::VolumesUploaded(responses) => files.from_uploaded_volumes(responses)?,
            ProjectAction::SurfacesUploaded(responses) => files.from_uploaded_surfaces(responses)?,
            ProjectAction::OverlaysUploaded {
                surface_id,
                responses,
            } => files.from_uploaded_overlays(*surface_id, responses)?,
            ProjectAction::AnnotationsUploaded {
                surface_id,
                responses,
            } => files.from_uploaded_annotations(*surface_id, responses)?,
        };
        Ok(next)
    }
}

/// Owns the current project snapshot and its undo history.
///
/// Undo only covers user edits since the last backend sync: hydrating a
/// project or applying an upload completion clears the history, since older
/// snapshots would bring back files the backend already owns.
#[derive(Debug, Clone, Default)]
pub struct ProjectSession {
    current: ProjectFiles,
    history: ProjectHistory,
    file_types: FileTypes,
}

impl ProjectSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &AppConfig) -> Self {
        Self {
            current: ProjectFiles::new(),
            history: ProjectHistory::with_options(HistoryOptions {
                max_history: config.history.max_history,
            }),
            file_types: config.file_types(),
        }
    }

    pub fn current(&self) -> &ProjectFiles {
        &self.current
    }

    pub fn history(&self) -> &ProjectHistory {
        &self.history
    }

    /// Replace the session contents with a backend project.
    pub fn hydrate(&mut self, project: &GetProjectDto) -> Result<&ProjectFiles> {
        match ProjectFiles::from_backend(project) {
            Ok(files) => {
                log::info!(
                    "Loaded project with {} volumes and {} surfaces",
                    files.volumes().len(),
                    files.surfaces().len()
                );
                self.current = files;
                self.history.clear();
                Ok(&self.current)
            }
            Err(e) => {
                log::error!("Failed to load project: {}", e);
                Err(e)
            }
        }
    }

    /// Apply `action` to the current snapshot. On error the current
    /// snapshot stays as it was.
    pub fn dispatch(&mut self, action: ProjectAction) -> Result<&ProjectFiles> {
        let next = match action.apply(&self.current, &self.file_types) {
            Ok(next) => next,
            Err(e) => {
                if e.is_contract_violation() {
                    log::error!("{} failed: {}", action.description(), e);
                } else {
                    log::warn!("{} failed: {}", action.description(), e);
                }
                return Err(e);
            }
        };

        if !action.is_undoable() {
            self.history.clear();
        } else if next != self.current {
            self.history.record(action.description(), self.current.clone());
        }
        self.current = next;
        Ok(&self.current)
    }

    /// Returns false if there was nothing to undo. Local files the undo
    /// removes are tombstoned like deleted ones.
    pub fn undo(&mut self) -> bool {
        match self.history.undo(&self.current) {
            Some(previous) => {
                self.current = self.current.from_restored(&previous);
                true
            }
            None => false,
        }
    }

    /// Returns false if there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.history.redo(&self.current) {
            Some(next) => {
                self.current = self.current.from_restored(&next);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::GetProjectSurfaceDto;
    use crate::error::ProjectFilesError;

    fn raw(name: &str) -> RawFile {
        RawFile::new(name, 100)
    }

    fn volume_response(name: &str) -> CreateVolumeResponseDto {
        CreateVolumeResponseDto {
            id: Some(9),
            file_name: Some(name.into()),
            file_size: Some(100),
            order: Some(0),
            opacity: Some(100.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_dispatch_and_undo() {
        let mut session = ProjectSession::new();
        session
            .dispatch(ProjectAction::AddLocalFiles(vec![raw("t1.nii"), raw("lh.pial")]))
            .unwrap();
        session
            .dispatch(ProjectAction::DeleteFile("t1.nii".into()))
            .unwrap();
        assert_eq!(session.current().all().len(), 1);
        assert_eq!(session.history().undo_description(), Some("Delete 't1.nii'"));

        assert!(session.undo());
        assert_eq!(session.current().all().len(), 2);
        assert!(session.undo());
        assert!(session.current().is_empty());
        assert!(!session.undo());

        assert!(session.redo());
        assert_eq!(session.current().all().len(), 2);
    }

    #[test]
    fn test_upload_after_undone_add_is_absorbed() {
        let mut session = ProjectSession::new();
        session
            .dispatch(ProjectAction::AddLocalFiles(vec![raw("t1.nii")]))
            .unwrap();
        assert!(session.undo());
        assert!(session.current().is_tombstoned("t1.nii"));

        session
            .dispatch(ProjectAction::VolumesUploaded(vec![volume_response("t1.nii")]))
            .unwrap();
        assert!(session.current().is_empty());
        assert!(!session.current().is_tombstoned("t1.nii"));
    }

    #[test]
    fn test_upload_after_redone_add_transfers() {
        let mut session = ProjectSession::new();
        session
            .dispatch(ProjectAction::AddLocalFiles(vec![raw("t1.nii")]))
            .unwrap();
        assert!(session.undo());
        assert!(session.redo());
        assert!(!session.current().is_tombstoned("t1.nii"));

        session
            .dispatch(ProjectAction::VolumesUploaded(vec![volume_response("t1.nii")]))
            .unwrap();
        assert_eq!(session.current().cloud_volumes().len(), 1);
        assert_eq!(session.current().cloud_volumes()[0].id, 9);
    }

    #[test]
    fn test_undo_of_delete_revives_upload() {
        let mut session = ProjectSession::new();
        session
            .dispatch(ProjectAction::AddLocalFiles(vec![raw("t1.nii")]))
            .unwrap();
        session
            .dispatch(ProjectAction::DeleteFile("t1.nii".into()))
            .unwrap();
        assert!(session.current().is_tombstoned("t1.nii"));

        assert!(session.undo());
        assert_eq!(session.current().local_volumes().len(), 1);
        assert!(!session.current().is_tombstoned("t1.nii"));

        session
            .dispatch(ProjectAction::VolumesUploaded(vec![volume_response("t1.nii")]))
            .unwrap();
        assert_eq!(session.current().cloud_volumes().len(), 1);
    }

    #[test]
    fn test_hydrate_drops_tombstones() {
        let mut session = ProjectSession::new();
        session
            .dispatch(ProjectAction::AddLocalFiles(vec![raw("t1.nii")]))
            .unwrap();
        session
            .dispatch(ProjectAction::DeleteFile("t1.nii".into()))
            .unwrap();
        session.hydrate(&GetProjectDto::default()).unwrap();
        assert!(!session.current().is_tombstoned("t1.nii"));
    }

    #[test]
    fn test_noop_is_not_recorded() {
        let mut session = ProjectSession::new();
        session
            .dispatch(ProjectAction::DeleteFile("missing.nii".into()))
            .unwrap();
        assert!(!session.history().can_undo());
    }

    #[test]
    fn test_failed_action_keeps_state() {
        let mut session = ProjectSession::new();
        session
            .dispatch(ProjectAction::AddLocalFiles(vec![raw("t1.nii")]))
            .unwrap();
        let before = session.current().clone();

        let err = session
            .dispatch(ProjectAction::VolumesUploaded(vec![volume_response("t2.nii")]))
            .unwrap_err();
        assert!(matches!(err, ProjectFilesError::NoLocalFile { .. }));
        assert_eq!(session.current(), &before);
        assert!(session.history().can_undo());
    }

    #[test]
    fn test_upload_clears_history() {
        let mut session = ProjectSession::new();
        session
            .dispatch(ProjectAction::AddLocalFiles(vec![raw("t1.nii")]))
            .unwrap();
        session
            .dispatch(ProjectAction::VolumesUploaded(vec![volume_response("t1.nii")]))
            .unwrap();

        assert_eq!(session.current().cloud_volumes().len(), 1);
        assert!(!session.history().can_undo());
        assert!(!session.undo());
    }

    #[test]
    fn test_hydrate() {
        let mut session = ProjectSession::new();
        session
            .dispatch(ProjectAction::AddLocalFiles(vec![raw("t1.nii")]))
            .unwrap();

        let project = GetProjectDto {
            surfaces: Some(vec![GetProjectSurfaceDto {
                id: Some(1),
                file_name: Some("lh.pial".into()),
                file_size: Some(10),
                ..Default::default()
            }]),
            ..Default::default()
        };
        session.hydrate(&project).unwrap();
        assert_eq!(session.current().cloud_surfaces().len(), 1);
        assert!(session.current().local_volumes().is_empty());
        assert!(!session.history().can_undo());

        let broken = GetProjectDto {
            surfaces: Some(vec![GetProjectSurfaceDto::default()]),
            ..Default::default()
        };
        assert!(session.hydrate(&broken).is_err());
        assert_eq!(session.current().cloud_surfaces().len(), 1);
    }

    #[test]
    fn test_config_file_types() {
        let config = AppConfig::from_json(
            r#"{ "version": 1, "file_types": { "volume_extensions": ["nrrd"] } }"#,
        )
        .unwrap();
        let mut session = ProjectSession::with_config(&config);
        session
            .dispatch(ProjectAction::AddLocalFiles(vec![raw("head.nrrd"), raw("t1.nii")]))
            .unwrap();
        assert_eq!(session.current().local_volumes().len(), 1);
        assert_eq!(session.current().local_volumes()[0].name(), "head.nrrd");
    }

    #[test]
    fn test_descriptions() {
        let action = ProjectAction::SetVolumeOpacity {
            volume: crate::model::LocalVolumeFile::new(raw("t1.nii")).into(),
            opacity: 40.0,
        };
        assert_eq!(action.description(), "Change opacity of 't1.nii'");
        assert!(action.is_undoable());
        assert!(!ProjectAction::SurfacesUploaded(Vec::new()).is_undoable());
    }
}
