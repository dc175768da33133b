//! Browser bindings.
//!
//! JavaScript drives a [`ProjectFilesHandle`]: backend payloads go in as
//! JSON strings, picked files as `File`/`FileList` objects, and files
//! already in the project are addressed by name. The rendered views come
//! back as JSON.

use wasm_bindgen::prelude::*;

use crate::config::AppConfig;
use crate::dto::{
    CreateAnnotationResponseDto, CreateOverlayResponseDto, CreateSurfaceResponseDto,
    CreateVolumeResponseDto, GetProjectDto,
};
use crate::model::{AnnotationFile, FileId, OverlayFile, RawFile, SurfaceFile, VolumeFile};
use crate::session::{ProjectAction, ProjectSession};

#[wasm_bindgen(start)]
pub fn start() {
    let config = AppConfig::load_from_local_storage().unwrap_or_default();
    crate::logging::init(config.log_level);
    log::info!("{} WASM starting...", config.app_name);
}

fn not_found(kind: &str, name: &str) -> JsError {
    JsError::new(&format!("No {} named '{}' in the project", kind, name))
}

fn raw_files(files: &web_sys::FileList) -> Vec<RawFile> {
    (0..files.length())
        .filter_map(|i| files.get(i))
        .map(|file| RawFile::from(&file))
        .collect()
}

/// A project session owned by the page.
#[wasm_bindgen]
pub struct ProjectFilesHandle {
    session: ProjectSession,
}

#[wasm_bindgen]
impl ProjectFilesHandle {
    #[wasm_bindgen(constructor)]
    pub fn new() -> ProjectFilesHandle {
        let config = AppConfig::load_from_local_storage().unwrap_or_default();
        Self {
            session: ProjectSession::with_config(&config),
        }
    }

    /// Load a project as returned by the backend.
    pub fn hydrate(&mut self, project_json: &str) -> Result<(), JsError> {
        let project = GetProjectDto::from_json(project_json)?;
        self.session.hydrate(&project)?;
        Ok(())
    }

    /// Current surfaces, volumes and point sets as JSON.
    pub fn snapshot(&self) -> Result<String, JsError> {
        Ok(self.session.current().to_json()?)
    }

    #[wasm_bindgen(js_name = addFiles)]
    pub fn add_files(&mut self, files: &web_sys::FileList) -> Result<(), JsError> {
        self.dispatch(ProjectAction::AddLocalFiles(raw_files(files)))
    }

    #[wasm_bindgen(js_name = deleteFile)]
    pub fn delete_file(&mut self, name: &str) -> Result<(), JsError> {
        self.dispatch(ProjectAction::DeleteFile(name.to_string()))
    }

    #[wasm_bindgen(js_name = activateVolume)]
    pub fn activate_volume(&mut self, name: &str) -> Result<(), JsError> {
        let volume = self.volume(name)?;
        self.dispatch(ProjectAction::ActivateVolume(volume))
    }

    #[wasm_bindgen(js_name = activateSurface)]
    pub fn activate_surface(&mut self, name: &str) -> Result<(), JsError> {
        let surface = self.surface(name)?;
        self.dispatch(ProjectAction::ActivateSurface(surface))
    }

    #[wasm_bindgen(js_name = setVolumeOpacity)]
    pub fn set_volume_opacity(&mut self, name: &str, opacity: f32) -> Result<(), JsError> {
        let volume = self.volume(name)?;
        self.dispatch(ProjectAction::SetVolumeOpacity { volume, opacity })
    }

    #[wasm_bindgen(js_name = addOverlay)]
    pub fn add_overlay(&mut self, surface: &str, file: &web_sys::File) -> Result<(), JsError> {
        let surface = self.surface(surface)?;
        self.dispatch(ProjectAction::AddOverlay {
            surface,
            file: RawFile::from(file),
        })
    }

    #[wasm_bindgen(js_name = addAnnotation)]
    pub fn add_annotation(&mut self, surface: &str, file: &web_sys::File) -> Result<(), JsError> {
        let surface = self.surface(surface)?;
        self.dispatch(ProjectAction::AddAnnotation {
            surface,
            file: RawFile::from(file),
        })
    }

    #[wasm_bindgen(js_name = deleteOverlay)]
    pub fn delete_overlay(&mut self, surface: &str, overlay: &str) -> Result<(), JsError> {
        let (surface, overlay) = self.overlay(surface, overlay)?;
        self.dispatch(ProjectAction::DeleteOverlay { surface, overlay })
    }

    #[wasm_bindgen(js_name = deleteAnnotation)]
    pub fn delete_annotation(&mut self, surface: &str, annotation: &str) -> Result<(), JsError> {
        let (surface, annotation) = self.annotation(surface, annotation)?;
        self.dispatch(ProjectAction::DeleteAnnotation {
            surface,
            annotation,
        })
    }

    #[wasm_bindgen(js_name = toggleOverlay)]
    pub fn toggle_overlay(&mut self, surface: &str, overlay: &str) -> Result<(), JsError> {
        let (surface, overlay) = self.overlay(surface, overlay)?;
        self.dispatch(ProjectAction::ToggleOverlay { surface, overlay })
    }

    #[wasm_bindgen(js_name = toggleAnnotation)]
    pub fn toggle_annotation(&mut self, surface: &str, annotation: &str) -> Result<(), JsError> {
        let (surface, annotation) = self.annotation(surface, annotation)?;
        self.dispatch(ProjectAction::ToggleAnnotation {
            surface,
            annotation,
        })
    }

    #[wasm_bindgen(js_name = volumesUploaded)]
    pub fn volumes_uploaded(&mut self, responses_json: &str) -> Result<(), JsError> {
        let responses = CreateVolumeResponseDto::list_from_json(responses_json)?;
        self.dispatch(ProjectAction::VolumesUploaded(responses))
    }

    #[wasm_bindgen(js_name = surfacesUploaded)]
    pub fn surfaces_uploaded(&mut self, responses_json: &str) -> Result<(), JsError> {
        let responses = CreateSurfaceResponseDto::list_from_json(responses_json)?;
        self.dispatch(ProjectAction::SurfacesUploaded(responses))
    }

    #[wasm_bindgen(js_name = overlaysUploaded)]
    pub fn overlays_uploaded(
        &mut self,
        surface_id: FileId,
        responses_json: &str,
    ) -> Result<(), JsError> {
        let responses = CreateOverlayResponseDto::list_from_json(responses_json)?;
        self.dispatch(ProjectAction::OverlaysUploaded {
            surface_id,
            responses,
        })
    }

    #[wasm_bindgen(js_name = annotationsUploaded)]
    pub fn annotations_uploaded(
        &mut self,
        surface_id: FileId,
        responses_json: &str,
    ) -> Result<(), JsError> {
        let responses = CreateAnnotationResponseDto::list_from_json(responses_json)?;
        self.dispatch(ProjectAction::AnnotationsUploaded {
            surface_id,
            responses,
        })
    }

    pub fn undo(&mut self) -> bool {
        self.session.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.session.redo()
    }
}

impl ProjectFilesHandle {
    fn dispatch(&mut self, action: ProjectAction) -> Result<(), JsError> {
        self.session.dispatch(action)?;
        Ok(())
    }

    fn volume(&self, name: &str) -> Result<VolumeFile, JsError> {
        self.session
            .current()
            .volumes()
            .iter()
            .find(|v| v.name() == name)
            .cloned()
            .ok_or_else(|| not_found("volume", name))
    }

    fn surface(&self, name: &str) -> Result<SurfaceFile, JsError> {
        self.session
            .current()
            .surfaces()
            .iter()
            .find(|s| s.name() == name)
            .cloned()
            .ok_or_else(|| not_found("surface", name))
    }

    fn overlay(&self, surface: &str, name: &str) -> Result<(SurfaceFile, OverlayFile), JsError> {
        let surface = self.surface(surface)?;
        let overlay = surface
            .overlay_files()
            .iter()
            .find(|o| o.name() == name)
            .cloned()
            .ok_or_else(|| not_found("overlay", name))?;
        Ok((surface, overlay))
    }

    fn annotation(
        &self,
        surface: &str,
        name: &str,
    ) -> Result<(SurfaceFile, AnnotationFile), JsError> {
        let surface = self.surface(surface)?;
        let annotation = surface
            .annotation_files()
            .iter()
            .find(|a| a.name() == name)
            .cloned()
            .ok_or_else(|| not_found("annotation", name))?;
        Ok((surface, annotation))
    }
}

impl Default for ProjectFilesHandle {
    fn default() -> Self {
        Self::new()
    }
}
