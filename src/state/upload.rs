//! Upload completions: the only place where files move from the local to
//! the cloud lifecycle domain.
//!
//! Upload responses may arrive in any order and interleaved with user
//! actions. A response is matched to its local file by name. While a name
//! has tombstones (local files removed by delete or undo), responses for
//! it are dropped, one per tombstone, before any same-named local file is
//! considered. Otherwise a response without a local file is a contract
//! violation. Either way the current snapshot is never partially updated.

use std::collections::BTreeMap;

use crate::dto::{
    CreateAnnotationResponseDto, CreateOverlayResponseDto, CreateSurfaceResponseDto,
    CreateVolumeResponseDto,
};
use crate::error::{ProjectFilesError, Result, required};
use crate::model::{
    AnnotationFile, CloudAnnotationFile, CloudOverlayFile, CloudSurfaceFile, CloudVolumeFile,
    FileId, FileType, OverlayFile,
};
use crate::state::project_files::consume_tombstone;
use crate::state::{ProjectFiles, ProjectFilesOverrides};

/// Outcome of matching one upload response against the local files.
enum Match {
    Found(usize),
    Discarded,
}

/// Find the local file a response belongs to. A pending tombstone for the
/// name is consumed first: the oldest upload for a name answers first.
fn match_local(
    position: Option<usize>,
    tombstones: &mut BTreeMap<String, usize>,
    kind: FileType,
    name: &str,
) -> Result<Match> {
    if consume_tombstone(tombstones, name) {
        log::info!("Discarding upload response for removed {} '{}'", kind, name);
        return Ok(Match::Discarded);
    }
    match position {
        Some(index) => Ok(Match::Found(index)),
        None => Err(ProjectFilesError::no_local_file(kind, name)),
    }
}

impl ProjectFiles {
    /// Replace uploaded local surfaces by their cloud counterparts.
    pub fn from_uploaded_surfaces(
        &self,
        responses: &[CreateSurfaceResponseDto],
    ) -> Result<ProjectFiles> {
        const ENTITY: &str = "CreateSurfaceResponseDto";
        let mut local_surfaces = self.local_surfaces().to_vec();
        let mut cloud_surfaces = self.cloud_surfaces().to_vec();
        let mut tombstones = self.tombstone_counts().clone();

        for response in responses {
            required(response.id, ENTITY, "id")?;
            let name = required(response.file_name.as_deref(), ENTITY, "fileName")?;

            let position = local_surfaces.iter().position(|s| s.name() == name);
            match match_local(position, &mut tombstones, FileType::Surface, name)? {
                Match::Found(index) => {
                    let cloud = CloudSurfaceFile::from_response(response, &local_surfaces[index])?;
                    local_surfaces.remove(index);
                    cloud_surfaces.push(cloud);
                }
                Match::Discarded => {}
            }
        }

        log::info!("Uploaded {} surfaces", responses.len());
        Ok(ProjectFiles::from_instance(
            self,
            ProjectFilesOverrides::new()
                .local_surfaces(local_surfaces)
                .cloud_surfaces(cloud_surfaces)
                .tombstones(tombstones),
        ))
    }

    /// Replace uploaded local volumes by their cloud counterparts.
    ///
    /// Volume responses must carry `id`, `fileName`, `fileSize`, `order` and
    /// `opacity`. Activity and visibility flags are taken from the local file.
    pub fn from_uploaded_volumes(
        &self,
        responses: &[CreateVolumeResponseDto],
    ) -> Result<ProjectFiles> {
        const ENTITY: &str = "CreateVolumeResponseDto";
        let mut local_volumes = self.local_volumes().to_vec();
        let mut cloud_volumes = self.cloud_volumes().to_vec();
        let mut tombstones = self.tombstone_counts().clone();

        for response in responses {
            required(response.id, ENTITY, "id")?;
            let name = required(response.file_name.as_deref(), ENTITY, "fileName")?;
            required(response.file_size, ENTITY, "fileSize")?;
            required(response.order, ENTITY, "order")?;
            required(response.opacity, ENTITY, "opacity")?;

            let position = local_volumes.iter().position(|v| v.name() == name);
            match match_local(position, &mut tombstones, FileType::Volume, name)? {
                Match::Found(index) => {
                    let cloud = CloudVolumeFile::from_response(response, &local_volumes[index])?;
                    local_volumes.remove(index);
                    cloud_volumes.push(cloud);
                }
                Match::Discarded => {}
            }
        }

        log::info!("Uploaded {} volumes", responses.len());
        Ok(ProjectFiles::from_instance(
            self,
            ProjectFilesOverrides::new()
                .local_volumes(local_volumes)
                .cloud_volumes(cloud_volumes)
                .tombstones(tombstones),
        ))
    }

    /// Swap the uploaded local overlays of one cloud surface for their cloud
    /// counterparts. Overlays without a matching response stay local, and an
    /// unknown surface id leaves the snapshot unchanged.
    pub fn from_uploaded_overlays(
        &self,
        surface_id: FileId,
        responses: &[CreateOverlayResponseDto],
    ) -> Result<ProjectFiles> {
        let Some(surface) = self.cloud_surface(surface_id) else {
            log::warn!("Overlay upload for unknown surface {} ignored", surface_id);
            return Ok(self.clone());
        };

        let overlay_files = surface
            .overlay_files
            .iter()
            .map(|overlay| {
                let OverlayFile::Local(local) = overlay else {
                    return Ok(overlay.clone());
                };
                match responses
                    .iter()
                    .find(|dto| dto.file_name.as_deref() == Some(local.file.name.as_str()))
                {
                    Some(dto) => CloudOverlayFile::from_response(dto).map(OverlayFile::Cloud),
                    None => Ok(overlay.clone()),
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(self.map_cloud_surface(surface_id, |s| s.with_overlay_files(overlay_files.clone())))
    }

    /// Swap the uploaded local annotations of one cloud surface for their
    /// cloud counterparts, with the same rules as overlays.
    pub fn from_uploaded_annotations(
        &self,
        surface_id: FileId,
        responses: &[CreateAnnotationResponseDto],
    ) -> Result<ProjectFiles> {
        let Some(surface) = self.cloud_surface(surface_id) else {
            log::warn!("Annotation upload for unknown surface {} ignored", surface_id);
            return Ok(self.clone());
        };

        let annotation_files = surface
            .annotation_files
            .iter()
            .map(|annotation| {
                let AnnotationFile::Local(local) = annotation else {
                    return Ok(annotation.clone());
                };
                match responses
                    .iter()
                    .find(|dto| dto.file_name.as_deref() == Some(local.file.name.as_str()))
                {
                    Some(dto) => CloudAnnotationFile::from_response(dto).map(AnnotationFile::Cloud),
                    None => Ok(annotation.clone()),
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(self.map_cloud_surface(surface_id, |s| {
            s.with_annotation_files(annotation_files.clone())
        }))
    }
}
