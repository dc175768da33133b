//! The project file aggregate: an immutable snapshot of every volume and
//! surface of a project, split into local and cloud collections.
//!
//! A snapshot is never changed after construction. Every user action
//! produces a new snapshot (see the `from_*` transitions), and collections
//! the action did not touch are shared with the previous snapshot through
//! [`Arc`], so older snapshots stay valid and cheap to keep around.
//!
//! # Views
//!
//! Besides the four base collections, a snapshot caches three derived views
//! in a fixed order (local before cloud, surfaces before volumes):
//!
//! - `surfaces` = local surfaces + cloud surfaces
//! - `volumes` = local volumes + cloud volumes
//! - `all` = surfaces + volumes
//!
//! A view is only rebuilt when one of its inputs was replaced.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::dto::{GetProjectDto, GetProjectSurfaceDto, GetProjectVolumeDto};
use crate::error::Result;
use crate::model::{
    CloudSurfaceFile, CloudVolumeFile, FileId, LocalSurfaceFile, LocalVolumeFile, PointSetFile,
    ProjectFile, SurfaceFile, VolumeFile,
};

/// Immutable snapshot of a project's file inventory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectFiles {
    local_surfaces: Arc<Vec<LocalSurfaceFile>>,
    local_volumes: Arc<Vec<LocalVolumeFile>>,
    cloud_surfaces: Arc<Vec<CloudSurfaceFile>>,
    cloud_volumes: Arc<Vec<CloudVolumeFile>>,
    cached_point_sets: Arc<Vec<PointSetFile>>,
    /// Local files removed while their upload may still be in flight, as a
    /// count per name. Each count is consumed by one upload response. A
    /// file deleted before its upload started leaves a count nothing
    /// consumes; it lasts until the next `from_backend` snapshot.
    tombstones: Arc<BTreeMap<String, usize>>,

    surfaces: Arc<Vec<SurfaceFile>>,
    volumes: Arc<Vec<VolumeFile>>,
    all: Arc<Vec<ProjectFile>>,
}

/// Base collections to replace when deriving a snapshot from another one.
///
/// Collections left unset are inherited from the source snapshot without
/// copying.
#[derive(Debug, Clone, Default)]
pub struct ProjectFilesOverrides {
    local_surfaces: Option<Vec<LocalSurfaceFile>>,
    local_volumes: Option<Vec<LocalVolumeFile>>,
    cloud_surfaces: Option<Vec<CloudSurfaceFile>>,
    cloud_volumes: Option<Vec<CloudVolumeFile>>,
    cached_point_sets: Option<Vec<PointSetFile>>,
    tombstones: Option<BTreeMap<String, usize>>,
}

impl ProjectFilesOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn local_surfaces(mut self, files: Vec<LocalSurfaceFile>) -> Self {
        self.local_surfaces = Some(files);
        self
    }

    pub fn local_volumes(mut self, files: Vec<LocalVolumeFile>) -> Self {
        self.local_volumes = Some(files);
        self
    }

    pub fn cloud_surfaces(mut self, files: Vec<CloudSurfaceFile>) -> Self {
        self.cloud_surfaces = Some(files);
        self
    }

    pub fn cloud_volumes(mut self, files: Vec<CloudVolumeFile>) -> Self {
        self.cloud_volumes = Some(files);
        self
    }

    pub fn cached_point_sets(mut self, point_sets: Vec<PointSetFile>) -> Self {
        self.cached_point_sets = Some(point_sets);
        self
    }

    pub(crate) fn tombstones(mut self, tombstones: BTreeMap<String, usize>) -> Self {
        self.tombstones = Some(tombstones);
        self
    }

    fn touches_surfaces(&self) -> bool {
        self.local_surfaces.is_some() || self.cloud_surfaces.is_some()
    }

    fn touches_volumes(&self) -> bool {
        self.local_volumes.is_some() || self.cloud_volumes.is_some()
    }
}

/// Use the override if present, otherwise share the source collection.
fn inherit<T>(replacement: Option<T>, source: &Arc<T>) -> Arc<T> {
    replacement.map_or_else(|| Arc::clone(source), Arc::new)
}

pub(crate) fn add_tombstone(tombstones: &mut BTreeMap<String, usize>, name: &str) {
    *tombstones.entry(name.to_string()).or_insert(0) += 1;
}

/// Take one tombstone for `name`. Returns false if there was none.
pub(crate) fn consume_tombstone(tombstones: &mut BTreeMap<String, usize>, name: &str) -> bool {
    match tombstones.get_mut(name) {
        Some(count) if *count > 1 => {
            *count -= 1;
            true
        }
        Some(_) => {
            tombstones.remove(name);
            true
        }
        None => false,
    }
}

impl ProjectFiles {
    /// Create an empty project.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hydrate a project from the backend's snapshot. Every file starts as a
    /// cloud file; the local collections are empty.
    pub fn from_backend(backend_state: &GetProjectDto) -> Result<Self> {
        let cloud_volumes = Self::cloud_files_from_volume_dtos(backend_state.volumes.as_deref())?;
        let cloud_surfaces =
            Self::cloud_files_from_surface_dtos(backend_state.surfaces.as_deref())?;

        log::info!(
            "Hydrated project {:?}: {} volumes, {} surfaces",
            backend_state.name.as_deref().unwrap_or("<unnamed>"),
            cloud_volumes.len(),
            cloud_surfaces.len()
        );

        Ok(Self::from_instance(
            &Self::new(),
            ProjectFilesOverrides::new()
                .cloud_volumes(cloud_volumes)
                .cloud_surfaces(cloud_surfaces),
        ))
    }

    /// Derive a snapshot from `source`, replacing the given collections.
    ///
    /// The `surfaces` view is rebuilt only if a surface collection was
    /// replaced, `volumes` only if a volume collection was, and `all` only if
    /// either was.
    pub fn from_instance(source: &ProjectFiles, overrides: ProjectFilesOverrides) -> Self {
        let touches_surfaces = overrides.touches_surfaces();
        let touches_volumes = overrides.touches_volumes();

        let local_surfaces = inherit(overrides.local_surfaces, &source.local_surfaces);
        let local_volumes = inherit(overrides.local_volumes, &source.local_volumes);
        let cloud_surfaces = inherit(overrides.cloud_surfaces, &source.cloud_surfaces);
        let cloud_volumes = inherit(overrides.cloud_volumes, &source.cloud_volumes);
        let cached_point_sets = inherit(overrides.cached_point_sets, &source.cached_point_sets);
        let tombstones = inherit(overrides.tombstones, &source.tombstones);

        let surfaces = if touches_surfaces {
            Arc::new(
                local_surfaces
                    .iter()
                    .cloned()
                    .map(SurfaceFile::Local)
                    .chain(cloud_surfaces.iter().cloned().map(SurfaceFile::Cloud))
                    .collect(),
            )
        } else {
            Arc::clone(&source.surfaces)
        };

        let volumes = if touches_volumes {
            Arc::new(
                local_volumes
                    .iter()
                    .cloned()
                    .map(VolumeFile::Local)
                    .chain(cloud_volumes.iter().cloned().map(VolumeFile::Cloud))
                    .collect(),
            )
        } else {
            Arc::clone(&source.volumes)
        };

        let all = if touches_surfaces || touches_volumes {
            Arc::new(
                surfaces
                    .iter()
                    .cloned()
                    .map(ProjectFile::Surface)
                    .chain(volumes.iter().cloned().map(ProjectFile::Volume))
                    .collect(),
            )
        } else {
            Arc::clone(&source.all)
        };

        Self {
            local_surfaces,
            local_volumes,
            cloud_surfaces,
            cloud_volumes,
            cached_point_sets,
            tombstones,
            surfaces,
            volumes,
            all,
        }
    }

    fn cloud_files_from_volume_dtos(
        dtos: Option<&[GetProjectVolumeDto]>,
    ) -> Result<Vec<CloudVolumeFile>> {
        dtos.unwrap_or_default()
            .iter()
            .map(CloudVolumeFile::from_dto)
            .collect()
    }

    fn cloud_files_from_surface_dtos(
        dtos: Option<&[GetProjectSurfaceDto]>,
    ) -> Result<Vec<CloudSurfaceFile>> {
        dtos.unwrap_or_default()
            .iter()
            .map(CloudSurfaceFile::from_dto)
            .collect()
    }

    // ------------------------------------------------------------------
    // Collections and views
    // ------------------------------------------------------------------

    pub fn local_surfaces(&self) -> &[LocalSurfaceFile] {
        &self.local_surfaces
    }

    pub fn local_volumes(&self) -> &[LocalVolumeFile] {
        &self.local_volumes
    }

    pub fn cloud_surfaces(&self) -> &[CloudSurfaceFile] {
        &self.cloud_surfaces
    }

    pub fn cloud_volumes(&self) -> &[CloudVolumeFile] {
        &self.cloud_volumes
    }

    pub fn cached_point_sets(&self) -> &[PointSetFile] {
        &self.cached_point_sets
    }

    /// Local surfaces followed by cloud surfaces.
    pub fn surfaces(&self) -> &[SurfaceFile] {
        &self.surfaces
    }

    /// Local volumes followed by cloud volumes.
    pub fn volumes(&self) -> &[VolumeFile] {
        &self.volumes
    }

    /// Every surface followed by every volume.
    pub fn all(&self) -> &[ProjectFile] {
        &self.all
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.all.iter().any(|file| file.name() == name)
    }

    pub fn active_volume(&self) -> Option<&VolumeFile> {
        self.volumes.iter().find(|volume| volume.is_active())
    }

    pub fn active_surface(&self) -> Option<&SurfaceFile> {
        self.surfaces.iter().find(|surface| surface.is_active())
    }

    pub fn cloud_surface(&self, id: FileId) -> Option<&CloudSurfaceFile> {
        self.cloud_surfaces.iter().find(|surface| surface.id == id)
    }

    /// Whether an upload response for `name` would be discarded because the
    /// local file was deleted.
    pub fn is_tombstoned(&self, name: &str) -> bool {
        self.tombstone_count(name) > 0
    }

    /// Number of upload responses for `name` that will be discarded.
    pub fn tombstone_count(&self, name: &str) -> usize {
        self.tombstones.get(name).copied().unwrap_or(0)
    }

    pub(crate) fn tombstone_counts(&self) -> &BTreeMap<String, usize> {
        &self.tombstones
    }

    /// Serialize the views a viewer renders from.
    pub fn to_json(&self) -> Result<String> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct View<'a> {
            surfaces: &'a [SurfaceFile],
            volumes: &'a [VolumeFile],
            point_sets: &'a [PointSetFile],
        }

        let view = View {
            surfaces: self.surfaces(),
            volumes: self.volumes(),
            point_sets: self.cached_point_sets(),
        };
        Ok(serde_json::to_string(&view)?)
    }
}
