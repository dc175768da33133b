//! User-driven transitions of the project file aggregate.
//!
//! Each transition borrows the current snapshot and returns a new one. None
//! of them fail: actions that do not apply (deleting a missing file,
//! activating an overlay of an unknown surface) return a snapshot equal to
//! the current one.

use std::collections::{BTreeSet, HashSet};

use crate::color_utils::palette_color;
use crate::model::{
    AnnotationFile, CloudSurfaceFile, CloudVolumeFile, FileId, FilePatch, FileType, FileTypes,
    LocalSurfaceFile, LocalVolumeFile, OverlayFile, PointSetFile, RawFile, SurfaceFile,
    VolumeFile,
};
use crate::state::project_files::{add_tombstone, consume_tombstone};
use crate::state::{ProjectFiles, ProjectFilesOverrides};

/// Keep the files for which `keep` holds, or None if nothing was removed.
fn retain_changed<T: Clone>(files: &[T], keep: impl Fn(&T) -> bool) -> Option<Vec<T>> {
    let kept: Vec<T> = files.iter().filter(|file| keep(*file)).cloned().collect();
    (kept.len() != files.len()).then_some(kept)
}

impl ProjectFiles {
    /// Replace the volume collections after the user edited volume metadata
    /// (order, visibility, opacity, ...). The list is split by lifecycle.
    pub fn from_adapted_volumes(&self, new_volumes: Vec<VolumeFile>) -> ProjectFiles {
        let mut local_volumes = Vec::new();
        let mut cloud_volumes = Vec::new();
        for volume in new_volumes {
            match volume {
                VolumeFile::Local(file) => local_volumes.push(file),
                VolumeFile::Cloud(file) => cloud_volumes.push(file),
            }
        }

        ProjectFiles::from_instance(
            self,
            ProjectFilesOverrides::new()
                .local_volumes(local_volumes)
                .cloud_volumes(cloud_volumes),
        )
    }

    /// Replace the surface collections after the user edited surface metadata.
    pub fn from_adapted_surfaces(&self, new_surfaces: Vec<SurfaceFile>) -> ProjectFiles {
        let mut local_surfaces = Vec::new();
        let mut cloud_surfaces = Vec::new();
        for surface in new_surfaces {
            match surface {
                SurfaceFile::Local(file) => local_surfaces.push(file),
                SurfaceFile::Cloud(file) => cloud_surfaces.push(file),
            }
        }

        ProjectFiles::from_instance(
            self,
            ProjectFilesOverrides::new()
                .local_surfaces(local_surfaces)
                .cloud_surfaces(cloud_surfaces),
        )
    }

    /// Highlight one volume: it becomes the only active file of the project,
    /// every other volume and every surface is deactivated.
    pub fn from_one_volume_activated(&self, volume: &VolumeFile) -> ProjectFiles {
        log::debug!("Activating volume '{}'", volume.name());

        let local_volumes = self
            .local_volumes()
            .iter()
            .map(|file| {
                let is_target = matches!(volume, VolumeFile::Local(t) if t.name() == file.name());
                file.from_patch(&FilePatch::new().active(is_target))
            })
            .collect();
        let cloud_volumes = self
            .cloud_volumes()
            .iter()
            .map(|file| {
                let is_target = matches!(volume, VolumeFile::Cloud(t) if t.id == file.id);
                file.from_patch(&FilePatch::new().active(is_target))
            })
            .collect();

        let mut overrides = ProjectFilesOverrides::new()
            .local_volumes(local_volumes)
            .cloud_volumes(cloud_volumes);
        if self.active_surface().is_some() {
            overrides = overrides
                .local_surfaces(self.deactivated_local_surfaces())
                .cloud_surfaces(self.deactivated_cloud_surfaces());
        }

        ProjectFiles::from_instance(self, overrides)
    }

    /// Highlight one surface: it becomes the only active file of the
    /// project, every other surface and every volume is deactivated.
    pub fn from_one_surface_activated(&self, surface: &SurfaceFile) -> ProjectFiles {
        log::debug!("Activating surface '{}'", surface.name());

        let local_surfaces = self
            .local_surfaces()
            .iter()
            .map(|file| {
                let is_target = surface.is_local_named(file.name());
                file.from_patch(&FilePatch::new().active(is_target))
            })
            .collect();
        let cloud_surfaces = self
            .cloud_surfaces()
            .iter()
            .map(|file| {
                let is_target = surface.is_cloud_with_id(file.id);
                file.from_patch(&FilePatch::new().active(is_target))
            })
            .collect();

        let mut overrides = ProjectFilesOverrides::new()
            .local_surfaces(local_surfaces)
            .cloud_surfaces(cloud_surfaces);
        if self.active_volume().is_some() {
            overrides = overrides
                .local_volumes(self.deactivated_local_volumes())
                .cloud_volumes(self.deactivated_cloud_volumes());
        }

        ProjectFiles::from_instance(self, overrides)
    }

    fn deactivated_local_surfaces(&self) -> Vec<LocalSurfaceFile> {
        let patch = FilePatch::new().active(false);
        self.local_surfaces().iter().map(|f| f.from_patch(&patch)).collect()
    }

    fn deactivated_cloud_surfaces(&self) -> Vec<CloudSurfaceFile> {
        let patch = FilePatch::new().active(false);
        self.cloud_surfaces().iter().map(|f| f.from_patch(&patch)).collect()
    }

    fn deactivated_local_volumes(&self) -> Vec<LocalVolumeFile> {
        let patch = FilePatch::new().active(false);
        self.local_volumes().iter().map(|f| f.from_patch(&patch)).collect()
    }

    fn deactivated_cloud_volumes(&self) -> Vec<CloudVolumeFile> {
        let patch = FilePatch::new().active(false);
        self.cloud_volumes().iter().map(|f| f.from_patch(&patch)).collect()
    }

    /// Add files dropped by the user, classified with the default extension tables.
    pub fn from_added_local_files(&self, files: &[RawFile]) -> ProjectFiles {
        self.from_added_local_files_with(files, &FileTypes::default())
    }

    /// Add files dropped by the user as local volumes and surfaces.
    ///
    /// Files whose name is already taken (by any project file or by an
    /// earlier file of the same batch) and files with an unrecognized
    /// extension are skipped. Re-adding a deleted name keeps its tombstones,
    /// since the deleted file's upload response may still arrive.
    pub fn from_added_local_files_with(
        &self,
        files: &[RawFile],
        types: &FileTypes,
    ) -> ProjectFiles {
        let mut taken: HashSet<&str> = self.all().iter().map(|file| file.name()).collect();
        let mut new_volumes = Vec::new();
        let mut new_surfaces = Vec::new();

        for file in files {
            let Some(file_type) = types.classify(&file.name) else {
                log::debug!("Skipping file with unknown extension: {}", file.name);
                continue;
            };
            if !taken.insert(file.name.as_str()) {
                log::debug!("Skipping file with duplicate name: {}", file.name);
                continue;
            }
            match file_type {
                FileType::Volume => new_volumes.push(LocalVolumeFile::new(file.clone())),
                FileType::Surface => {
                    let color = palette_color(self.surfaces().len() + new_surfaces.len());
                    new_surfaces.push(LocalSurfaceFile::new(file.clone(), color));
                }
            }
        }

        if new_volumes.is_empty() && new_surfaces.is_empty() {
            return self.clone();
        }
        log::debug!(
            "Added {} local volumes and {} local surfaces",
            new_volumes.len(),
            new_surfaces.len()
        );

        let mut overrides = ProjectFilesOverrides::new();
        if !new_volumes.is_empty() {
            let mut local_volumes = self.local_volumes().to_vec();
            local_volumes.extend(new_volumes);
            overrides = overrides.local_volumes(local_volumes);
        }
        if !new_surfaces.is_empty() {
            let mut local_surfaces = self.local_surfaces().to_vec();
            local_surfaces.extend(new_surfaces);
            overrides = overrides.local_surfaces(local_surfaces);
        }

        ProjectFiles::from_instance(self, overrides)
    }

    /// Remove every file called `file_name`, local or cloud.
    ///
    /// Deleting a name that is not part of the project returns an equal
    /// snapshot. Deleted local names are remembered so that a late upload
    /// response for them is discarded instead of rejected.
    pub fn from_deleted_file(&self, file_name: &str) -> ProjectFiles {
        if !self.contains_name(file_name) {
            log::debug!("Delete of unknown file '{}' ignored", file_name);
            return self.clone();
        }

        let local_surfaces = retain_changed(self.local_surfaces(), |f| f.name() != file_name);
        let local_volumes = retain_changed(self.local_volumes(), |f| f.name() != file_name);
        let cloud_surfaces = retain_changed(self.cloud_surfaces(), |f| f.name != file_name);
        let cloud_volumes = retain_changed(self.cloud_volumes(), |f| f.name != file_name);

        let mut overrides = ProjectFilesOverrides::new();
        if local_surfaces.is_some() || local_volumes.is_some() {
            let mut tombstones = self.tombstone_counts().clone();
            add_tombstone(&mut tombstones, file_name);
            overrides = overrides.tombstones(tombstones);
        }
        if let Some(files) = local_surfaces {
            overrides = overrides.local_surfaces(files);
        }
        if let Some(files) = local_volumes {
            overrides = overrides.local_volumes(files);
        }
        if let Some(files) = cloud_surfaces {
            overrides = overrides.cloud_surfaces(files);
        }
        if let Some(files) = cloud_volumes {
            overrides = overrides.cloud_volumes(files);
        }

        log::debug!("Deleted file '{}'", file_name);
        ProjectFiles::from_instance(self, overrides)
    }

    /// Apply `local` or `cloud` to the one surface identified by `target`,
    /// in whichever collection holds it. Returns an equal snapshot if the
    /// surface is not part of the project.
    fn map_surface(
        &self,
        target: &SurfaceFile,
        local: impl Fn(&LocalSurfaceFile) -> LocalSurfaceFile,
        cloud: impl Fn(&CloudSurfaceFile) -> CloudSurfaceFile,
    ) -> ProjectFiles {
        match target {
            SurfaceFile::Local(target) => {
                if !self.local_surfaces().iter().any(|s| s.name() == target.name()) {
                    return self.clone();
                }
                let local_surfaces = self
                    .local_surfaces()
                    .iter()
                    .map(|s| {
                        if s.name() == target.name() {
                            local(s)
                        } else {
                            s.clone()
                        }
                    })
                    .collect();
                ProjectFiles::from_instance(
                    self,
                    ProjectFilesOverrides::new().local_surfaces(local_surfaces),
                )
            }
            SurfaceFile::Cloud(target) => self.map_cloud_surface(target.id, cloud),
        }
    }

    pub(crate) fn map_cloud_surface(
        &self,
        id: FileId,
        cloud: impl Fn(&CloudSurfaceFile) -> CloudSurfaceFile,
    ) -> ProjectFiles {
        if self.cloud_surface(id).is_none() {
            return self.clone();
        }
        let cloud_surfaces = self
            .cloud_surfaces()
            .iter()
            .map(|s| {
                if s.id == id {
                    cloud(s)
                } else {
                    s.clone()
                }
            })
            .collect();
        ProjectFiles::from_instance(
            self,
            ProjectFilesOverrides::new().cloud_surfaces(cloud_surfaces),
        )
    }

    /// Attach a new local overlay to `surface`. Skipped if the surface
    /// already has an overlay with the same name.
    pub fn from_added_local_surface_overlay(
        &self,
        surface: &SurfaceFile,
        file: &RawFile,
    ) -> ProjectFiles {
        self.map_surface(
            surface,
            |s| {
                if s.has_overlay_named(&file.name) {
                    s.clone()
                } else {
                    s.from_add_overlay(file)
                }
            },
            |s| {
                if s.has_overlay_named(&file.name) {
                    s.clone()
                } else {
                    s.from_add_overlay(file)
                }
            },
        )
    }

    /// Attach a new local annotation to `surface`. Skipped if the surface
    /// already has an annotation with the same name.
    pub fn from_added_local_surface_annotation(
        &self,
        surface: &SurfaceFile,
        file: &RawFile,
    ) -> ProjectFiles {
        self.map_surface(
            surface,
            |s| {
                if s.has_annotation_named(&file.name) {
                    s.clone()
                } else {
                    s.from_add_annotation(file)
                }
            },
            |s| {
                if s.has_annotation_named(&file.name) {
                    s.clone()
                } else {
                    s.from_add_annotation(file)
                }
            },
        )
    }

    pub fn from_deleted_overlay(
        &self,
        surface: &SurfaceFile,
        overlay: &OverlayFile,
    ) -> ProjectFiles {
        self.map_surface(
            surface,
            |s| s.from_delete_overlay(overlay),
            |s| s.from_delete_overlay(overlay),
        )
    }

    pub fn from_deleted_annotation(
        &self,
        surface: &SurfaceFile,
        annotation: &AnnotationFile,
    ) -> ProjectFiles {
        self.map_surface(
            surface,
            |s| s.from_delete_annotation(annotation),
            |s| s.from_delete_annotation(annotation),
        )
    }

    /// Toggle `overlay` on a cloud surface. Every other overlay and every
    /// annotation of that surface is switched off, so at most one layer of
    /// a surface is shown at a time.
    pub fn from_is_active_overlay(
        &self,
        surface: &SurfaceFile,
        overlay: &OverlayFile,
    ) -> ProjectFiles {
        let SurfaceFile::Cloud(target) = surface else {
            return self.clone();
        };
        self.map_cloud_surface(target.id, |s| {
            s.with_overlay_files(
                s.overlay_files
                    .iter()
                    .map(|o| o.from_is_active(o.same_file(overlay) && !o.is_active()))
                    .collect(),
            )
            .with_annotation_files(
                s.annotation_files
                    .iter()
                    .map(|a| a.from_is_active(false))
                    .collect(),
            )
        })
    }

    /// Toggle `annotation` on a cloud surface, switching off every overlay
    /// and every other annotation of that surface.
    pub fn from_is_active_annotation(
        &self,
        surface: &SurfaceFile,
        annotation: &AnnotationFile,
    ) -> ProjectFiles {
        let SurfaceFile::Cloud(target) = surface else {
            return self.clone();
        };
        self.map_cloud_surface(target.id, |s| {
            s.with_overlay_files(
                s.overlay_files
                    .iter()
                    .map(|o| o.from_is_active(false))
                    .collect(),
            )
            .with_annotation_files(
                s.annotation_files
                    .iter()
                    .map(|a| a.from_is_active(a.same_file(annotation) && !a.is_active()))
                    .collect(),
            )
        })
    }

    /// Set the opacity of a cloud volume, normalized to `0..=100`.
    /// Local volumes have no opacity yet and are left alone.
    pub fn from_volume_opacity(&self, volume: &VolumeFile, opacity: f32) -> ProjectFiles {
        let VolumeFile::Cloud(target) = volume else {
            return self.clone();
        };
        if !self.cloud_volumes().iter().any(|v| v.id == target.id) {
            return self.clone();
        }
        let cloud_volumes = self
            .cloud_volumes()
            .iter()
            .map(|v| {
                if v.id == target.id {
                    v.with_opacity(opacity)
                } else {
                    v.clone()
                }
            })
            .collect();
        ProjectFiles::from_instance(
            self,
            ProjectFilesOverrides::new().cloud_volumes(cloud_volumes),
        )
    }

    /// Replace the cached point sets. Volumes and surfaces are untouched.
    pub fn from_cached_point_sets(&self, point_sets: Vec<PointSetFile>) -> ProjectFiles {
        ProjectFiles::from_instance(
            self,
            ProjectFilesOverrides::new().cached_point_sets(point_sets),
        )
    }

    /// Go back (or forward) to `restored`, an earlier snapshot of this
    /// session, keeping track of uploads that may still be in flight.
    ///
    /// Tombstones are taken from `self`, not from `restored`. Local files
    /// that disappear get a tombstone so their upload response is absorbed,
    /// and local files that come back take one away so their response binds
    /// to them again.
    pub fn from_restored(&self, restored: &ProjectFiles) -> ProjectFiles {
        let current = self.local_names();
        let target = restored.local_names();

        let mut tombstones = self.tombstone_counts().clone();
        for name in current.difference(&target) {
            add_tombstone(&mut tombstones, name);
        }
        for name in target.difference(&current) {
            consume_tombstone(&mut tombstones, name);
        }

        ProjectFiles::from_instance(restored, ProjectFilesOverrides::new().tombstones(tombstones))
    }

    fn local_names(&self) -> BTreeSet<&str> {
        self.local_volumes()
            .iter()
            .map(|file| file.name())
            .chain(self.local_surfaces().iter().map(|file| file.name()))
            .collect()
    }
}
