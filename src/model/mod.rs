//! File entity hierarchy: volumes, surfaces and the overlays and
//! annotations attached to surfaces, each either local or cloud.

mod annotation;
mod file;
mod overlay;
mod point_set;
mod surface;
mod volume;

pub use annotation::{AnnotationFile, CloudAnnotationFile, LocalAnnotationFile};
pub use file::{
    FileId, FilePatch, FileType, FileTypes, ProjectFile, RawFile, type_from_file_extension,
};
pub use overlay::{CloudOverlayFile, LocalOverlayFile, OverlayFile};
pub use point_set::PointSetFile;
pub use surface::{CloudSurfaceFile, LocalSurfaceFile, SurfaceFile};
pub use volume::{CloudVolumeFile, LocalVolumeFile, VolumeFile, normalize_opacity};
