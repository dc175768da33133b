//! Surface files (meshes) together with their attached overlays and annotations.

use serde::Serialize;

use crate::color_utils::{parse_hex_color, to_hex_color};
use crate::constants::{DEFAULT_IS_CHECKED, DEFAULT_SURFACE_COLOR};
use crate::dto::{CreateSurfaceResponseDto, GetProjectSurfaceDto};
use crate::error::{Result, required};
use crate::model::{
    AnnotationFile, CloudAnnotationFile, CloudOverlayFile, FileId, FilePatch, LocalAnnotationFile,
    LocalOverlayFile, OverlayFile, RawFile,
};

/// Parse a backend color string, falling back to the default surface color.
fn color_or_default(color: Option<&str>) -> [u8; 3] {
    match color {
        None => DEFAULT_SURFACE_COLOR,
        Some(value) => parse_hex_color(value).unwrap_or_else(|| {
            log::warn!("Unreadable surface color '{}', using default", value);
            DEFAULT_SURFACE_COLOR
        }),
    }
}

fn serialize_color<S: serde::Serializer>(
    color: &[u8; 3],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&to_hex_color(*color))
}

/// A surface picked from the device and not uploaded yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalSurfaceFile {
    pub file: RawFile,
    pub is_active: bool,
    pub is_checked: bool,
    pub order: Option<u32>,
    #[serde(serialize_with = "serialize_color")]
    pub color: [u8; 3],
    pub overlay_files: Vec<OverlayFile>,
    pub annotation_files: Vec<AnnotationFile>,
}

impl LocalSurfaceFile {
    pub fn new(file: RawFile, color: [u8; 3]) -> Self {
        Self {
            file,
            is_active: false,
            is_checked: DEFAULT_IS_CHECKED,
            order: None,
            color,
            overlay_files: Vec::new(),
            annotation_files: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.file.name
    }

    pub fn from_patch(&self, patch: &FilePatch) -> Self {
        let mut next = self.clone();
        patch.apply(&mut next.is_active, &mut next.is_checked, &mut next.order);
        next
    }
}

/// A surface acknowledged by the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudSurfaceFile {
    pub id: FileId,
    pub name: String,
    pub size: u64,
    pub is_active: bool,
    pub is_checked: bool,
    pub order: Option<u32>,
    #[serde(serialize_with = "serialize_color")]
    pub color: [u8; 3],
    pub overlay_files: Vec<OverlayFile>,
    pub annotation_files: Vec<AnnotationFile>,
}

impl CloudSurfaceFile {
    /// Convert a surface, with its overlays and annotations, from a project snapshot.
    pub fn from_dto(dto: &GetProjectSurfaceDto) -> Result<Self> {
        const ENTITY: &str = "GetProjectSurfaceDto";
        let overlay_files = dto
            .overlays
            .iter()
            .flatten()
            .map(|overlay| CloudOverlayFile::from_dto(overlay).map(OverlayFile::Cloud))
            .collect::<Result<Vec<_>>>()?;
        let annotation_files = dto
            .annotations
            .iter()
            .flatten()
            .map(|annotation| CloudAnnotationFile::from_dto(annotation).map(AnnotationFile::Cloud))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            id: required(dto.id, ENTITY, "id")?,
            name: required(dto.file_name.clone(), ENTITY, "fileName")?,
            size: required(dto.file_size, ENTITY, "fileSize")?,
            is_active: false,
            is_checked: dto.visible.unwrap_or(DEFAULT_IS_CHECKED),
            order: dto.order,
            color: color_or_default(dto.color.as_deref()),
            overlay_files,
            annotation_files,
        })
    }

    /// Convert an upload response. The response only guarantees id and name;
    /// everything else comes from the local surface that was uploaded,
    /// including any overlays and annotations attached before the upload.
    pub fn from_response(dto: &CreateSurfaceResponseDto, local: &LocalSurfaceFile) -> Result<Self> {
        const ENTITY: &str = "CreateSurfaceResponseDto";
        Ok(Self {
            id: required(dto.id, ENTITY, "id")?,
            name: required(dto.file_name.clone(), ENTITY, "fileName")?,
            size: dto.file_size.unwrap_or(local.file.size),
            is_active: local.is_active,
            is_checked: local.is_checked,
            order: dto.order.or(local.order),
            color: dto
                .color
                .as_deref()
                .and_then(parse_hex_color)
                .unwrap_or(local.color),
            overlay_files: local.overlay_files.clone(),
            annotation_files: local.annotation_files.clone(),
        })
    }

    pub fn from_patch(&self, patch: &FilePatch) -> Self {
        let mut next = self.clone();
        patch.apply(&mut next.is_active, &mut next.is_checked, &mut next.order);
        next
    }
}

/// A surface in either lifecycle domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "lifecycle", rename_all = "lowercase")]
pub enum SurfaceFile {
    Local(LocalSurfaceFile),
    Cloud(CloudSurfaceFile),
}

/// Accessors and copy-with-override operations shared by both surface variants.
macro_rules! surface_layers {
    ($ty:ty) => {
        impl $ty {
            pub fn with_color(&self, color: [u8; 3]) -> Self {
                Self {
                    color,
                    ..self.clone()
                }
            }

            pub fn with_overlay_files(&self, overlay_files: Vec<OverlayFile>) -> Self {
                Self {
                    overlay_files,
                    ..self.clone()
                }
            }

            pub fn with_annotation_files(&self, annotation_files: Vec<AnnotationFile>) -> Self {
                Self {
                    annotation_files,
                    ..self.clone()
                }
            }

            /// Append a new local overlay built from a raw file.
            pub fn from_add_overlay(&self, file: &RawFile) -> Self {
                let mut overlay_files = self.overlay_files.clone();
                overlay_files.push(LocalOverlayFile::new(file.clone()).into());
                self.with_overlay_files(overlay_files)
            }

            /// Append a new local annotation built from a raw file.
            pub fn from_add_annotation(&self, file: &RawFile) -> Self {
                let mut annotation_files = self.annotation_files.clone();
                annotation_files.push(LocalAnnotationFile::new(file.clone()).into());
                self.with_annotation_files(annotation_files)
            }

            pub fn from_delete_overlay(&self, overlay: &OverlayFile) -> Self {
                self.with_overlay_files(
                    self.overlay_files
                        .iter()
                        .filter(|existing| !existing.same_file(overlay))
                        .cloned()
                        .collect(),
                )
            }

            pub fn from_delete_annotation(&self, annotation: &AnnotationFile) -> Self {
                self.with_annotation_files(
                    self.annotation_files
                        .iter()
                        .filter(|existing| !existing.same_file(annotation))
                        .cloned()
                        .collect(),
                )
            }

            pub fn has_overlay_named(&self, name: &str) -> bool {
                self.overlay_files.iter().any(|overlay| overlay.name() == name)
            }

            pub fn has_annotation_named(&self, name: &str) -> bool {
                self.annotation_files
                    .iter()
                    .any(|annotation| annotation.name() == name)
            }
        }
    };
}

surface_layers!(LocalSurfaceFile);
surface_layers!(CloudSurfaceFile);

impl SurfaceFile {
    pub fn name(&self) -> &str {
        match self {
            SurfaceFile::Local(file) => file.name(),
            SurfaceFile::Cloud(file) => &file.name,
        }
    }

    pub fn size(&self) -> u64 {
        match self {
            SurfaceFile::Local(file) => file.file.size,
            SurfaceFile::Cloud(file) => file.size,
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            SurfaceFile::Local(file) => file.is_active,
            SurfaceFile::Cloud(file) => file.is_active,
        }
    }

    pub fn is_checked(&self) -> bool {
        match self {
            SurfaceFile::Local(file) => file.is_checked,
            SurfaceFile::Cloud(file) => file.is_checked,
        }
    }

    pub fn order(&self) -> Option<u32> {
        match self {
            SurfaceFile::Local(file) => file.order,
            SurfaceFile::Cloud(file) => file.order,
        }
    }

    pub fn color(&self) -> [u8; 3] {
        match self {
            SurfaceFile::Local(file) => file.color,
            SurfaceFile::Cloud(file) => file.color,
        }
    }

    pub fn overlay_files(&self) -> &[OverlayFile] {
        match self {
            SurfaceFile::Local(file) => &file.overlay_files,
            SurfaceFile::Cloud(file) => &file.overlay_files,
        }
    }

    pub fn annotation_files(&self) -> &[AnnotationFile] {
        match self {
            SurfaceFile::Local(file) => &file.annotation_files,
            SurfaceFile::Cloud(file) => &file.annotation_files,
        }
    }

    pub fn is_cloud(&self) -> bool {
        matches!(self, SurfaceFile::Cloud(_))
    }

    pub fn id(&self) -> Option<FileId> {
        match self {
            SurfaceFile::Local(_) => None,
            SurfaceFile::Cloud(file) => Some(file.id),
        }
    }

    pub fn from_patch(&self, patch: &FilePatch) -> Self {
        match self {
            SurfaceFile::Local(file) => SurfaceFile::Local(file.from_patch(patch)),
            SurfaceFile::Cloud(file) => SurfaceFile::Cloud(file.from_patch(patch)),
        }
    }

    /// Local surfaces are identified by name, cloud surfaces by id.
    pub fn same_file(&self, other: &SurfaceFile) -> bool {
        match (self, other) {
            (SurfaceFile::Local(a), SurfaceFile::Local(b)) => a.name() == b.name(),
            (SurfaceFile::Cloud(a), SurfaceFile::Cloud(b)) => a.id == b.id,
            _ => false,
        }
    }

    pub(crate) fn is_local_named(&self, name: &str) -> bool {
        matches!(self, SurfaceFile::Local(file) if file.name() == name)
    }

    pub(crate) fn is_cloud_with_id(&self, id: FileId) -> bool {
        matches!(self, SurfaceFile::Cloud(file) if file.id == id)
    }
}

impl From<LocalSurfaceFile> for SurfaceFile {
    fn from(file: LocalSurfaceFile) -> Self {
        SurfaceFile::Local(file)
    }
}

impl From<CloudSurfaceFile> for SurfaceFile {
    fn from(file: CloudSurfaceFile) -> Self {
        SurfaceFile::Cloud(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::GetProjectOverlayDto;
    use crate::error::ProjectFilesError;

    fn surface_dto() -> GetProjectSurfaceDto {
        GetProjectSurfaceDto {
            id: Some(1),
            file_name: Some("brain.gii".into()),
            file_size: Some(80),
            ..Default::default()
        }
    }

    #[test]
    fn test_from_dto_with_overlays() {
        let dto = GetProjectSurfaceDto {
            color: Some("#00ff00".into()),
            overlays: Some(vec![GetProjectOverlayDto {
                id: Some(10),
                file_name: Some("lh.thickness".into()),
                selected: Some(true),
            }]),
            ..surface_dto()
        };
        let surface = CloudSurfaceFile::from_dto(&dto).unwrap();
        assert_eq!(surface.color, [0, 255, 0]);
        assert_eq!(surface.overlay_files.len(), 1);
        assert!(surface.overlay_files[0].is_active());
        assert!(surface.annotation_files.is_empty());
    }

    #[test]
    fn test_from_dto_bad_color_falls_back() {
        let dto = GetProjectSurfaceDto {
            color: Some("yellowish".into()),
            ..surface_dto()
        };
        assert_eq!(
            CloudSurfaceFile::from_dto(&dto).unwrap().color,
            DEFAULT_SURFACE_COLOR
        );
    }

    #[test]
    fn test_from_dto_nested_missing_id() {
        let dto = GetProjectSurfaceDto {
            overlays: Some(vec![GetProjectOverlayDto {
                id: None,
                file_name: Some("lh.thickness".into()),
                selected: None,
            }]),
            ..surface_dto()
        };
        let err = CloudSurfaceFile::from_dto(&dto).unwrap_err();
        assert!(matches!(
            err,
            ProjectFilesError::MissingField {
                entity: "GetProjectOverlayDto",
                field: "id"
            }
        ));
    }

    #[test]
    fn test_add_and_delete_overlay() {
        let surface = LocalSurfaceFile::new(RawFile::new("lh.pial", 10), [1, 2, 3]);
        let with_two = surface
            .from_add_overlay(&RawFile::new("lh.thickness", 5))
            .from_add_overlay(&RawFile::new("lh.curv", 5));
        assert_eq!(with_two.overlay_files.len(), 2);
        assert!(surface.overlay_files.is_empty());
        assert!(with_two.has_overlay_named("lh.curv"));

        let target = with_two.overlay_files[0].clone();
        let with_one = with_two.from_delete_overlay(&target);
        assert_eq!(with_one.overlay_files.len(), 1);
        assert_eq!(with_one.overlay_files[0].name(), "lh.curv");
    }

    #[test]
    fn test_add_and_delete_annotation() {
        let surface = CloudSurfaceFile::from_dto(&surface_dto()).unwrap();
        let added = surface.from_add_annotation(&RawFile::new("lh.aparc.annot", 7));
        assert_eq!(added.annotation_files.len(), 1);
        assert!(!added.annotation_files[0].is_cloud());

        let removed = added.from_delete_annotation(&added.annotation_files[0].clone());
        assert!(removed.annotation_files.is_empty());
    }

    #[test]
    fn test_from_response_carries_local_layers() {
        let local = LocalSurfaceFile::new(RawFile::new("lh.pial", 10), [9, 9, 9])
            .from_add_overlay(&RawFile::new("lh.thickness", 5))
            .from_patch(&FilePatch::new().active(true));
        let dto = CreateSurfaceResponseDto {
            id: Some(3),
            file_name: Some("lh.pial".into()),
            ..Default::default()
        };
        let cloud = CloudSurfaceFile::from_response(&dto, &local).unwrap();
        assert_eq!(cloud.size, 10);
        assert!(cloud.is_active);
        assert_eq!(cloud.color, [9, 9, 9]);
        assert_eq!(cloud.overlay_files, local.overlay_files);
    }

    #[test]
    fn test_with_color_replaces_only_color() {
        let local = LocalSurfaceFile::new(RawFile::new("lh.pial", 10), [1, 2, 3])
            .from_add_overlay(&RawFile::new("lh.curv", 5));
        let recolored = local.with_color([4, 5, 6]);
        assert_eq!(recolored.color, [4, 5, 6]);
        assert_eq!(local.color, [1, 2, 3]);
        assert_eq!(recolored.with_color([1, 2, 3]), local);

        let cloud = CloudSurfaceFile::from_dto(&surface_dto()).unwrap();
        let recolored = cloud.with_color([0, 0, 255]);
        assert_eq!(recolored.color, [0, 0, 255]);
        assert_eq!(cloud.color, DEFAULT_SURFACE_COLOR);
        assert_eq!(recolored.id, cloud.id);
        assert_eq!(SurfaceFile::Cloud(recolored).color(), [0, 0, 255]);
    }

    #[test]
    fn test_serialized_color_is_hex() {
        let surface = LocalSurfaceFile::new(RawFile::new("lh.pial", 10), [255, 0, 16]);
        let json = serde_json::to_value(&surface).unwrap();
        assert_eq!(json["color"], "#ff0010");
    }

    #[test]
    fn test_serialized_keys_are_camel_case() {
        let dto = GetProjectSurfaceDto {
            visible: Some(false),
            overlays: Some(vec![GetProjectOverlayDto {
                id: Some(4),
                file_name: Some("rh.thickness".into()),
                selected: Some(true),
            }]),
            ..surface_dto()
        };
        let cloud = CloudSurfaceFile::from_dto(&dto).unwrap();
        let json = serde_json::to_value(SurfaceFile::Cloud(cloud)).unwrap();
        assert_eq!(json["lifecycle"], "cloud");
        assert_eq!(json["isChecked"], false);
        assert_eq!(json["overlayFiles"][0]["isActive"], true);
        assert!(json["annotationFiles"].as_array().unwrap().is_empty());
        assert!(json.get("overlay_files").is_none());
    }
}
