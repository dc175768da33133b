//! Overlay files attached to a surface.

use serde::Serialize;

use crate::dto::{CreateOverlayResponseDto, GetProjectOverlayDto};
use crate::error::{Result, required};
use crate::model::{FileId, RawFile};

/// An overlay picked from the device and not uploaded yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalOverlayFile {
    pub file: RawFile,
    pub is_active: bool,
}

impl LocalOverlayFile {
    pub fn new(file: RawFile) -> Self {
        Self {
            file,
            is_active: false,
        }
    }
}

/// An overlay acknowledged by the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudOverlayFile {
    pub id: FileId,
    pub name: String,
    pub is_active: bool,
}

impl CloudOverlayFile {
    pub fn new(id: FileId, name: impl Into<String>, is_active: bool) -> Self {
        Self {
            id,
            name: name.into(),
            is_active,
        }
    }

    /// Convert an overlay from a project snapshot.
    pub fn from_dto(dto: &GetProjectOverlayDto) -> Result<Self> {
        const ENTITY: &str = "GetProjectOverlayDto";
        Ok(Self::new(
            required(dto.id, ENTITY, "id")?,
            required(dto.file_name.clone(), ENTITY, "fileName")?,
            dto.selected.unwrap_or(false),
        ))
    }

    /// Convert an overlay upload response.
    pub fn from_response(dto: &CreateOverlayResponseDto) -> Result<Self> {
        const ENTITY: &str = "CreateOverlayResponseDto";
        let id = required(dto.id, ENTITY, "id")?;
        let name = required(dto.file_name.clone(), ENTITY, "fileName")?;
        required(dto.file_size, ENTITY, "fileSize")?;
        Ok(Self::new(id, name, dto.selected.unwrap_or(false)))
    }
}

/// An overlay in either lifecycle domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "lifecycle", rename_all = "lowercase")]
pub enum OverlayFile {
    Local(LocalOverlayFile),
    Cloud(CloudOverlayFile),
}

impl OverlayFile {
    pub fn name(&self) -> &str {
        match self {
            OverlayFile::Local(overlay) => &overlay.file.name,
            OverlayFile::Cloud(overlay) => &overlay.name,
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            OverlayFile::Local(overlay) => overlay.is_active,
            OverlayFile::Cloud(overlay) => overlay.is_active,
        }
    }

    pub fn is_cloud(&self) -> bool {
        matches!(self, OverlayFile::Cloud(_))
    }

    /// Copy of this overlay with the given active flag.
    pub fn from_is_active(&self, is_active: bool) -> Self {
        match self {
            OverlayFile::Local(overlay) => OverlayFile::Local(LocalOverlayFile {
                is_active,
                ..overlay.clone()
            }),
            OverlayFile::Cloud(overlay) => OverlayFile::Cloud(CloudOverlayFile {
                is_active,
                ..overlay.clone()
            }),
        }
    }

    /// Whether both values denote the same overlay: local overlays are
    /// identified by name, cloud overlays by id.
    pub fn same_file(&self, other: &OverlayFile) -> bool {
        match (self, other) {
            (OverlayFile::Local(a), OverlayFile::Local(b)) => a.file.name == b.file.name,
            (OverlayFile::Cloud(a), OverlayFile::Cloud(b)) => a.id == b.id,
            _ => false,
        }
    }
}

impl From<LocalOverlayFile> for OverlayFile {
    fn from(overlay: LocalOverlayFile) -> Self {
        OverlayFile::Local(overlay)
    }
}

impl From<CloudOverlayFile> for OverlayFile {
    fn from(overlay: CloudOverlayFile) -> Self {
        OverlayFile::Cloud(overlay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProjectFilesError;

    #[test]
    fn test_same_file() {
        let local: OverlayFile = LocalOverlayFile::new(RawFile::new("lh.thickness", 10)).into();
        let other_local: OverlayFile =
            LocalOverlayFile::new(RawFile::new("lh.thickness", 99)).into();
        let cloud: OverlayFile = CloudOverlayFile::new(4, "lh.thickness", false).into();

        assert!(local.same_file(&other_local));
        assert!(!local.same_file(&cloud));
        assert!(cloud.same_file(&CloudOverlayFile::new(4, "renamed", true).into()));
    }

    #[test]
    fn test_from_is_active_keeps_identity() {
        let cloud: OverlayFile = CloudOverlayFile::new(4, "lh.curv", false).into();
        let active = cloud.from_is_active(true);
        assert!(active.is_active());
        assert!(!cloud.is_active());
        assert!(active.same_file(&cloud));
        assert_eq!(active.name(), "lh.curv");
    }

    #[test]
    fn test_from_response_requires_file_size() {
        let dto = CreateOverlayResponseDto {
            id: Some(1),
            file_name: Some("lh.curv".into()),
            file_size: None,
            selected: None,
        };
        let err = CloudOverlayFile::from_response(&dto).unwrap_err();
        assert!(matches!(
            err,
            ProjectFilesError::MissingField { field: "fileSize", .. }
        ));
    }

    #[test]
    fn test_from_dto_selected_defaults_false() {
        let dto = GetProjectOverlayDto {
            id: Some(3),
            file_name: Some("lh.sulc".into()),
            selected: None,
        };
        let overlay = CloudOverlayFile::from_dto(&dto).unwrap();
        assert!(!overlay.is_active);
    }
}
