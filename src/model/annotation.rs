//! Annotation (parcellation label) files attached to a surface.

use serde::Serialize;

use crate::dto::{CreateAnnotationResponseDto, GetProjectAnnotationDto};
use crate::error::{Result, required};
use crate::model::{FileId, RawFile};

/// An annotation picked from the device and not uploaded yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalAnnotationFile {
    pub file: RawFile,
    pub is_active: bool,
}

impl LocalAnnotationFile {
    pub fn new(file: RawFile) -> Self {
        Self {
            file,
            is_active: false,
        }
    }
}

/// An annotation acknowledged by the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudAnnotationFile {
    pub id: FileId,
    pub name: String,
    pub is_active: bool,
}

impl CloudAnnotationFile {
    pub fn new(id: FileId, name: impl Into<String>, is_active: bool) -> Self {
        Self {
            id,
            name: name.into(),
            is_active,
        }
    }

    /// Convert an annotation from a project snapshot.
    pub fn from_dto(dto: &GetProjectAnnotationDto) -> Result<Self> {
        const ENTITY: &str = "GetProjectAnnotationDto";
        Ok(Self::new(
            required(dto.id, ENTITY, "id")?,
            required(dto.file_name.clone(), ENTITY, "fileName")?,
            dto.selected.unwrap_or(false),
        ))
    }

    /// Convert an annotation upload response.
    pub fn from_response(dto: &CreateAnnotationResponseDto) -> Result<Self> {
        const ENTITY: &str = "CreateAnnotationResponseDto";
        let id = required(dto.id, ENTITY, "id")?;
        let name = required(dto.file_name.clone(), ENTITY, "fileName")?;
        required(dto.file_size, ENTITY, "fileSize")?;
        Ok(Self::new(id, name, dto.selected.unwrap_or(false)))
    }
}

/// An annotation in either lifecycle domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "lifecycle", rename_all = "lowercase")]
pub enum AnnotationFile {
    Local(LocalAnnotationFile),
    Cloud(CloudAnnotationFile),
}

impl AnnotationFile {
    pub fn name(&self) -> &str {
        match self {
            AnnotationFile::Local(annotation) => &annotation.file.name,
            AnnotationFile::Cloud(annotation) => &annotation.name,
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            AnnotationFile::Local(annotation) => annotation.is_active,
            AnnotationFile::Cloud(annotation) => annotation.is_active,
        }
    }

    pub fn is_cloud(&self) -> bool {
        matches!(self, AnnotationFile::Cloud(_))
    }

    /// Copy of this annotation with the given active flag.
    pub fn from_is_active(&self, is_active: bool) -> Self {
        match self {
            AnnotationFile::Local(annotation) => AnnotationFile::Local(LocalAnnotationFile {
                is_active,
                ..annotation.clone()
            }),
            AnnotationFile::Cloud(annotation) => AnnotationFile::Cloud(CloudAnnotationFile {
                is_active,
                ..annotation.clone()
            }),
        }
    }

    /// Same identity rule as overlays: name for local, id for cloud.
    pub fn same_file(&self, other: &AnnotationFile) -> bool {
        match (self, other) {
            (AnnotationFile::Local(a), AnnotationFile::Local(b)) => a.file.name == b.file.name,
            (AnnotationFile::Cloud(a), AnnotationFile::Cloud(b)) => a.id == b.id,
            _ => false,
        }
    }
}

impl From<LocalAnnotationFile> for AnnotationFile {
    fn from(annotation: LocalAnnotationFile) -> Self {
        AnnotationFile::Local(annotation)
    }
}

impl From<CloudAnnotationFile> for AnnotationFile {
    fn from(annotation: CloudAnnotationFile) -> Self {
        AnnotationFile::Cloud(annotation)
    }
}
