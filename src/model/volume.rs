//! Volume files (MRI scans).

use serde::Serialize;

use crate::constants::{DEFAULT_COLOR_MAP, DEFAULT_IS_CHECKED, MAX_OPACITY, MIN_OPACITY};
use crate::dto::{CreateVolumeResponseDto, GetProjectVolumeDto};
use crate::error::{Result, required};
use crate::model::{FileId, FilePatch, RawFile};

/// Clamp an opacity value into `0..=100` and round it to a whole percent.
pub fn normalize_opacity(value: f32) -> f32 {
    if value.is_nan() {
        return MIN_OPACITY;
    }
    value.clamp(MIN_OPACITY, MAX_OPACITY).round()
}

/// A volume picked from the device and not uploaded yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalVolumeFile {
    pub file: RawFile,
    pub is_active: bool,
    pub is_checked: bool,
    pub order: Option<u32>,
}

impl LocalVolumeFile {
    pub fn new(file: RawFile) -> Self {
        Self {
            file,
            is_active: false,
            is_checked: DEFAULT_IS_CHECKED,
            order: None,
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

/// A volume acknowledged by the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudVolumeFile {
    pub id: FileId,
    pub name: String,
    pub size: u64,
    pub is_active: bool,
    pub is_checked: bool,
    pub order: Option<u32>,
    pub opacity: f32,
    pub color_map: String,
    pub contrast_min: Option<f32>,
    pub contrast_max: Option<f32>,
}

impl CloudVolumeFile {
    /// Convert a volume from a project snapshot.
    pub fn from_dto(dto: &GetProjectVolumeDto) -> Result<Self> {
        const ENTITY: &str = "GetProjectVolumeDto";
        Ok(Self {
            id: required(dto.id, ENTITY, "id")?,
            name: required(dto.file_name.clone(), ENTITY, "fileName")?,
            size: required(dto.file_size, ENTITY, "fileSize")?,
            is_active: false,
            is_checked: dto.visible.unwrap_or(DEFAULT_IS_CHECKED),
            order: Some(required(dto.order, ENTITY, "order")?),
            opacity: required(dto.opacity, ENTITY, "opacity")?,
            color_map: dto
                .color_map
                .clone()
                .unwrap_or_else(|| DEFAULT_COLOR_MAP.to_string()),
            contrast_min: dto.contrast_min,
            contrast_max: dto.contrast_max,
        })
    }

    /// Convert an upload response, taking the flags the response does not
    /// carry from the local file that was uploaded.
    pub fn from_response(dto: &CreateVolumeResponseDto, local: &LocalVolumeFile) -> Result<Self> {
        const ENTITY: &str = "CreateVolumeResponseDto";
        Ok(Self {
            id: required(dto.id, ENTITY, "id")?,
            name: required(dto.file_name.clone(), ENTITY, "fileName")?,
            size: required(dto.file_size, ENTITY, "fileSize")?,
            is_active: local.is_active,
            is_checked: local.is_checked,
            order: Some(required(dto.order, ENTITY, "order")?),
            opacity: required(dto.opacity, ENTITY, "opacity")?,
            color_map: dto
                .color_map
                .clone()
                .unwrap_or_else(|| DEFAULT_COLOR_MAP.to_string()),
            contrast_min: dto.contrast_min,
            contrast_max: dto.contrast_max,
        })
    }

    pub fn from_patch(&self, patch: &FilePatch) -> Self {
        let mut next = self.clone();
        patch.apply(&mut next.is_active, &mut next.is_checked, &mut next.order);
        next
    }

    /// Copy with a new opacity, normalized to `0..=100`.
    pub fn with_opacity(&self, opacity: f32) -> Self {
        Self {
            opacity: normalize_opacity(opacity),
            ..self.clone()
        }
    }

    pub fn with_color_map(&self, color_map: impl Into<String>) -> Self {
        Self {
            color_map: color_map.into(),
            ..self.clone()
        }
    }

    pub fn with_contrast(&self, contrast_min: Option<f32>, contrast_max: Option<f32>) -> Self {
        Self {
            contrast_min,
            contrast_max,
            ..self.clone()
        }
    }
}

/// A volume in either lifecycle domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "lifecycle", rename_all = "lowercase")]
pub enum VolumeFile {
    Local(LocalVolumeFile),
    Cloud(CloudVolumeFile),
}

impl VolumeFile {
    pub fn name(&self) -> &str {
        match self {
            VolumeFile::Local(file) => file.name(),
            VolumeFile::Cloud(file) => &file.name,
        }
    }

    pub fn size(&self) -> u64 {
        match self {
            VolumeFile::Local(file) => file.file.size,
            VolumeFile::Cloud(file) => file.size,
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            VolumeFile::Local(file) => file.is_active,
            VolumeFile::Cloud(file) => file.is_active,
        }
    }

    pub fn is_checked(&self) -> bool {
        match self {
            VolumeFile::Local(file) => file.is_checked,
            VolumeFile::Cloud(file) => file.is_checked,
        }
    }

    pub fn order(&self) -> Option<u32> {
        match self {
            VolumeFile::Local(file) => file.order,
            VolumeFile::Cloud(file) => file.order,
        }
    }

    pub fn is_cloud(&self) -> bool {
        matches!(self, VolumeFile::Cloud(_))
    }

    /// Cloud id, if the volume has been acknowledged.
    pub fn id(&self) -> Option<FileId> {
        match self {
            VolumeFile::Local(_) => None,
            VolumeFile::Cloud(file) => Some(file.id),
        }
    }

    pub fn from_patch(&self, patch: &FilePatch) -> Self {
        match self {
            VolumeFile::Local(file) => VolumeFile::Local(file.from_patch(patch)),
            VolumeFile::Cloud(file) => VolumeFile::Cloud(file.from_patch(patch)),
        }
    }

    /// Local volumes are identified by name, cloud volumes by id.
    pub fn same_file(&self, other: &VolumeFile) -> bool {
        match (self, other) {
            (VolumeFile::Local(a), VolumeFile::Local(b)) => a.name() == b.name(),
            (VolumeFile::Cloud(a), VolumeFile::Cloud(b)) => a.id == b.id,
            _ => false,
        }
    }
}

impl From<LocalVolumeFile> for VolumeFile {
    fn from(file: LocalVolumeFile) -> Self {
        VolumeFile::Local(file)
    }
}

impl From<CloudVolumeFile> for VolumeFile {
    fn from(file: CloudVolumeFile) -> Self {
        VolumeFile::Cloud(file)
    }
}
