//! Wire shapes exchanged with the backend.
//!
//! Every field is optional on the wire. Which ones are actually required is
//! decided by the conversions in [`crate::model`] and [`crate::state`], so a
//! missing field surfaces as a [`ProjectFilesError::MissingField`] naming
//! the offending payload rather than as a generic decode failure.
//!
//! ```json
//! {
//!   "id": 7,
//!   "name": "subject-01",
//!   "volumes": [{ "id": 2, "fileName": "t1.nii", "fileSize": 100, "order": 0, "opacity": 100 }],
//!   "surfaces": [{ "id": 1, "fileName": "lh.pial", "fileSize": 80, "color": "#ffff00" }]
//! }
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ProjectFilesError, Result};
use crate::model::FileId;

/// Decode any DTO from a JSON string.
fn decode<T: DeserializeOwned>(json: &str) -> Result<T> {
    serde_json::from_str(json).map_err(ProjectFilesError::Json)
}

/// Project snapshot as returned by the backend when a project is opened.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetProjectDto {
    #[serde(default)]
    pub id: Option<FileId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub volumes: Option<Vec<GetProjectVolumeDto>>,
    #[serde(default)]
    pub surfaces: Option<Vec<GetProjectSurfaceDto>>,
}

impl GetProjectDto {
    /// Decode a project snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        decode(json)
    }
}

/// A volume inside a project snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetProjectVolumeDto {
    #[serde(default)]
    pub id: Option<FileId>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub order: Option<u32>,
    #[serde(default)]
    pub opacity: Option<f32>,
    #[serde(default)]
    pub color_map: Option<String>,
    #[serde(default)]
    pub contrast_min: Option<f32>,
    #[serde(default)]
    pub contrast_max: Option<f32>,
    #[serde(default)]
    pub visible: Option<bool>,
}

/// A surface inside a project snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetProjectSurfaceDto {
    #[serde(default)]
    pub id: Option<FileId>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub order: Option<u32>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub visible: Option<bool>,
    #[serde(default)]
    pub overlays: Option<Vec<GetProjectOverlayDto>>,
    #[serde(default)]
    pub annotations: Option<Vec<GetProjectAnnotationDto>>,
}

/// An overlay attached to a surface in a project snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetProjectOverlayDto {
    #[serde(default)]
    pub id: Option<FileId>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub selected: Option<bool>,
}

/// An annotation attached to a surface in a project snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetProjectAnnotationDto {
    #[serde(default)]
    pub id: Option<FileId>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub selected: Option<bool>,
}

/// Upload response for one volume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVolumeResponseDto {
    #[serde(default)]
    pub id: Option<FileId>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub order: Option<u32>,
    #[serde(default)]
    pub opacity: Option<f32>,
    #[serde(default)]
    pub color_map: Option<String>,
    #[serde(default)]
    pub contrast_min: Option<f32>,
    #[serde(default)]
    pub contrast_max: Option<f32>,
}

impl CreateVolumeResponseDto {
    /// Decode a batch of volume upload responses from a JSON array.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>> {
        decode(json)
    }
}

/// Upload response for one surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSurfaceResponseDto {
    #[serde(default)]
    pub id: Option<FileId>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub order: Option<u32>,
    #[serde(default)]
    pub color: Option<String>,
}

impl CreateSurfaceResponseDto {
    /// Decode a batch of surface upload responses from a JSON array.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>> {
        decode(json)
    }
}

/// Upload response for one overlay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOverlayResponseDto {
    #[serde(default)]
    pub id: Option<FileId>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub selected: Option<bool>,
}

impl CreateOverlayResponseDto {
    /// Decode a batch of overlay upload responses from a JSON array.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>> {
        decode(json)
    }
}

/// Upload response for one annotation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnnotationResponseDto {
    #[serde(default)]
    pub id: Option<FileId>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub selected: Option<bool>,
}

impl CreateAnnotationResponseDto {
    /// Decode a batch of annotation upload responses from a JSON array.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>> {
        decode(json)
    }
}
