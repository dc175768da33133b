//! Error types for project file operations.
//!
//! Only backend contract violations are errors. Redundant user actions
//! (deleting a missing file, re-activating an active overlay) are absorbed
//! by the transitions and never show up here.

use thiserror::Error;

use crate::model::FileType;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, ProjectFilesError>;

/// Errors raised when the backend breaks its side of the file contract.
#[derive(Error, Debug)]
pub enum ProjectFilesError {
    /// A backend response lacks a field every acknowledged file must carry
    #[error("Missing required field '{field}' in {entity}")]
    MissingField {
        /// Kind of payload that was being converted
        entity: &'static str,
        /// Name of the missing field (wire spelling)
        field: &'static str,
    },

    /// An upload response names a file that was never picked locally
    #[error("No local {kind} named '{name}' for uploaded cloud file")]
    NoLocalFile {
        /// Kind of file the response was for
        kind: FileType,
        /// File name carried by the response
        name: String,
    },

    /// JSON payload could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProjectFilesError {
    /// Create a missing field error.
    pub fn missing_field(entity: &'static str, field: &'static str) -> Self {
        Self::MissingField { entity, field }
    }

    /// Create a missing local file error.
    pub fn no_local_file(kind: FileType, name: impl Into<String>) -> Self {
        Self::NoLocalFile {
            kind,
            name: name.into(),
        }
    }

    /// Whether this error signals a broken backend contract.
    pub fn is_contract_violation(&self) -> bool {
        !matches!(self, Self::Json(_))
    }
}

/// Unwrap an optional DTO field or fail with [`ProjectFilesError::MissingField`].
pub(crate) fn required<T>(
    value: Option<T>,
    entity: &'static str,
    field: &'static str,
) -> Result<T> {
    value.ok_or_else(|| ProjectFilesError::missing_field(entity, field))
}
