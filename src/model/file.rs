//! Shared file identity types: raw device files, classification and patches.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{SURFACE_EXTENSIONS, VOLUME_EXTENSIONS};
use crate::model::{SurfaceFile, VolumeFile};

/// Backend-assigned identifier of a cloud file.
pub type FileId = u32;

/// A file picked from the user's device that has not been uploaded yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFile {
    /// File name including extension
    pub name: String,
    /// Size in bytes
    pub size: u64,
}

impl RawFile {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl From<&web_sys::File> for RawFile {
    fn from(file: &web_sys::File) -> Self {
        Self {
            name: file.name(),
            size: file.size().max(0.0) as u64,
        }
    }
}

/// The two top-level file kinds of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Volume,
    Surface,
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileType::Volume => write!(f, "volume"),
            FileType::Surface => write!(f, "surface"),
        }
    }
}

/// Extension tables used to classify raw files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTypes {
    volume_extensions: Vec<String>,
    surface_extensions: Vec<String>,
}

impl Default for FileTypes {
    fn default() -> Self {
        Self::new(
            VOLUME_EXTENSIONS.iter().copied(),
            SURFACE_EXTENSIONS.iter().copied(),
        )
    }
}

impl FileTypes {
    /// Build a classifier from extension lists. Extensions are matched case
    /// insensitively and may be given with or without a leading dot.
    pub fn new<V, S>(volume_extensions: V, surface_extensions: S) -> Self
    where
        V: IntoIterator,
        V::Item: AsRef<str>,
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        fn normalize<I>(extensions: I) -> Vec<String>
        where
            I: IntoIterator,
            I::Item: AsRef<str>,
        {
            extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect()
        }

        Self {
            volume_extensions: normalize(volume_extensions),
            surface_extensions: normalize(surface_extensions),
        }
    }

    /// Classify a file name by its extension.
    ///
    /// The longest matching extension wins, so `scan.nii.gz` is matched by
    /// `nii.gz`. FreeSurfer surfaces such as `lh.pial` are matched by their
    /// last component. Returns None for unrecognized names.
    pub fn classify(&self, name: &str) -> Option<FileType> {
        let lower = name.to_lowercase();
        let best = |extensions: &[String]| {
            extensions
                .iter()
                .filter(|ext| has_extension(&lower, ext))
                .map(|ext| ext.len())
                .max()
        };

        match (best(&self.volume_extensions), best(&self.surface_extensions)) {
            (Some(v), Some(s)) if s > v => Some(FileType::Surface),
            (Some(_), _) => Some(FileType::Volume),
            (None, Some(_)) => Some(FileType::Surface),
            (None, None) => None,
        }
    }
}

fn has_extension(lower_name: &str, ext: &str) -> bool {
    lower_name.len() > ext.len()
        && lower_name.ends_with(ext)
        && lower_name[..lower_name.len() - ext.len()].ends_with('.')
}

/// Classify a raw file name into volume or surface using the default tables.
pub fn type_from_file_extension(name: &str) -> Option<FileType> {
    FileTypes::default().classify(name)
}

/// Partial update of the presentation fields every project file shares.
///
/// Fields left as None are copied forward unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilePatch {
    pub is_active: Option<bool>,
    pub is_checked: Option<bool>,
    pub order: Option<u32>,
}

impl FilePatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the active flag.
    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    /// Set the checked (visible) flag.
    pub fn checked(mut self, is_checked: bool) -> Self {
        self.is_checked = Some(is_checked);
        self
    }

    /// Set the display order.
    pub fn order(mut self, order: u32) -> Self {
        self.order = Some(order);
        self
    }

    pub(crate) fn apply(
        &self,
        is_active: &mut bool,
        is_checked: &mut bool,
        order: &mut Option<u32>,
    ) {
        if let Some(value) = self.is_active {
            *is_active = value;
        }
        if let Some(value) = self.is_checked {
            *is_checked = value;
        }
        if let Some(value) = self.order {
            *order = Some(value);
        }
    }
}

/// Any volume or surface of a project, as exposed by the `all` view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProjectFile {
    Volume(VolumeFile),
    Surface(SurfaceFile),
}

impl ProjectFile {
    pub fn name(&self) -> &str {
        match self {
            ProjectFile::Volume(file) => file.name(),
            ProjectFile::Surface(file) => file.name(),
        }
    }

    pub fn size(&self) -> u64 {
        match self {
            ProjectFile::Volume(file) => file.size(),
            ProjectFile::Surface(file) => file.size(),
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            ProjectFile::Volume(file) => file.is_active(),
            ProjectFile::Surface(file) => file.is_active(),
        }
    }

    pub fn is_checked(&self) -> bool {
        match self {
            ProjectFile::Volume(file) => file.is_checked(),
            ProjectFile::Surface(file) => file.is_checked(),
        }
    }

    pub fn order(&self) -> Option<u32> {
        match self {
            ProjectFile::Volume(file) => file.order(),
            ProjectFile::Surface(file) => file.order(),
        }
    }

    pub fn is_cloud(&self) -> bool {
        match self {
            ProjectFile::Volume(file) => file.is_cloud(),
            ProjectFile::Surface(file) => file.is_cloud(),
        }
    }

    pub fn file_type(&self) -> FileType {
        match self {
            ProjectFile::Volume(_) => FileType::Volume,
            ProjectFile::Surface(_) => FileType::Surface,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_defaults() {
        assert_eq!(type_from_file_extension("t1.nii"), Some(FileType::Volume));
        assert_eq!(type_from_file_extension("brain.mgz"), Some(FileType::Volume));
        assert_eq!(type_from_file_extension("brain.gii"), Some(FileType::Surface));
        assert_eq!(type_from_file_extension("lh.pial"), Some(FileType::Surface));
        assert_eq!(type_from_file_extension("notes.txt"), None);
    }

    #[test]
    fn test_classify_double_extension_and_case() {
        assert_eq!(type_from_file_extension("scan.NII.GZ"), Some(FileType::Volume));
        assert_eq!(type_from_file_extension("RH.WHITE"), Some(FileType::Surface));
    }

    #[test]
    fn test_classify_requires_dot() {
        // bare names equal to an extension are not classified
        assert_eq!(type_from_file_extension("nii"), None);
        assert_eq!(type_from_file_extension("pial"), None);
        assert_eq!(type_from_file_extension("scan.xnii"), None);
    }

    #[test]
    fn test_custom_file_types() {
        let types = FileTypes::new([".nrrd"], ["stl", "OBJ"]);
        assert_eq!(types.classify("head.nrrd"), Some(FileType::Volume));
        assert_eq!(types.classify("mesh.obj"), Some(FileType::Surface));
        assert_eq!(types.classify("t1.nii"), None);
    }

    #[test]
    fn test_longest_extension_wins() {
        let types = FileTypes::new(["gz"], ["surf.gz"]);
        assert_eq!(types.classify("lh.surf.gz"), Some(FileType::Surface));
        assert_eq!(types.classify("lh.gz"), Some(FileType::Volume));
    }

    #[test]
    fn test_file_patch_apply() {
        let mut is_active = false;
        let mut is_checked = true;
        let mut order = None;

        FilePatch::new()
            .active(true)
            .order(3)
            .apply(&mut is_active, &mut is_checked, &mut order);

        assert!(is_active);
        assert!(is_checked);
        assert_eq!(order, Some(3));
    }

    #[test]
    fn test_file_type_display() {
        assert_eq!(FileType::Volume.to_string(), "volume");
        assert_eq!(FileType::Surface.to_string(), "surface");
    }
}
