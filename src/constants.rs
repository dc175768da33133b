//! Global constants for the project file inventory

/// File extensions recognized as volumes (lowercase, without leading dot).
pub const VOLUME_EXTENSIONS: &[&str] = &["mgz", "mgh", "nii", "nii.gz"];

/// File extensions recognized as surfaces (lowercase, without leading dot).
pub const SURFACE_EXTENSIONS: &[&str] = &[
    "gii", "white", "pial", "inflated", "sphere", "orig", "smoothwm",
];

/// Color map used for cloud volumes when the backend does not send one.
pub const DEFAULT_COLOR_MAP: &str = "Gray";

/// Upper bound of the opacity range.
pub const MAX_OPACITY: f32 = 100.0;

/// Lower bound of the opacity range.
pub const MIN_OPACITY: f32 = 0.0;

/// Color used for surfaces whose backend color is missing or unreadable.
pub const DEFAULT_SURFACE_COLOR: [u8; 3] = [255, 255, 0];

/// Newly picked and freshly hydrated files are shown in the viewer.
pub const DEFAULT_IS_CHECKED: bool = true;

/// Number of snapshots kept for undo.
pub const DEFAULT_MAX_HISTORY: usize = 100;
