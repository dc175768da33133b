//! Neurofiles - project file inventory for a neuroimaging viewer
//!
//! Tracks the volumes (MRI scans) and surfaces (meshes) of a project, with
//! the overlays and annotations attached to surfaces, across their local
//! (picked, not uploaded) and cloud (acknowledged by the backend) lifecycles.
//! Every change produces a new immutable [`ProjectFiles`] snapshot.

pub mod color_utils;
pub mod config;
pub mod constants;
pub mod dto;
pub mod error;
pub mod history;
pub mod logging;
pub mod model;
pub mod session;
pub mod state;

pub use error::{ProjectFilesError, Result};
pub use session::{ProjectAction, ProjectSession};
pub use state::{ProjectFiles, ProjectFilesOverrides};

// WASM entry point
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;
